//! The camera device abstraction.
//!
//! Everything platform-specific lives behind [`CameraDevice`]: a real
//! backend wraps the OS camera handle, [`crate::testing::FakeCamera`]
//! scripts one for tests. The session coordinator only ever touches a
//! device through this trait, and only from its single worker thread (plus
//! brief read-only zoom queries from the owning thread).

use crate::display::DisplayConfiguration;
use crate::errors::CameraError;
use crate::types::{
    CameraSettings, ParametersCallback, PreviewCallback, PreviewSurface, Size,
};

pub trait CameraDevice: Send {
    /// Acquire the underlying camera handle.
    fn open(&mut self) -> Result<(), CameraError>;

    /// Set the display configuration used to negotiate the preview size.
    /// Only meaningful before [`CameraDevice::configure`].
    fn set_display_configuration(&mut self, configuration: DisplayConfiguration);

    /// Replace the pre-open settings bundle.
    fn set_camera_settings(&mut self, settings: CameraSettings);

    /// Apply settings and negotiate the preview size.
    fn configure(&mut self) -> Result<(), CameraError>;

    /// The negotiated preview size. `None` until configured.
    fn preview_size(&self) -> Option<Size>;

    fn set_preview_display(&mut self, surface: &PreviewSurface) -> Result<(), CameraError>;

    fn start_preview(&mut self) -> Result<(), CameraError>;

    fn stop_preview(&mut self) -> Result<(), CameraError>;

    /// Release the camera handle.
    fn close(&mut self) -> Result<(), CameraError>;

    fn set_torch(&mut self, on: bool) -> Result<(), CameraError>;

    /// Run a one-shot mutation of the device parameter bag.
    fn change_parameters(&mut self, callback: ParametersCallback) -> Result<(), CameraError>;

    /// Capture a single preview frame and hand it to `callback`. The device
    /// must invoke exactly one of the callback's methods.
    fn request_preview_frame(&mut self, callback: Box<dyn PreviewCallback>);

    /// Trigger a manual focus cycle.
    fn focus(&mut self) -> Result<(), CameraError>;

    /// Current zoom level in device units.
    fn zoom(&self) -> i32;

    fn set_zoom(&mut self, level: i32) -> Result<(), CameraError>;

    /// Device zoom ceiling in device units.
    fn max_zoom(&self) -> i32;

    fn is_zoom_supported(&self) -> bool;
}
