//! Test doubles for offline testing.
//!
//! [`FakeCamera`] is a scriptable in-memory device backend: it negotiates
//! preview sizes from a fixed list, tracks zoom state, optionally injects
//! failures, and records every device call in order through a shared
//! [`FakeCameraLog`] so tests can assert sequencing.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::device::CameraDevice;
use crate::display::DisplayConfiguration;
use crate::errors::CameraError;
use crate::types::{
    CameraParameters, CameraSettings, ParametersCallback, PreviewCallback, PreviewFrame,
    PreviewSurface, Size,
};

/// One recorded device call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOp {
    Open,
    Configure,
    SetPreviewDisplay(u64),
    StartPreview,
    StopPreview,
    Close,
    SetTorch(bool),
    SetZoom(i32),
    ChangeParameters,
    RequestFrame,
    Focus,
}

/// Shared, cloneable view of the calls a [`FakeCamera`] received.
#[derive(Clone, Default)]
pub struct FakeCameraLog {
    ops: Arc<Mutex<Vec<DeviceOp>>>,
}

impl FakeCameraLog {
    pub fn ops(&self) -> Vec<DeviceOp> {
        self.ops.lock().expect("lock poisoned").clone()
    }

    pub fn count(&self, op: &DeviceOp) -> usize {
        self.ops
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|recorded| *recorded == op)
            .count()
    }

    /// Poll until `op` shows up or the timeout elapses.
    pub fn wait_for(&self, op: &DeviceOp, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.count(op) > 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn record(&self, op: DeviceOp) {
        self.ops.lock().expect("lock poisoned").push(op);
    }
}

/// Scriptable [`CameraDevice`] implementation.
pub struct FakeCamera {
    log: FakeCameraLog,
    supported_sizes: Vec<Size>,
    settings: CameraSettings,
    display: Option<DisplayConfiguration>,
    parameters: CameraParameters,
    preview_size: Option<Size>,
    zoom: i32,
    max_zoom: i32,
    zoom_supported: bool,
    fail_open: bool,
    fail_configure: bool,
    fail_start_preview: bool,
    fail_close: bool,
}

impl Default for FakeCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCamera {
    pub fn new() -> Self {
        Self {
            log: FakeCameraLog::default(),
            supported_sizes: vec![
                Size::new(640, 480),
                Size::new(1280, 720),
                Size::new(1920, 1080),
            ],
            settings: CameraSettings::default(),
            display: None,
            parameters: CameraParameters::default(),
            preview_size: None,
            zoom: 0,
            max_zoom: 100,
            zoom_supported: true,
            fail_open: false,
            fail_configure: false,
            fail_start_preview: false,
            fail_close: false,
        }
    }

    pub fn with_supported_sizes(mut self, sizes: Vec<Size>) -> Self {
        self.supported_sizes = sizes;
        self
    }

    pub fn with_zoom(mut self, zoom: i32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_max_zoom(mut self, max_zoom: i32) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_zoom_supported(mut self, supported: bool) -> Self {
        self.zoom_supported = supported;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    pub fn failing_start_preview(mut self) -> Self {
        self.fail_start_preview = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Handle for asserting on recorded calls after the camera moved into
    /// a session.
    pub fn log(&self) -> FakeCameraLog {
        self.log.clone()
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn parameters(&self) -> &CameraParameters {
        &self.parameters
    }
}

impl CameraDevice for FakeCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        self.log.record(DeviceOp::Open);
        if self.fail_open {
            return Err(CameraError::OpenError("injected open failure".to_string()));
        }
        Ok(())
    }

    fn set_display_configuration(&mut self, configuration: DisplayConfiguration) {
        self.display = Some(configuration);
    }

    fn set_camera_settings(&mut self, settings: CameraSettings) {
        self.settings = settings;
    }

    fn configure(&mut self) -> Result<(), CameraError> {
        self.log.record(DeviceOp::Configure);
        if self.fail_configure {
            return Err(CameraError::ConfigurationError(
                "injected configure failure".to_string(),
            ));
        }
        self.preview_size = match &self.display {
            Some(display) => display.best_preview_size(&self.supported_sizes),
            None => self.supported_sizes.first().copied(),
        };
        Ok(())
    }

    fn preview_size(&self) -> Option<Size> {
        self.preview_size
    }

    fn set_preview_display(&mut self, surface: &PreviewSurface) -> Result<(), CameraError> {
        self.log.record(DeviceOp::SetPreviewDisplay(surface.raw()));
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        self.log.record(DeviceOp::StartPreview);
        if self.fail_start_preview {
            return Err(CameraError::PreviewError(
                "injected start failure".to_string(),
            ));
        }
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.log.record(DeviceOp::StopPreview);
        Ok(())
    }

    fn close(&mut self) -> Result<(), CameraError> {
        self.log.record(DeviceOp::Close);
        if self.fail_close {
            return Err(CameraError::ControlError(
                "injected close failure".to_string(),
            ));
        }
        Ok(())
    }

    fn set_torch(&mut self, on: bool) -> Result<(), CameraError> {
        self.log.record(DeviceOp::SetTorch(on));
        Ok(())
    }

    fn change_parameters(&mut self, callback: ParametersCallback) -> Result<(), CameraError> {
        self.log.record(DeviceOp::ChangeParameters);
        self.parameters = callback(std::mem::take(&mut self.parameters));
        Ok(())
    }

    fn request_preview_frame(&mut self, mut callback: Box<dyn PreviewCallback>) {
        self.log.record(DeviceOp::RequestFrame);
        match self.preview_size {
            Some(size) => {
                let data = vec![0u8; size.width as usize * size.height as usize];
                callback.on_preview(PreviewFrame { data, size });
            }
            None => callback.on_preview_error(CameraError::PreviewError(
                "preview size not negotiated".to_string(),
            )),
        }
    }

    fn focus(&mut self) -> Result<(), CameraError> {
        self.log.record(DeviceOp::Focus);
        Ok(())
    }

    fn zoom(&self) -> i32 {
        self.zoom
    }

    fn set_zoom(&mut self, level: i32) -> Result<(), CameraError> {
        self.log.record(DeviceOp::SetZoom(level));
        self.zoom = level;
        Ok(())
    }

    fn max_zoom(&self) -> i32 {
        self.max_zoom
    }

    fn is_zoom_supported(&self) -> bool {
        self.zoom_supported
    }
}
