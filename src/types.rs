//! Core value types shared across the crate.
//!
//! `Size` carries the integer scaling arithmetic the preview-size selector
//! builds on; the remaining types are the configuration bundles and callback
//! surfaces exchanged with a camera device backend.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::CameraError;

/// A camera resolution or viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Swap width and height.
    pub fn rotate(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// True if this size fits inside `other` without scaling.
    pub fn fits_in(self, other: Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Scale so that both dimensions are at least the corresponding
    /// dimension of `into`, preserving aspect ratio. One dimension matches
    /// exactly; arithmetic truncates like the platform camera stack does.
    pub fn scale_crop(self, into: Size) -> Size {
        if self.width == 0 || self.height == 0 {
            return Size::new(0, 0);
        }
        let (w, h) = (self.width as u64, self.height as u64);
        let (iw, ih) = (into.width as u64, into.height as u64);
        if w * ih <= iw * h {
            // Relatively narrower than the target: match width, height covers.
            Size::new(into.width, (h * iw / w) as u32)
        } else {
            Size::new((w * ih / h) as u32, into.height)
        }
    }

    /// Scale so that both dimensions are at most the corresponding dimension
    /// of `into`, preserving aspect ratio. One dimension matches exactly.
    pub fn scale_fit(self, into: Size) -> Size {
        if self.width == 0 || self.height == 0 {
            return Size::new(0, 0);
        }
        let (w, h) = (self.width as u64, self.height as u64);
        let (iw, ih) = (into.width as u64, into.height as u64);
        if w * ih >= iw * h {
            // Relatively wider than the target: match width, height fits.
            Size::new(into.width, (h * iw / w) as u32)
        } else {
            Size::new((w * ih / h) as u32, into.height)
        }
    }

    fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl Ord for Size {
    /// Orders by total pixel count, then width, then height.
    fn cmp(&self, other: &Self) -> Ordering {
        self.pixel_count()
            .cmp(&other.pixel_count())
            .then(self.width.cmp(&other.width))
            .then(self.height.cmp(&other.height))
    }
}

impl PartialOrd for Size {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Zoom behavior of a camera session.
///
/// Replacing the config on a session only has an effect before the session
/// is opened; afterwards it is silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraZoomConfig {
    /// Whether touch-to-zoom is allowed at all. The device must also report
    /// zoom support for zoom commands to be issued.
    pub zoom_supported: bool,
    /// Upper zoom bound in device units. Zero or negative means "derive
    /// from the device".
    pub max_zoom: i32,
    /// Zoom units applied per zoom intent. Zero or negative means "derive
    /// from the effective maximum".
    pub zoom_step: i32,
}

impl Default for CameraZoomConfig {
    fn default() -> Self {
        Self {
            zoom_supported: true,
            max_zoom: 0,
            zoom_step: 3,
        }
    }
}

/// Focus behavior requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusMode {
    Auto,
    Continuous,
    Infinity,
    Macro,
}

/// Pre-open camera configuration consumed by the device backend.
///
/// Like the zoom config, replacing the settings after the session opened is
/// a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Requested device index; negative selects any available camera.
    pub requested_camera_id: i32,
    pub focus_mode: FocusMode,
    pub auto_focus_enabled: bool,
    pub continuous_focus_enabled: bool,
    pub exposure_enabled: bool,
    pub metering_enabled: bool,
    pub auto_torch_enabled: bool,
    pub scan_inverted: bool,
    pub barcode_scene_mode_enabled: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            requested_camera_id: -1,
            focus_mode: FocusMode::Auto,
            auto_focus_enabled: true,
            continuous_focus_enabled: false,
            exposure_enabled: false,
            metering_enabled: false,
            auto_torch_enabled: false,
            scan_inverted: false,
            barcode_scene_mode_enabled: false,
        }
    }
}

/// The device's key/value parameter bag, mutated through
/// [`ParametersCallback`] jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraParameters {
    values: BTreeMap<String, String>,
}

impl CameraParameters {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One-shot mutation of the device parameter bag, run on the camera worker.
pub type ParametersCallback = Box<dyn FnOnce(CameraParameters) -> CameraParameters + Send>;

/// A single preview frame captured on request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFrame {
    pub data: Vec<u8>,
    pub size: Size,
}

/// Receiver for a one-shot preview frame request.
///
/// Exactly one of the two methods is invoked per request, on the camera
/// worker thread. If the session is not open when the request is made,
/// neither is ever invoked.
pub trait PreviewCallback: Send {
    fn on_preview(&mut self, frame: PreviewFrame);
    fn on_preview_error(&mut self, error: CameraError);
}

/// Opaque handle to the display surface the preview is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewSurface {
    handle: u64,
}

impl PreviewSurface {
    pub fn from_raw(handle: u64) -> Self {
        Self { handle }
    }

    pub fn raw(self) -> u64 {
        self.handle
    }
}
