//! ScanCam: camera session coordination for barcode-scanner preview UIs.
//!
//! This crate provides the algorithmic core of a scanner viewfinder:
//! choosing the preview resolution that best serves the display, driving a
//! camera device through its open/configure/preview/close lifecycle on a
//! single serialized worker, and translating pinch gestures into throttled
//! zoom commands.
//!
//! # Features
//! - Preview-size ranking under pluggable scaling strategies
//! - Single-threaded camera session coordinator with asynchronous events
//! - Discrete zoom arithmetic with device- and config-derived bounds
//! - Rate-limited pinch-to-zoom gesture translation
//! - Scriptable fake device backend for offline testing
//!
//! # Usage
//! ```rust
//! use std::time::Duration;
//! use scancam::testing::FakeCamera;
//! use scancam::{CameraSession, DisplayConfiguration, PreviewSurface, Size};
//!
//! let session = CameraSession::new(Box::new(FakeCamera::new()));
//! session.set_display_configuration(DisplayConfiguration::new(Size::new(1280, 720))).unwrap();
//! session.set_surface(PreviewSurface::from_raw(1)).unwrap();
//! session.open().unwrap();
//! session.configure_camera().unwrap();
//! session.start_preview().unwrap();
//! let ready = session.poll_event(Duration::from_secs(5));
//! session.close().unwrap();
//! # let _ = ready;
//! ```
pub mod config;
pub mod device;
pub mod display;
pub mod errors;
pub mod gesture;
pub mod scaling;
pub mod session;
pub mod types;

// Testing utilities - scriptable fake device for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::ScancamConfig;
pub use device::CameraDevice;
pub use display::DisplayConfiguration;
pub use errors::CameraError;
pub use gesture::{PinchZoomDetector, TouchAction, TouchPoint, ZoomIntent};
pub use scaling::{CenterCropStrategy, FitCenterStrategy, PreviewScalingStrategy};
pub use session::{CameraEvent, CameraSession, CameraWorker, SessionState};
pub use types::{
    CameraParameters, CameraSettings, CameraZoomConfig, PreviewCallback, PreviewFrame,
    PreviewSurface, Size,
};

/// Initialize logging for the camera system
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "scancam=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
