//! Camera session coordination.
//!
//! One [`CameraSession`] owns one camera device for one
//! acquisition/use/release cycle. All device work is serialized onto a
//! single [`CameraWorker`] thread in submission order; results come back as
//! [`CameraEvent`]s polled by the owning thread.

pub mod coordinator;
pub mod events;
pub mod worker;

pub use coordinator::{CameraSession, SessionState};
pub use events::{CameraEvent, NotificationChannel};
pub use worker::CameraWorker;
