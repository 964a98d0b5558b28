use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    WrongThread(String),
    NotOpen(String),
    AlreadyOpened(String),
    OpenError(String),
    ConfigurationError(String),
    PreviewError(String),
    ControlError(String),
    WorkerError(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CameraError::WrongThread(msg) => write!(f, "Wrong thread: {}", msg),
            CameraError::NotOpen(msg) => write!(f, "Session not open: {}", msg),
            CameraError::AlreadyOpened(msg) => write!(f, "Session already opened: {}", msg),
            CameraError::OpenError(msg) => write!(f, "Camera open error: {}", msg),
            CameraError::ConfigurationError(msg) => write!(f, "Camera configuration error: {}", msg),
            CameraError::PreviewError(msg) => write!(f, "Preview error: {}", msg),
            CameraError::ControlError(msg) => write!(f, "Camera control error: {}", msg),
            CameraError::WorkerError(msg) => write!(f, "Camera worker error: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}
