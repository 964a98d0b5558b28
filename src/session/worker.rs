//! The shared single-thread executor for camera device jobs.
//!
//! Every device-mutating operation becomes a [`JobKind`] processed strictly
//! in submission order on one worker thread; that thread is the only place
//! device state changes, which is what makes the non-thread-safe device
//! handle sound. Sessions register on first use and deregister during
//! teardown; when the last session is gone the thread drains and exits.

use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::errors::CameraError;
use crate::session::coordinator::SessionCore;
use crate::types::{ParametersCallback, PreviewCallback};

/// A device job as plain data, dispatched by the worker's single match.
pub(crate) enum JobKind {
    Open,
    Configure,
    StartPreview,
    SetTorch(bool),
    SetZoom(i32),
    ChangeParameters(ParametersCallback),
    RequestFrame(Box<dyn PreviewCallback>),
    Focus,
    Close,
}

pub(crate) struct Job {
    pub(crate) session: Arc<SessionCore>,
    pub(crate) kind: JobKind,
}

/// Handle to the shared camera worker. Cloning shares the same thread;
/// multiple sessions can multiplex onto one worker.
#[derive(Clone, Default)]
pub struct CameraWorker {
    inner: Arc<WorkerInner>,
}

#[derive(Default)]
struct WorkerInner {
    state: Mutex<WorkerState>,
}

#[derive(Default)]
struct WorkerState {
    sender: Option<Sender<Job>>,
    handle: Option<thread::JoinHandle<()>>,
    sessions: SessionCount,
}

impl CameraWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions currently registered on this worker.
    pub fn active_sessions(&self) -> u32 {
        self.inner.state.lock().expect("lock poisoned").sessions.get()
    }

    /// Register a new session and submit its first job, spawning the worker
    /// thread if none is running.
    pub(crate) fn register_and_enqueue(&self, job: Job) -> Result<(), CameraError> {
        let mut state = self.inner.state.lock().expect("lock poisoned");
        if state.sender.is_none() {
            let (sender, receiver) = unbounded();
            let handle = thread::Builder::new()
                .name("scancam-camera-worker".to_string())
                .spawn(move || worker_loop(receiver))
                .map_err(|e| {
                    CameraError::WorkerError(format!("failed to spawn camera worker: {}", e))
                })?;
            state.sender = Some(sender);
            state.handle = Some(handle);
        }
        send(&state, job)?;
        state.sessions.increment();
        Ok(())
    }

    pub(crate) fn enqueue(&self, job: Job) -> Result<(), CameraError> {
        let state = self.inner.state.lock().expect("lock poisoned");
        send(&state, job)
    }

    /// Called by a session's teardown job once its terminal bookkeeping is
    /// done. Dropping the sender lets the thread drain and exit; the handle
    /// is detached since teardown itself runs on the worker thread.
    pub(crate) fn deregister(&self) {
        let mut state = self.inner.state.lock().expect("lock poisoned");
        if state.sessions.decrement() {
            state.sender = None;
            state.handle = None;
        }
    }
}

fn send(state: &WorkerState, job: Job) -> Result<(), CameraError> {
    match &state.sender {
        Some(sender) => sender
            .send(job)
            .map_err(|_| CameraError::WorkerError("camera worker is gone".to_string())),
        None => Err(CameraError::WorkerError(
            "no camera worker running".to_string(),
        )),
    }
}

fn worker_loop(receiver: Receiver<Job>) {
    log::debug!("camera worker started");
    while let Ok(job) = receiver.recv() {
        job.session.run(job.kind);
    }
    log::debug!("camera worker stopped");
}

/// Checked count of sessions using the worker. Underflow is a logic error
/// in the caller; it is logged and the count stays at zero instead of
/// wrapping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionCount(u32);

impl SessionCount {
    fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    /// Returns true when the count reaches zero.
    fn decrement(&mut self) -> bool {
        match self.0.checked_sub(1) {
            Some(n) => {
                self.0 = n;
                n == 0
            }
            None => {
                log::error!("camera worker session count underflow");
                false
            }
        }
    }

    fn get(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
impl CameraWorker {
    /// Worker whose job channel is already torn down, so every submission
    /// fails with [`CameraError::WorkerError`].
    pub(crate) fn with_disconnected_sender() -> Self {
        let worker = Self::new();
        let (sender, _) = unbounded();
        worker.inner.state.lock().expect("lock poisoned").sender = Some(sender);
        worker
    }
}
