//! The camera session coordinator.
//!
//! [`CameraSession`] owns exactly one camera device for one lifecycle. The
//! owning thread (the one that constructed the session) issues non-blocking
//! lifecycle calls which validate state synchronously and enqueue device
//! work on the shared [`CameraWorker`]; the worker posts
//! [`CameraEvent`]s back through the session's notification channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::device::CameraDevice;
use crate::display::DisplayConfiguration;
use crate::errors::CameraError;
use crate::session::events::{CameraEvent, NotificationChannel};
use crate::session::worker::{CameraWorker, Job, JobKind};
use crate::types::{
    CameraSettings, CameraZoomConfig, ParametersCallback, PreviewCallback, PreviewSurface,
};

const EVENT_CAPACITY: usize = 32;

/// Lifecycle of a session, consolidated into a single variable.
///
/// The owning thread writes `Opening`/`Open`-intent/`Closing`; the worker
/// writes `Open` on successful acquisition and the terminal `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opening,
    Open,
    Closing,
}

/// State shared between the owning thread and the worker.
pub(crate) struct SessionCore {
    device: Mutex<Box<dyn CameraDevice>>,
    state: Mutex<SessionState>,
    surface: Mutex<Option<PreviewSurface>>,
    display: Mutex<Option<DisplayConfiguration>>,
    settings: Mutex<CameraSettings>,
    zoom_config: Mutex<CameraZoomConfig>,
    events: NotificationChannel,
    worker: CameraWorker,
}

pub struct CameraSession {
    core: Arc<SessionCore>,
    owner: ThreadId,
    opened_once: AtomicBool,
}

impl CameraSession {
    /// Session with a private worker thread.
    pub fn new(device: Box<dyn CameraDevice>) -> Self {
        Self::with_worker(device, CameraWorker::new())
    }

    /// Session multiplexed onto a shared worker. The constructing thread
    /// becomes the owning thread for all lifecycle calls.
    pub fn with_worker(mut device: Box<dyn CameraDevice>, worker: CameraWorker) -> Self {
        let settings = CameraSettings::default();
        device.set_camera_settings(settings.clone());
        Self {
            core: Arc::new(SessionCore {
                device: Mutex::new(device),
                state: Mutex::new(SessionState::Closed),
                surface: Mutex::new(None),
                display: Mutex::new(None),
                settings: Mutex::new(settings),
                zoom_config: Mutex::new(CameraZoomConfig::default()),
                events: NotificationChannel::new(EVENT_CAPACITY),
                worker,
            }),
            owner: thread::current().id(),
            opened_once: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.core.state.lock().expect("lock poisoned")
    }

    /// True from the moment `open()` is called until close is requested.
    /// Optimistic: it does not wait for the device to be acquired.
    pub fn is_open(&self) -> bool {
        matches!(self.state(), SessionState::Opening | SessionState::Open)
    }

    /// True only once teardown finished (or the session never opened).
    pub fn is_camera_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    pub fn set_display_configuration(
        &self,
        configuration: DisplayConfiguration,
    ) -> Result<(), CameraError> {
        self.check_owner("set_display_configuration")?;
        *self.core.display.lock().expect("lock poisoned") = Some(configuration.clone());
        self.core
            .device
            .lock()
            .expect("lock poisoned")
            .set_display_configuration(configuration);
        Ok(())
    }

    pub fn display_configuration(&self) -> Option<DisplayConfiguration> {
        self.core.display.lock().expect("lock poisoned").clone()
    }

    /// Bind the surface the preview will render into. Must happen before
    /// `start_preview`.
    pub fn set_surface(&self, surface: PreviewSurface) -> Result<(), CameraError> {
        self.check_owner("set_surface")?;
        *self.core.surface.lock().expect("lock poisoned") = Some(surface);
        Ok(())
    }

    pub fn camera_settings(&self) -> CameraSettings {
        self.core.settings.lock().expect("lock poisoned").clone()
    }

    /// Replace the settings bundle. Only has an effect while the session is
    /// not yet open; afterwards the call is silently ignored.
    pub fn set_camera_settings(&self, settings: CameraSettings) -> Result<(), CameraError> {
        self.check_owner("set_camera_settings")?;
        if !self.is_open() {
            *self.core.settings.lock().expect("lock poisoned") = settings.clone();
            self.core
                .device
                .lock()
                .expect("lock poisoned")
                .set_camera_settings(settings);
        }
        Ok(())
    }

    pub fn zoom_config(&self) -> CameraZoomConfig {
        *self.core.zoom_config.lock().expect("lock poisoned")
    }

    /// Replace the zoom config. Only has an effect while the session is not
    /// yet open; afterwards the call is silently ignored.
    pub fn set_zoom_config(&self, config: CameraZoomConfig) -> Result<(), CameraError> {
        self.check_owner("set_zoom_config")?;
        if !self.is_open() {
            *self.core.zoom_config.lock().expect("lock poisoned") = config;
        }
        Ok(())
    }

    /// Begin acquiring the device. Valid exactly once per session lifetime.
    /// The state flips to `Opening` before this returns; failures surface
    /// later as a [`CameraEvent::Error`].
    pub fn open(&self) -> Result<(), CameraError> {
        self.check_owner("open")?;
        {
            let mut state = self.core.state.lock().expect("lock poisoned");
            if self.opened_once.swap(true, Ordering::SeqCst) || *state != SessionState::Closed {
                return Err(CameraError::AlreadyOpened(
                    "a session can only be opened once".to_string(),
                ));
            }
            *state = SessionState::Opening;
        }
        if let Err(e) = self.core.worker.register_and_enqueue(self.job(JobKind::Open)) {
            // Nothing reached the worker; put the session back instead of
            // leaving it stuck half-opened with no teardown to come.
            *self.core.state.lock().expect("lock poisoned") = SessionState::Closed;
            self.opened_once.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    /// Apply settings and negotiate the preview size; posts
    /// [`CameraEvent::PreviewSizeReady`] on success.
    pub fn configure_camera(&self) -> Result<(), CameraError> {
        self.check_owner("configure_camera")?;
        self.validate_open("configure_camera")?;
        self.core.worker.enqueue(self.job(JobKind::Configure))
    }

    /// Bind the surface and start streaming preview frames.
    pub fn start_preview(&self) -> Result<(), CameraError> {
        self.check_owner("start_preview")?;
        self.validate_open("start_preview")?;
        self.core.worker.enqueue(self.job(JobKind::StartPreview))
    }

    /// Toggle the torch. A no-op unless the session is open.
    pub fn set_torch(&self, on: bool) -> Result<(), CameraError> {
        self.check_owner("set_torch")?;
        if self.is_open() {
            self.core.worker.enqueue(self.job(JobKind::SetTorch(on)))?;
        }
        Ok(())
    }

    /// Mutate the device parameter bag on the worker. A no-op unless the
    /// session is open.
    pub fn change_camera_parameters(
        &self,
        callback: ParametersCallback,
    ) -> Result<(), CameraError> {
        self.check_owner("change_camera_parameters")?;
        if self.is_open() {
            self.core
                .worker
                .enqueue(self.job(JobKind::ChangeParameters(callback)))?;
        }
        Ok(())
    }

    /// Trigger a manual focus cycle. A no-op unless the session is open.
    pub fn manual_focus(&self) -> Result<(), CameraError> {
        self.check_owner("manual_focus")?;
        if self.is_open() {
            self.core.worker.enqueue(self.job(JobKind::Focus))?;
        }
        Ok(())
    }

    /// Request a single preview frame. Silently dropped when the session is
    /// not open; the callback is then guaranteed never to be invoked.
    pub fn request_preview(&self, callback: Box<dyn PreviewCallback>) {
        if !self.is_open() {
            log::debug!("camera session is closed, not requesting preview");
            return;
        }
        if let Err(e) = self
            .core
            .worker
            .enqueue(self.job(JobKind::RequestFrame(callback)))
        {
            log::debug!("dropping preview request: {}", e);
        }
    }

    /// Request teardown. Already-queued jobs still run against the device
    /// first; teardown is enqueued behind them. Idempotent: closing a
    /// session that is already closing or closed is a synchronous no-op.
    pub fn close(&self) -> Result<(), CameraError> {
        self.check_owner("close")?;
        self.enqueue_close()
    }

    /// True when both the config and the device allow zooming.
    pub fn zoom_supported(&self) -> bool {
        self.core.zoom_config.lock().expect("lock poisoned").zoom_supported
            && self
                .core
                .device
                .lock()
                .expect("lock poisoned")
                .is_zoom_supported()
    }

    /// Effective zoom ceiling: half the device ceiling, further capped by a
    /// positive configured maximum.
    pub fn max_zoom(&self) -> i32 {
        let configured = self.core.zoom_config.lock().expect("lock poisoned").max_zoom;
        let device_max =
            (self.core.device.lock().expect("lock poisoned").max_zoom() / 2).max(0);
        if configured < 1 {
            device_max
        } else {
            device_max.min(configured)
        }
    }

    /// Effective step per zoom intent: the configured step when positive,
    /// otherwise a quarter of the effective maximum.
    pub fn zoom_step(&self) -> i32 {
        let configured = self.core.zoom_config.lock().expect("lock poisoned").zoom_step;
        if configured < 1 {
            self.max_zoom() / 4
        } else {
            configured
        }
    }

    /// Apply one zoom step in or out. A no-op unless zoom is supported and
    /// the session is open; no device job is enqueued when the clamped
    /// level is unchanged.
    pub fn zoom_camera(&self, zoom_in: bool) -> Result<(), CameraError> {
        self.check_owner("zoom_camera")?;
        if !self.zoom_supported() || !self.is_open() {
            return Ok(());
        }

        let max_zoom = self.max_zoom();
        let zoom_step = self.zoom_step();
        let current = self.core.device.lock().expect("lock poisoned").zoom();

        let mut level = current;
        if zoom_in {
            if level < max_zoom {
                level += zoom_step;
            }
        } else if level > 0 {
            level -= zoom_step;
        }
        let level = level.clamp(0, max_zoom);

        log::debug!(
            "zoom {} -> {} (step {}, max {})",
            current,
            level,
            zoom_step,
            max_zoom
        );
        if level != current {
            self.core.worker.enqueue(self.job(JobKind::SetZoom(level)))?;
        }
        Ok(())
    }

    /// Wait up to `timeout` for the next notification from the worker.
    pub fn poll_event(&self, timeout: Duration) -> Option<CameraEvent> {
        self.core.events.poll(timeout)
    }

    /// Notifications discarded because the owner fell behind.
    pub fn dropped_events(&self) -> u64 {
        self.core.events.dropped()
    }

    fn enqueue_close(&self) -> Result<(), CameraError> {
        let mut state = self.core.state.lock().expect("lock poisoned");
        match *state {
            SessionState::Opening | SessionState::Open => {
                *state = SessionState::Closing;
                drop(state);
                self.core.worker.enqueue(self.job(JobKind::Close))
            }
            SessionState::Closing | SessionState::Closed => Ok(()),
        }
    }

    fn validate_open(&self, op: &str) -> Result<(), CameraError> {
        if !self.is_open() {
            return Err(CameraError::NotOpen(format!(
                "{} requires an open session",
                op
            )));
        }
        Ok(())
    }

    fn check_owner(&self, op: &str) -> Result<(), CameraError> {
        if thread::current().id() != self.owner {
            return Err(CameraError::WrongThread(format!(
                "{} must be called from the owning thread",
                op
            )));
        }
        Ok(())
    }

    fn job(&self, kind: JobKind) -> Job {
        Job {
            session: Arc::clone(&self.core),
            kind,
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        if let Err(e) = self.enqueue_close() {
            log::warn!("failed to close camera session in drop: {}", e);
        }
    }
}

impl SessionCore {
    /// Executed on the worker thread, strictly in submission order.
    pub(crate) fn run(&self, kind: JobKind) {
        match kind {
            JobKind::Open => self.run_open(),
            JobKind::Configure => self.run_configure(),
            JobKind::StartPreview => self.run_start_preview(),
            JobKind::SetTorch(on) => self.run_control("set torch", |device| device.set_torch(on)),
            JobKind::SetZoom(level) => {
                self.run_control("set zoom", move |device| device.set_zoom(level))
            }
            JobKind::ChangeParameters(callback) => self.run_control("change parameters", |device| {
                device.change_parameters(callback)
            }),
            JobKind::Focus => self.run_control("focus", |device| device.focus()),
            JobKind::RequestFrame(callback) => {
                self.device
                    .lock()
                    .expect("lock poisoned")
                    .request_preview_frame(callback);
            }
            JobKind::Close => self.run_close(),
        }
    }

    fn run_open(&self) {
        log::debug!("opening camera");
        let result = self.device.lock().expect("lock poisoned").open();
        match result {
            Ok(()) => {
                let mut state = self.state.lock().expect("lock poisoned");
                // Close may already have been requested; never resurrect.
                if *state == SessionState::Opening {
                    *state = SessionState::Open;
                }
            }
            Err(e) => {
                log::error!("failed to open camera: {}", e);
                self.events.post(CameraEvent::Error(e));
            }
        }
    }

    fn run_configure(&self) {
        log::debug!("configuring camera");
        let result = self.device.lock().expect("lock poisoned").configure();
        match result {
            Ok(()) => {
                // Keep the device and display locks disjoint; the owning
                // thread takes them in the opposite order.
                let negotiated = self.device.lock().expect("lock poisoned").preview_size();
                let negotiated = negotiated.or_else(|| {
                    self.display
                        .lock()
                        .expect("lock poisoned")
                        .as_ref()
                        .and_then(|display| display.desired_preview_size())
                });
                match negotiated {
                    Some(size) => self.events.post(CameraEvent::PreviewSizeReady(size)),
                    None => self.events.post(CameraEvent::Error(
                        CameraError::ConfigurationError(
                            "no preview size negotiated".to_string(),
                        ),
                    )),
                }
            }
            Err(e) => {
                log::error!("failed to configure camera: {}", e);
                self.events.post(CameraEvent::Error(e));
            }
        }
    }

    fn run_start_preview(&self) {
        log::debug!("starting preview");
        let surface = *self.surface.lock().expect("lock poisoned");
        let result = match surface {
            Some(surface) => {
                let mut device = self.device.lock().expect("lock poisoned");
                device
                    .set_preview_display(&surface)
                    .and_then(|()| device.start_preview())
            }
            None => Err(CameraError::PreviewError(
                "no preview surface bound".to_string(),
            )),
        };
        if let Err(e) = result {
            log::error!("failed to start preview: {}", e);
            self.events.post(CameraEvent::Error(e));
        }
    }

    /// Control jobs never surface errors as events; a fault is logged and
    /// the worker moves on.
    fn run_control<F>(&self, op: &str, apply: F)
    where
        F: FnOnce(&mut dyn CameraDevice) -> Result<(), CameraError>,
    {
        let mut device = self.device.lock().expect("lock poisoned");
        if let Err(e) = apply(device.as_mut()) {
            log::warn!("camera {} failed: {}", op, e);
        }
    }

    /// Teardown swallows device faults; the terminal bookkeeping below runs
    /// unconditionally.
    fn run_close(&self) {
        log::debug!("closing camera");
        {
            let mut device = self.device.lock().expect("lock poisoned");
            if let Err(e) = device.stop_preview() {
                log::warn!("failed to stop preview: {}", e);
            }
            if let Err(e) = device.close() {
                log::warn!("failed to close camera: {}", e);
            }
        }

        *self.state.lock().expect("lock poisoned") = SessionState::Closed;
        self.events.post(CameraEvent::Closed);
        self.events.close();
        self.worker.deregister();
    }
}
