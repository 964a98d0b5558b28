//! Tests for the camera session coordinator.
//!
//! Runs against the scriptable `FakeCamera` backend; events are awaited
//! through the session's notification channel and device-call ordering is
//! asserted through the fake's shared op log.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use scancam::testing::{DeviceOp, FakeCamera, FakeCameraLog};
use scancam::{
    CameraError, CameraEvent, CameraSession, CameraWorker, CameraZoomConfig,
    DisplayConfiguration, PreviewCallback, PreviewFrame, PreviewSurface, Size,
};

const WAIT: Duration = Duration::from_secs(5);

fn open_session(camera: FakeCamera) -> (CameraSession, FakeCameraLog) {
    let log = camera.log();
    let session = CameraSession::new(Box::new(camera));
    (session, log)
}

fn await_event(session: &CameraSession) -> CameraEvent {
    session.poll_event(WAIT).expect("no event within timeout")
}

#[test]
fn configure_before_open_fails_fast() {
    let (session, log) = open_session(FakeCamera::new());
    assert!(matches!(
        session.configure_camera(),
        Err(CameraError::NotOpen(_))
    ));
    assert!(matches!(
        session.start_preview(),
        Err(CameraError::NotOpen(_))
    ));
    assert!(log.ops().is_empty());
}

#[test]
fn lifecycle_jobs_run_in_submission_order() {
    let camera = FakeCamera::new().with_supported_sizes(vec![
        Size::new(30, 40),
        Size::new(1000, 1000),
        Size::new(120, 90),
        Size::new(120, 100),
    ]);
    let (session, log) = open_session(camera);

    session
        .set_display_configuration(DisplayConfiguration::new(Size::new(120, 90)))
        .unwrap();
    session.set_surface(PreviewSurface::from_raw(7)).unwrap();

    session.open().unwrap();
    assert!(session.is_open());
    session.configure_camera().unwrap();
    session.start_preview().unwrap();

    assert_eq!(
        await_event(&session),
        CameraEvent::PreviewSizeReady(Size::new(120, 90))
    );

    session.close().unwrap();
    assert!(!session.is_open());
    assert_eq!(await_event(&session), CameraEvent::Closed);
    assert!(session.is_camera_closed());

    assert_eq!(
        log.ops(),
        vec![
            DeviceOp::Open,
            DeviceOp::Configure,
            DeviceOp::SetPreviewDisplay(7),
            DeviceOp::StartPreview,
            DeviceOp::StopPreview,
            DeviceOp::Close,
        ]
    );
}

#[test]
fn open_is_optimistic_and_once_only() {
    let (session, _log) = open_session(FakeCamera::new());
    session.open().unwrap();
    // Visible before the device is actually acquired.
    assert!(session.is_open());
    assert!(matches!(session.open(), Err(CameraError::AlreadyOpened(_))));

    session.close().unwrap();
    assert_eq!(await_event(&session), CameraEvent::Closed);
    // A fully closed session cannot be resurrected either.
    assert!(matches!(session.open(), Err(CameraError::AlreadyOpened(_))));
}

#[test]
fn open_failure_posts_error_and_close_still_tears_down() {
    let (session, log) = open_session(FakeCamera::new().failing_open());
    session.open().unwrap();

    match await_event(&session) {
        CameraEvent::Error(CameraError::OpenError(_)) => {}
        other => panic!("expected open error event, got {:?}", other),
    }
    // Optimistic state is not reverted on failure.
    assert!(session.is_open());

    session.close().unwrap();
    assert_eq!(await_event(&session), CameraEvent::Closed);
    assert!(log.wait_for(&DeviceOp::StopPreview, WAIT));
    assert!(log.wait_for(&DeviceOp::Close, WAIT));
}

#[test]
fn configure_failure_posts_error_and_worker_keeps_running() {
    let (session, log) = open_session(FakeCamera::new().failing_configure());
    session.open().unwrap();
    session.configure_camera().unwrap();

    match await_event(&session) {
        CameraEvent::Error(CameraError::ConfigurationError(_)) => {}
        other => panic!("expected configure error event, got {:?}", other),
    }

    // The worker is still alive and processes later jobs.
    session.set_torch(true).unwrap();
    assert!(log.wait_for(&DeviceOp::SetTorch(true), WAIT));
    session.close().unwrap();
    assert_eq!(await_event(&session), CameraEvent::Closed);
}

#[test]
fn start_preview_without_surface_posts_error() {
    let (session, _log) = open_session(FakeCamera::new());
    session.open().unwrap();
    session.start_preview().unwrap();
    match await_event(&session) {
        CameraEvent::Error(CameraError::PreviewError(_)) => {}
        other => panic!("expected preview error event, got {:?}", other),
    }
}

#[test]
fn teardown_completes_even_when_the_device_close_fails() {
    let (session, log) = open_session(FakeCamera::new().failing_close());
    session.open().unwrap();
    session.close().unwrap();

    // The fault is swallowed, never surfaced as an Error event.
    assert_eq!(await_event(&session), CameraEvent::Closed);
    assert!(session.is_camera_closed());
    assert_eq!(log.count(&DeviceOp::Close), 1);
}

#[test]
fn close_is_idempotent() {
    let (session, log) = open_session(FakeCamera::new());
    session.open().unwrap();
    session.close().unwrap();
    assert_eq!(await_event(&session), CameraEvent::Closed);

    session.close().unwrap();
    session.close().unwrap();
    assert_eq!(log.count(&DeviceOp::Close), 1);
}

#[test]
fn close_without_open_is_a_synchronous_noop() {
    let (session, log) = open_session(FakeCamera::new());
    session.close().unwrap();
    assert!(session.is_camera_closed());
    assert!(log.ops().is_empty());
}

#[test]
fn queued_jobs_run_before_teardown() {
    let (session, log) = open_session(FakeCamera::new());
    session.open().unwrap();
    session.set_torch(true).unwrap();
    session.close().unwrap();

    assert_eq!(await_event(&session), CameraEvent::Closed);
    assert_eq!(
        log.ops(),
        vec![
            DeviceOp::Open,
            DeviceOp::SetTorch(true),
            DeviceOp::StopPreview,
            DeviceOp::Close,
        ]
    );
}

#[test]
fn control_ops_are_noops_when_not_open() {
    let (session, log) = open_session(FakeCamera::new());
    session.set_torch(true).unwrap();
    session.manual_focus().unwrap();
    session
        .change_camera_parameters(Box::new(|mut params| {
            params.set("torch", "on");
            params
        }))
        .unwrap();
    session.zoom_camera(true).unwrap();
    thread::sleep(Duration::from_millis(30));
    assert!(log.ops().is_empty());
}

#[test]
fn change_parameters_mutates_the_device_bag() {
    let (session, log) = open_session(FakeCamera::new());
    session.open().unwrap();
    session
        .change_camera_parameters(Box::new(|mut params| {
            params.set("scene-mode", "barcode");
            params
        }))
        .unwrap();
    assert!(log.wait_for(&DeviceOp::ChangeParameters, WAIT));
    session.close().unwrap();
    assert_eq!(await_event(&session), CameraEvent::Closed);
}

#[test]
fn settings_replacement_after_open_is_ignored() {
    let (session, _log) = open_session(FakeCamera::new());

    let mut settings = session.camera_settings();
    settings.scan_inverted = true;
    session.set_camera_settings(settings.clone()).unwrap();
    assert!(session.camera_settings().scan_inverted);

    session.open().unwrap();
    settings.scan_inverted = false;
    session.set_camera_settings(settings).unwrap();
    assert!(session.camera_settings().scan_inverted);

    let mut zoom = session.zoom_config();
    zoom.zoom_step = 9;
    session.set_zoom_config(zoom).unwrap();
    assert_eq!(session.zoom_config().zoom_step, 3);
}

#[test]
fn zoom_in_applies_steps_and_clamps_at_max() {
    // Device ceiling 100 -> effective max 50, default step 3.
    let (session, log) = open_session(FakeCamera::new().with_max_zoom(100));
    assert_eq!(session.max_zoom(), 50);
    assert_eq!(session.zoom_step(), 3);

    session.open().unwrap();
    session.zoom_camera(true).unwrap();
    assert!(log.wait_for(&DeviceOp::SetZoom(3), WAIT));
    session.zoom_camera(true).unwrap();
    assert!(log.wait_for(&DeviceOp::SetZoom(6), WAIT));
}

#[test]
fn zoom_at_max_is_idempotent() {
    let (session, log) = open_session(FakeCamera::new().with_max_zoom(100).with_zoom(50));
    session.open().unwrap();
    session.zoom_camera(true).unwrap();
    session.close().unwrap();
    assert_eq!(await_event(&session), CameraEvent::Closed);

    // FIFO: any zoom job would have been recorded before Close ran.
    assert!(!log.ops().iter().any(|op| matches!(op, DeviceOp::SetZoom(_))));
}

#[test]
fn zoom_out_clamps_at_zero() {
    let (session, log) = open_session(FakeCamera::new().with_max_zoom(100).with_zoom(2));
    session.open().unwrap();
    session.zoom_camera(false).unwrap();
    assert!(log.wait_for(&DeviceOp::SetZoom(0), WAIT));

    // Already at the floor: no further job.
    session.zoom_camera(false).unwrap();
    session.close().unwrap();
    assert_eq!(await_event(&session), CameraEvent::Closed);
    assert_eq!(log.count(&DeviceOp::SetZoom(0)), 1);
}

#[test]
fn configured_zoom_bounds_cap_the_device() {
    let (session, _log) = open_session(FakeCamera::new().with_max_zoom(100));
    session
        .set_zoom_config(CameraZoomConfig {
            zoom_supported: true,
            max_zoom: 10,
            zoom_step: 4,
        })
        .unwrap();
    assert_eq!(session.max_zoom(), 10);
    assert_eq!(session.zoom_step(), 4);

    // A configured max above the device-derived default is ignored.
    session
        .set_zoom_config(CameraZoomConfig {
            zoom_supported: true,
            max_zoom: 500,
            zoom_step: 0,
        })
        .unwrap();
    assert_eq!(session.max_zoom(), 50);
    // Derived step: a quarter of the effective maximum.
    assert_eq!(session.zoom_step(), 12);
}

#[test]
fn zoom_is_a_noop_when_unsupported() {
    let (session, log) = open_session(FakeCamera::new().with_zoom_supported(false));
    session.open().unwrap();
    assert!(!session.zoom_supported());
    session.zoom_camera(true).unwrap();

    let (session2, log2) = open_session(FakeCamera::new());
    session2
        .set_zoom_config(CameraZoomConfig {
            zoom_supported: false,
            ..CameraZoomConfig::default()
        })
        .unwrap();
    session2.open().unwrap();
    session2.zoom_camera(true).unwrap();

    session.close().unwrap();
    session2.close().unwrap();
    assert_eq!(await_event(&session), CameraEvent::Closed);
    assert_eq!(await_event(&session2), CameraEvent::Closed);
    assert!(!log.ops().iter().any(|op| matches!(op, DeviceOp::SetZoom(_))));
    assert!(!log2.ops().iter().any(|op| matches!(op, DeviceOp::SetZoom(_))));
}

struct FrameSink {
    frame: Arc<Mutex<Option<PreviewFrame>>>,
    invoked: Arc<AtomicBool>,
}

impl PreviewCallback for FrameSink {
    fn on_preview(&mut self, frame: PreviewFrame) {
        *self.frame.lock().unwrap() = Some(frame);
        self.invoked.store(true, Ordering::SeqCst);
    }

    fn on_preview_error(&mut self, _error: CameraError) {
        self.invoked.store(true, Ordering::SeqCst);
    }
}

#[test]
fn request_preview_when_closed_never_invokes_callback() {
    let (session, log) = open_session(FakeCamera::new());
    let invoked = Arc::new(AtomicBool::new(false));
    session.request_preview(Box::new(FrameSink {
        frame: Arc::new(Mutex::new(None)),
        invoked: invoked.clone(),
    }));
    thread::sleep(Duration::from_millis(50));
    assert!(!invoked.load(Ordering::SeqCst));
    assert!(log.ops().is_empty());
}

#[test]
fn request_preview_delivers_a_frame() {
    let camera = FakeCamera::new().with_supported_sizes(vec![Size::new(640, 480)]);
    let (session, log) = open_session(camera);
    session
        .set_display_configuration(DisplayConfiguration::new(Size::new(640, 480)))
        .unwrap();
    session.open().unwrap();
    session.configure_camera().unwrap();
    assert_eq!(
        await_event(&session),
        CameraEvent::PreviewSizeReady(Size::new(640, 480))
    );

    let frame = Arc::new(Mutex::new(None));
    let invoked = Arc::new(AtomicBool::new(false));
    session.request_preview(Box::new(FrameSink {
        frame: frame.clone(),
        invoked: invoked.clone(),
    }));
    assert!(log.wait_for(&DeviceOp::RequestFrame, WAIT));

    let deadline = Instant::now() + WAIT;
    while !invoked.load(Ordering::SeqCst) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(2));
    }
    let frame = frame.lock().unwrap().take().expect("no frame delivered");
    assert_eq!(frame.size, Size::new(640, 480));
}

#[test]
fn lifecycle_calls_off_the_owning_thread_are_rejected() {
    let (session, _log) = open_session(FakeCamera::new());
    thread::scope(|scope| {
        scope
            .spawn(|| {
                assert!(matches!(session.open(), Err(CameraError::WrongThread(_))));
                assert!(matches!(
                    session.configure_camera(),
                    Err(CameraError::WrongThread(_))
                ));
                assert!(matches!(
                    session.close(),
                    Err(CameraError::WrongThread(_))
                ));
                assert!(matches!(
                    session.zoom_camera(true),
                    Err(CameraError::WrongThread(_))
                ));
            })
            .join()
            .unwrap();
    });
    // The owning thread is unaffected.
    session.open().unwrap();
    session.close().unwrap();
    assert_eq!(await_event(&session), CameraEvent::Closed);
}

#[test]
fn sessions_share_one_worker_and_release_it() {
    let worker = CameraWorker::new();
    let first = FakeCamera::new();
    let second = FakeCamera::new();
    let session_a = CameraSession::with_worker(Box::new(first), worker.clone());
    let session_b = CameraSession::with_worker(Box::new(second), worker.clone());

    session_a.open().unwrap();
    session_b.open().unwrap();
    assert_eq!(worker.active_sessions(), 2);

    session_a.close().unwrap();
    session_b.close().unwrap();
    assert_eq!(await_event(&session_a), CameraEvent::Closed);
    assert_eq!(await_event(&session_b), CameraEvent::Closed);

    let deadline = Instant::now() + WAIT;
    while worker.active_sessions() != 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(worker.active_sessions(), 0);
}

#[test]
fn dropping_an_open_session_tears_it_down() {
    let camera = FakeCamera::new();
    let log = camera.log();
    {
        let session = CameraSession::new(Box::new(camera));
        session.open().unwrap();
    }
    assert!(log.wait_for(&DeviceOp::Close, WAIT));
}
