//! Pinch-gesture to zoom-intent translation.
//!
//! [`PinchZoomDetector`] consumes raw multi-touch samples on the input
//! thread and turns two-finger pinch motion into discrete [`ZoomIntent`]s.
//! Emissions are throttled so a burst of move events cannot flood the
//! session coordinator's job queue; the caller forwards each intent to
//! [`crate::session::CameraSession::zoom_camera`].

/// Minimum gap between two emitted zoom intents, in sample-time units.
pub const PINCH_EMIT_INTERVAL_MS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// An additional pointer went down.
    PointerDown,
    Move,
    /// A pointer lifted.
    PointerUp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomIntent {
    In,
    Out,
}

impl ZoomIntent {
    pub fn is_zoom_in(self) -> bool {
        self == ZoomIntent::In
    }
}

/// Stateful two-finger pinch interpreter.
///
/// Zoom is incremental: the baseline finger spacing is refreshed after
/// every move, so each intent reflects motion since the previous sample,
/// not since the gesture started.
#[derive(Debug)]
pub struct PinchZoomDetector {
    baseline: Option<i64>,
    last_emit_ms: Option<u64>,
    emit_interval_ms: u64,
}

impl Default for PinchZoomDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PinchZoomDetector {
    pub fn new() -> Self {
        Self::with_emit_interval(PINCH_EMIT_INTERVAL_MS)
    }

    /// Detector with a custom emission throttle, for hosts whose input
    /// clock ticks differently.
    pub fn with_emit_interval(emit_interval_ms: u64) -> Self {
        Self {
            baseline: None,
            last_emit_ms: None,
            emit_interval_ms,
        }
    }

    /// Feed one touch sample. `timestamp_ms` is the event time reported by
    /// the input source. Samples without exactly two points are left for
    /// default handling and return `None`.
    pub fn on_touch(
        &mut self,
        action: TouchAction,
        timestamp_ms: u64,
        points: &[TouchPoint],
    ) -> Option<ZoomIntent> {
        if points.len() != 2 {
            return None;
        }
        match action {
            TouchAction::PointerDown => {
                self.baseline = Some(finger_spacing(points));
                None
            }
            TouchAction::Move => {
                let spacing = finger_spacing(points);
                let baseline = match self.baseline {
                    Some(baseline) => baseline,
                    None => {
                        // Move without a preceding pointer-down; treat it as
                        // the start of the gesture.
                        self.baseline = Some(spacing);
                        return None;
                    }
                };

                let intent = if spacing > baseline {
                    Some(ZoomIntent::In)
                } else if spacing < baseline {
                    Some(ZoomIntent::Out)
                } else {
                    None
                };
                self.baseline = Some(spacing);

                let intent = intent?;
                if !self.ready_to_emit(timestamp_ms) {
                    return None;
                }
                self.last_emit_ms = Some(timestamp_ms);
                Some(intent)
            }
            TouchAction::PointerUp => {
                self.baseline = None;
                None
            }
        }
    }

    fn ready_to_emit(&self, now_ms: u64) -> bool {
        match self.last_emit_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.emit_interval_ms,
        }
    }
}

/// Inter-finger distance floored to whole units.
fn finger_spacing(points: &[TouchPoint]) -> i64 {
    let dx = (points[0].x - points[1].x) as f64;
    let dy = (points[0].y - points[1].y) as f64;
    (dx * dx + dy * dy).sqrt().floor() as i64
}
