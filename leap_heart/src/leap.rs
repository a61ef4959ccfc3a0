//! LeapMotion landmark provider (feature = "leap").
//!
//! The LeapC connection lives on its own polling thread, which keeps the
//! most recent tracking frame as 21-point hands.  [`LeapLandmarkProvider::detect`]
//! only reads that snapshot, so an inference request never waits on the
//! device.
//!
//! | LeapC joint | Keypoint |
//! |---|---|
//! | middle metacarpal, base | wrist |
//! | thumb proximal / intermediate / distal bases, tip | 1–4 |
//! | finger proximal / intermediate / distal bases, tip | MCP, PIP, DIP, TIP |
//!
//! Millimetre coordinates over the device are mapped onto the unit square:
//! x −200…200 mm → 0…1, height 500…100 mm → 0…1 (screen y grows downward).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{info, warn};

use heart_fx::{DetectError, LandmarkProvider};
use heart_gesture::landmark::Keypoint;
use heart_gesture::DetectionResult;

const SPAN_X_MM:  f32 = 400.0;
const SPAN_Y_MM:  f32 = 400.0;
const CEILING_MM: f32 = 500.0;
const POLL_MS:    u32 = 100;

type Snapshot = Option<Result<Vec<Vec<Keypoint>>, String>>;

pub struct LeapLandmarkProvider {
    latest: Arc<Mutex<Snapshot>>,
    stop:   Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl LeapLandmarkProvider {
    /// Open the device and start polling.
    pub fn spawn() -> Self {
        let latest = Arc::new(Mutex::new(None));
        let stop   = Arc::new(AtomicBool::new(false));

        let (l, s) = (latest.clone(), stop.clone());
        let thread = thread::spawn(move || poll_device(l, s));

        LeapLandmarkProvider { latest, stop, thread: Some(thread) }
    }
}

impl LandmarkProvider for LeapLandmarkProvider {
    fn detect(&mut self, timestamp_ms: f64) -> Result<DetectionResult, DetectError> {
        let guard = self.latest.lock().map_err(|_| DetectError::Disconnected)?;
        match guard.as_ref() {
            None              => Err(DetectError::Unavailable),
            Some(Err(msg))    => Err(DetectError::Failed(msg.clone())),
            Some(Ok(hands))   => Ok(DetectionResult::from_raw(timestamp_ms, hands)),
        }
    }
}

impl Drop for LeapLandmarkProvider {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Polling thread
// ════════════════════════════════════════════════════════════════════════════

fn publish(latest: &Mutex<Snapshot>, value: Result<Vec<Vec<Keypoint>>, String>) {
    if let Ok(mut slot) = latest.lock() {
        *slot = Some(value);
    }
}

fn poll_device(latest: Arc<Mutex<Snapshot>>, stop: Arc<AtomicBool>) {
    use leaprs::*;

    let mut connection = match Connection::create(ConnectionConfig::default()) {
        Ok(c)  => c,
        Err(e) => {
            warn!("LeapC connection failed: {:?}", e);
            publish(&latest, Err(format!("LeapC connection failed: {:?}", e)));
            return;
        }
    };
    if let Err(e) = connection.open() {
        warn!("LeapMotion device failed to open: {:?}", e);
        publish(&latest, Err(format!("LeapMotion device failed to open: {:?}", e)));
        return;
    }
    info!("LeapMotion connection open");

    while !stop.load(Ordering::Relaxed) {
        let msg = match connection.poll(POLL_MS) {
            Ok(m)  => m,
            Err(_) => continue,
        };
        if let EventRef::Tracking(frame) = msg.event() {
            let hands: Vec<Vec<Keypoint>> = frame
                .hands()
                .into_iter()
                .map(|hand| {
                    let digits: Vec<_> = hand.digits().into_iter().collect();
                    if digits.len() < 5 {
                        return Vec::new();
                    }
                    let metacarpal = digits[2].metacarpal();
                    let wrist = metacarpal.prev_joint();
                    let mut points = vec![normalize(wrist.x, wrist.y)];
                    for digit in &digits {
                        for joint in [
                            digit.proximal().prev_joint(),
                            digit.intermediate().prev_joint(),
                            digit.distal().prev_joint(),
                            digit.distal().next_joint(),
                        ] {
                            points.push(normalize(joint.x, joint.y));
                        }
                    }
                    points
                })
                .collect();
            publish(&latest, Ok(hands));
        }
    }
    info!("LeapMotion polling stopped");
}

/// Millimetres over the device to normalized keypoint coordinates.
fn normalize(x_mm: f32, y_mm: f32) -> Keypoint {
    Keypoint::new((x_mm + SPAN_X_MM / 2.0) / SPAN_X_MM, (CEILING_MM - y_mm) / SPAN_Y_MM)
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn device_space_maps_to_unit_square() {
        let centre = normalize(0.0, 300.0);
        assert!((centre.x - 0.5).abs() < 1e-6 && (centre.y - 0.5).abs() < 1e-6);
        let corner = normalize(-200.0, 500.0);
        assert!(corner.x.abs() < 1e-6 && corner.y.abs() < 1e-6);
    }
}
