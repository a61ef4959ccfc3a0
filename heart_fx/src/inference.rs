//! Landmark inference off the render thread.
//!
//! A [`LandmarkProvider`] turns "now" into a [`DetectionResult`]; it may be
//! a camera model, LeapMotion hardware, or a keyboard simulator.  The
//! [`InferenceWorker`] owns one provider and runs it on request, at most one
//! request in flight, so the render tick never waits on inference.
//!
//! Two backends share the same request/poll interface:
//!
//! | Backend | Where `detect` runs | Used by |
//! |---|---|---|
//! | threaded | its own thread, results over `mpsc` | the app |
//! | inline   | synchronously inside `request` | tests |

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use log::{debug, warn};

use heart_gesture::DetectionResult;

// ════════════════════════════════════════════════════════════════════════════
// DetectError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetectError {
    /// No frame to run on yet (camera warming up, device not streaming).
    Unavailable,
    /// The model or device reported an error.
    Failed(String),
    /// The worker thread is gone.
    Disconnected,
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectError::Unavailable  => write!(f, "no frame available"),
            DetectError::Failed(msg)  => write!(f, "landmark detection failed: {}", msg),
            DetectError::Disconnected => write!(f, "inference worker disconnected"),
        }
    }
}

impl std::error::Error for DetectError {}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkProvider trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can produce hand landmarks for a timestamp.
pub trait LandmarkProvider: Send + 'static {
    fn detect(&mut self, timestamp_ms: f64) -> Result<DetectionResult, DetectError>;
}

impl<F> LandmarkProvider for F
where
    F: FnMut(f64) -> Result<DetectionResult, DetectError> + Send + 'static,
{
    fn detect(&mut self, timestamp_ms: f64) -> Result<DetectionResult, DetectError> {
        self(timestamp_ms)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InferenceWorker
// ════════════════════════════════════════════════════════════════════════════

type Reply = Result<DetectionResult, DetectError>;

enum Backend {
    Threaded {
        requests: Option<Sender<f64>>,
        replies:  Receiver<Reply>,
    },
    Inline {
        provider: Box<dyn LandmarkProvider>,
        ready:    Option<Reply>,
    },
}

/// Handle to a landmark provider.  Dropping it shuts the worker down.
pub struct InferenceWorker {
    backend:   Backend,
    in_flight: bool,
    closed:    bool,
}

impl InferenceWorker {
    /// Run `provider` on its own thread.
    pub fn spawn<P: LandmarkProvider>(mut provider: P) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<f64>();
        let (rep_tx, rep_rx) = mpsc::channel::<Reply>();
        thread::spawn(move || {
            for ts in req_rx {
                if rep_tx.send(provider.detect(ts)).is_err() {
                    break;
                }
            }
            debug!("inference thread exiting");
        });
        InferenceWorker {
            backend:   Backend::Threaded { requests: Some(req_tx), replies: rep_rx },
            in_flight: false,
            closed:    false,
        }
    }

    /// Run `provider` synchronously inside [`request`](Self::request).
    pub fn inline<P: LandmarkProvider>(provider: P) -> Self {
        InferenceWorker {
            backend:   Backend::Inline { provider: Box::new(provider), ready: None },
            in_flight: false,
            closed:    false,
        }
    }

    /// A request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Ask for landmarks at `timestamp_ms`.  Returns `false` (and does
    /// nothing) while a previous request is outstanding or after shutdown.
    pub fn request(&mut self, timestamp_ms: f64) -> bool {
        if self.in_flight || self.closed {
            return false;
        }
        match &mut self.backend {
            Backend::Threaded { requests, .. } => {
                let sent = requests.as_ref().map(|tx| tx.send(timestamp_ms).is_ok()).unwrap_or(false);
                if !sent {
                    warn!("inference thread is gone; no further requests");
                    self.closed = true;
                    return false;
                }
            }
            Backend::Inline { provider, ready } => {
                *ready = Some(provider.detect(timestamp_ms));
            }
        }
        self.in_flight = true;
        true
    }

    /// Collect the reply to the outstanding request, if it has arrived.
    /// Never blocks.
    pub fn poll(&mut self) -> Option<Reply> {
        if !self.in_flight {
            return None;
        }
        let reply = match &mut self.backend {
            Backend::Threaded { replies, .. } => match replies.try_recv() {
                Ok(r) => r,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    Err(DetectError::Disconnected)
                }
            },
            Backend::Inline { ready, .. } => ready.take()?,
        };
        self.in_flight = false;
        Some(reply)
    }

    /// Stop accepting requests.  Any reply still on its way is discarded;
    /// the worker thread exits once its current `detect` returns.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.in_flight = false;
        match &mut self.backend {
            Backend::Threaded { requests, .. } => { requests.take(); }
            Backend::Inline { ready, .. } => { ready.take(); }
        }
        debug!("inference worker shut down");
    }
}

impl Drop for InferenceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn stamp(ts: f64) -> Result<DetectionResult, DetectError> {
        Ok(DetectionResult::empty(ts))
    }

    fn wait_for(w: &mut InferenceWorker) -> Reply {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(r) = w.poll() {
                return r;
            }
            assert!(Instant::now() < deadline, "no reply from worker");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn inline_one_request_at_a_time() {
        let mut w = InferenceWorker::inline(stamp);
        assert!(w.poll().is_none());
        assert!(w.request(10.0));
        assert!(w.is_busy());
        assert!(!w.request(20.0));
        assert_eq!(w.poll(), Some(Ok(DetectionResult::empty(10.0))));
        assert!(!w.is_busy());
        assert!(w.poll().is_none());
        assert!(w.request(30.0));
    }

    #[test]
    fn inline_passes_errors_through() {
        let mut w = InferenceWorker::inline(|_ts: f64| Err(DetectError::Failed("model".into())));
        w.request(0.0);
        assert_eq!(w.poll(), Some(Err(DetectError::Failed("model".into()))));
    }

    #[test]
    fn threaded_round_trip() {
        let mut w = InferenceWorker::spawn(stamp);
        assert!(w.request(42.0));
        assert_eq!(wait_for(&mut w), Ok(DetectionResult::empty(42.0)));
        assert!(w.request(43.0));
        assert_eq!(wait_for(&mut w), Ok(DetectionResult::empty(43.0)));
    }

    #[test]
    fn threaded_panic_reports_disconnect() {
        let mut w = InferenceWorker::spawn(|_ts: f64| -> Result<DetectionResult, DetectError> {
            panic!("provider crashed")
        });
        assert!(w.request(0.0));
        assert_eq!(wait_for(&mut w), Err(DetectError::Disconnected));
        assert!(w.is_closed());
        assert!(!w.request(1.0));
    }

    #[test]
    fn shutdown_discards_pending_reply() {
        let mut w = InferenceWorker::inline(stamp);
        w.request(5.0);
        w.shutdown();
        assert!(w.poll().is_none());
        assert!(!w.request(6.0));
        w.shutdown();
    }

    #[test]
    fn error_messages() {
        assert_eq!(DetectError::Unavailable.to_string(), "no frame available");
        assert_eq!(DetectError::Failed("x".into()).to_string(), "landmark detection failed: x");
    }
}
