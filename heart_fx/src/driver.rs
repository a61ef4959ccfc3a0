//! The per-tick frame driver.
//!
//! Each display refresh the driver
//!
//! 1. asks the inference worker for fresh landmarks if the throttle interval
//!    has elapsed, and picks up any reply that has arrived (otherwise the
//!    previous detection is reused);
//! 2. classifies the current detection under the active mode;
//! 3. advances and draws the active animator, over an optional skeleton;
//! 4. passes a completion upward, at most once until the reward is
//!    dismissed.
//!
//! The driver owns all animator state.  Mode switches, reward dismissal,
//! and stopping go through `&mut self`, so they always land between ticks.

use log::{debug, info, trace, warn};
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use heart_gesture::{Classifier, ClassifierConfig, DetectionResult, GestureMode};

use crate::flower::FlowerGarden;
use crate::heart::HeartPulse;
use crate::inference::InferenceWorker;
use crate::profile::DeviceProfile;
use crate::skeleton::draw_skeleton;
use crate::surface::Surface;

// ════════════════════════════════════════════════════════════════════════════
// DriverConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverConfig {
    pub mode:              GestureMode,
    pub profile:           DeviceProfile,
    /// Replaces the profile's inference interval when set.
    pub interval_override: Option<f64>,
    pub show_skeleton:     bool,
    /// Seed for the flower garden's generator.
    pub seed:              u64,
    pub classifier:        ClassifierConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            mode:              GestureMode::Heart,
            profile:           DeviceProfile::Standard,
            interval_override: None,
            show_skeleton:     true,
            seed:              0,
            classifier:        ClassifierConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Minimum milliseconds between inference requests.  A non-finite
    /// override falls back to the profile; a negative one means "every tick".
    pub fn interval_ms(&self) -> f64 {
        self.interval_override
            .filter(|ms| ms.is_finite())
            .map_or_else(|| self.profile.interval_ms(), |ms| ms.max(0.0))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CompletionSink
// ════════════════════════════════════════════════════════════════════════════

/// Told when an effect completes and the reward should be shown.
pub trait CompletionSink {
    fn complete(&mut self);
}

impl<F: FnMut()> CompletionSink for F {
    fn complete(&mut self) {
        self()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameDriver
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The driver has been stopped; nothing ran.
    Stopped,
    Rendered { detected: bool, completed: bool },
}

pub struct FrameDriver<R: Rng = ChaCha8Rng> {
    mode:          GestureMode,
    interval_ms:   f64,
    show_skeleton: bool,
    classifier:    Classifier,

    // ── inference ────────────────────────────────────────────────────────
    worker:        InferenceWorker,
    last_request:  Option<f64>,
    latest:        DetectionResult,

    // ── animators ────────────────────────────────────────────────────────
    heart:         HeartPulse,
    garden:        FlowerGarden<R>,

    // ── status ───────────────────────────────────────────────────────────
    detected:      bool,
    reward_open:   bool,
    stopped:       bool,
    sink:          Option<Box<dyn CompletionSink>>,
}

impl FrameDriver<ChaCha8Rng> {
    pub fn new(config: DriverConfig, worker: InferenceWorker) -> Self {
        FrameDriver::with_rng(config, worker, ChaCha8Rng::seed_from_u64(config.seed))
    }
}

impl<R: Rng> FrameDriver<R> {
    pub fn with_rng(config: DriverConfig, worker: InferenceWorker, rng: R) -> Self {
        info!(
            "frame driver: mode={} profile={} interval={}ms",
            config.mode, config.profile, config.interval_ms()
        );
        FrameDriver {
            mode:          config.mode,
            interval_ms:   config.interval_ms(),
            show_skeleton: config.show_skeleton,
            classifier:    Classifier::new(config.classifier),
            worker,
            last_request:  None,
            latest:        DetectionResult::default(),
            heart:         HeartPulse::new(),
            garden:        FlowerGarden::new(rng),
            detected:      false,
            reward_open:   false,
            stopped:       false,
            sink:          None,
        }
    }

    /// Deliver completions to `sink` as well as through [`TickOutcome`].
    pub fn with_sink<S: CompletionSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    // ── the tick ─────────────────────────────────────────────────────────

    /// Run one display refresh at `now_ms` (monotonic milliseconds) and
    /// draw the frame onto `surface`.
    pub fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) -> TickOutcome {
        if self.stopped {
            return TickOutcome::Stopped;
        }

        self.pump_inference(now_ms);

        let canvas = surface.size();
        let gesture = self.classifier.classify(&self.latest, self.mode, canvas);
        self.detected = gesture.is_detected();

        let fired = match self.mode {
            GestureMode::Heart | GestureMode::Mini => self.heart.update(gesture.anchor(), canvas),
            GestureMode::Flower => {
                self.garden.update(gesture.bouquet());
                false
            }
        };

        surface.clear();
        if self.show_skeleton {
            draw_skeleton(surface, &self.latest);
        }
        match self.mode {
            GestureMode::Heart | GestureMode::Mini => self.heart.draw(surface),
            GestureMode::Flower => self.garden.draw(surface),
        }

        let completed = fired && !self.reward_open;
        if completed {
            info!("{} effect complete at t={:.0}ms", self.mode, now_ms);
            self.reward_open = true;
            if let Some(sink) = self.sink.as_mut() {
                sink.complete();
            }
        }
        TickOutcome::Rendered { detected: self.detected, completed }
    }

    fn pump_inference(&mut self, now_ms: f64) {
        let due = self.last_request.map_or(true, |t| now_ms - t >= self.interval_ms);
        if due && self.worker.request(now_ms) {
            trace!("inference requested at t={:.0}ms", now_ms);
            self.last_request = Some(now_ms);
        }
        while let Some(reply) = self.worker.poll() {
            match reply {
                Ok(result) => self.latest = result,
                Err(e)     => warn!("{}; keeping previous detection", e),
            }
        }
    }

    // ── external controls ────────────────────────────────────────────────

    /// Switch effects.  All animator state is cleared, even when the mode
    /// does not change.
    pub fn set_mode(&mut self, mode: GestureMode) {
        info!("mode → {}", mode);
        self.mode = mode;
        self.reset_animators();
    }

    /// The reward was closed: re-arm for the next episode.
    pub fn dismiss_reward(&mut self) {
        debug!("reward dismissed");
        self.reward_open = false;
        self.reset_animators();
    }

    /// Stop for good.  Later ticks do nothing and any inference still in
    /// flight is discarded.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        info!("frame driver stopped");
        self.stopped = true;
        self.worker.shutdown();
    }

    /// Ignored unless finite.
    pub fn set_interval_ms(&mut self, interval_ms: f64) {
        if interval_ms.is_finite() {
            self.interval_ms = interval_ms.max(0.0);
        }
    }

    pub fn set_show_skeleton(&mut self, on: bool) {
        self.show_skeleton = on;
    }

    fn reset_animators(&mut self) {
        self.heart.reset();
        self.garden.reset();
        self.detected = false;
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn mode(&self)           -> GestureMode       { self.mode }
    pub fn interval_ms(&self)    -> f64               { self.interval_ms }
    pub fn is_detected(&self)    -> bool              { self.detected }
    pub fn is_reward_open(&self) -> bool              { self.reward_open }
    pub fn is_stopped(&self)     -> bool              { self.stopped }
    pub fn show_skeleton(&self)  -> bool              { self.show_skeleton }
    pub fn latest(&self)         -> &DetectionResult  { &self.latest }
    pub fn heart(&self)          -> &HeartPulse       { &self.heart }
    pub fn garden(&self)         -> &FlowerGarden<R>  { &self.garden }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use heart_gesture::{pose, CanvasSize, Hand, Point};

    use crate::heart::PulsePhase;
    use crate::inference::{DetectError, LandmarkProvider};
    use crate::palette::{HEART_PINK, SKELETON_PINK};
    use crate::surface::RecordingSurface;

    const CANVAS: CanvasSize = CanvasSize::new(640.0, 480.0);
    /// Detected ticks until the ripple fills a 640×480 canvas.
    const TICKS_TO_COMPLETE: usize = 30;

    fn heart_hands() -> Vec<Hand> {
        pose::heart_pair(Point::new(0.5, 0.5), 0.15).to_vec()
    }

    fn fist_hands() -> Vec<Hand> {
        vec![pose::fist(Point::new(0.5, 0.8), 0.2)]
    }

    /// Serves whatever hands are currently in the shared slot and counts
    /// calls.
    #[derive(Clone)]
    struct Scripted {
        hands: Arc<Mutex<Result<Vec<Hand>, DetectError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(hands: Vec<Hand>) -> Self {
            Scripted { hands: Arc::new(Mutex::new(Ok(hands))), calls: Arc::new(AtomicUsize::new(0)) }
        }

        fn set(&self, hands: Result<Vec<Hand>, DetectError>) {
            *self.hands.lock().unwrap() = hands;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LandmarkProvider for Scripted {
        fn detect(&mut self, ts: f64) -> Result<DetectionResult, DetectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.hands.lock().unwrap().clone().map(|h| DetectionResult::new(ts, h))
        }
    }

    fn driver(mode: GestureMode, provider: &Scripted) -> FrameDriver {
        let cfg = DriverConfig { mode, ..DriverConfig::default() };
        FrameDriver::new(cfg, InferenceWorker::inline(provider.clone()))
    }

    /// Tick every 16 ms starting at `*t`.
    fn run(d: &mut FrameDriver, s: &mut RecordingSurface, t: &mut f64, n: usize) -> Vec<TickOutcome> {
        (0..n).map(|_| { *t += 16.0; d.tick(*t, s) }).collect()
    }

    fn completions(outcomes: &[TickOutcome]) -> usize {
        outcomes.iter().filter(|o| matches!(o, TickOutcome::Rendered { completed: true, .. })).count()
    }

    #[test]
    fn inference_is_throttled() {
        let p = Scripted::new(vec![]);
        let mut d = driver(GestureMode::Heart, &p);
        let mut s = RecordingSurface::new(CANVAS);
        for t in [0.0, 10.0, 20.0, 39.0] {
            d.tick(t, &mut s);
        }
        assert_eq!(p.calls(), 1);
        d.tick(40.0, &mut s);
        assert_eq!(p.calls(), 2);
        d.tick(50.0, &mut s);
        assert_eq!(p.calls(), 2);
        d.tick(80.0, &mut s);
        assert_eq!(p.calls(), 3);
    }

    #[test]
    fn interval_follows_profile_or_override() {
        let cfg = DriverConfig { profile: DeviceProfile::HighPerformance, ..DriverConfig::default() };
        assert_eq!(cfg.interval_ms(), 25.0);
        let cfg = DriverConfig { interval_override: Some(100.0), ..cfg };
        assert_eq!(cfg.interval_ms(), 100.0);
    }

    #[test]
    fn bad_interval_override_is_sanitized() {
        let cfg = DriverConfig { interval_override: Some(f64::NAN), ..DriverConfig::default() };
        assert_eq!(cfg.interval_ms(), DeviceProfile::Standard.interval_ms());
        let cfg = DriverConfig { interval_override: Some(-5.0), ..cfg };
        assert_eq!(cfg.interval_ms(), 0.0);

        // A NaN override must not freeze inference after the first request.
        let p = Scripted::new(vec![]);
        let cfg = DriverConfig { interval_override: Some(f64::NAN), ..DriverConfig::default() };
        let mut d = FrameDriver::new(cfg, InferenceWorker::inline(p.clone()));
        let mut s = RecordingSurface::new(CANVAS);
        d.tick(0.0, &mut s);
        d.tick(100.0, &mut s);
        assert_eq!(p.calls(), 2);

        d.set_interval_ms(f64::INFINITY);
        assert_eq!(d.interval_ms(), DeviceProfile::Standard.interval_ms());
    }

    #[test]
    fn throttled_ticks_reuse_last_detection() {
        let p = Scripted::new(heart_hands());
        let mut d = driver(GestureMode::Heart, &p);
        let mut s = RecordingSurface::new(CANVAS);
        d.tick(0.0, &mut s);
        assert!(d.is_detected());
        p.set(Ok(vec![]));
        d.tick(16.0, &mut s);
        assert!(d.is_detected());
        d.tick(48.0, &mut s);
        assert!(!d.is_detected());
    }

    #[test]
    fn provider_failure_keeps_stale_result() {
        let p = Scripted::new(heart_hands());
        let mut d = driver(GestureMode::Heart, &p);
        let mut s = RecordingSurface::new(CANVAS);
        d.tick(0.0, &mut s);
        p.set(Err(DetectError::Failed("camera glitch".into())));
        for t in [40.0, 80.0, 120.0] {
            d.tick(t, &mut s);
            assert!(d.is_detected());
        }
        assert_eq!(d.latest().len(), 2);
    }

    #[test]
    fn heart_episode_completes_once() {
        let p = Scripted::new(heart_hands());
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let mut d = driver(GestureMode::Heart, &p).with_sink(move || counter.set(counter.get() + 1));
        let mut s = RecordingSurface::new(CANVAS);
        let mut t = 0.0;

        let out = run(&mut d, &mut s, &mut t, TICKS_TO_COMPLETE - 1);
        assert_eq!(completions(&out), 0);
        let out = run(&mut d, &mut s, &mut t, 1);
        assert_eq!(out, vec![TickOutcome::Rendered { detected: true, completed: true }]);

        let out = run(&mut d, &mut s, &mut t, 50);
        assert_eq!(completions(&out), 0);
        assert_eq!(fired.get(), 1);
        assert!(d.is_reward_open());
    }

    #[test]
    fn open_reward_suppresses_new_episodes_until_dismissed() {
        let p = Scripted::new(heart_hands());
        let mut d = driver(GestureMode::Heart, &p);
        let mut s = RecordingSurface::new(CANVAS);
        let mut t = 0.0;
        assert_eq!(completions(&run(&mut d, &mut s, &mut t, TICKS_TO_COMPLETE)), 1);

        // release and re-form the heart while the reward is still up
        p.set(Ok(vec![]));
        run(&mut d, &mut s, &mut t, 5);
        p.set(Ok(heart_hands()));
        assert_eq!(completions(&run(&mut d, &mut s, &mut t, TICKS_TO_COMPLETE * 2)), 0);

        d.dismiss_reward();
        assert_eq!(d.heart().phase(), PulsePhase::Idle);
        assert_eq!(completions(&run(&mut d, &mut s, &mut t, TICKS_TO_COMPLETE * 2)), 1);
    }

    #[test]
    fn mini_mode_uses_pinch() {
        let p = Scripted::new(vec![pose::pinch(Point::new(0.4, 0.8), 0.2)]);
        let mut d = driver(GestureMode::Mini, &p);
        let mut s = RecordingSurface::new(CANVAS);
        let mut t = 0.0;
        let out = run(&mut d, &mut s, &mut t, TICKS_TO_COMPLETE);
        assert_eq!(completions(&out), 1);
        assert!(s.fills_of(HEART_PINK).count() >= 2);
    }

    #[test]
    fn flower_mode_grows_and_never_completes() {
        let p = Scripted::new(fist_hands());
        let mut d = driver(GestureMode::Flower, &p);
        let mut s = RecordingSurface::new(CANVAS);
        let mut t = 0.0;
        let out = run(&mut d, &mut s, &mut t, 300);
        assert_eq!(completions(&out), 0);
        assert!(d.is_detected());
        assert_eq!(d.garden().flowers().len(), 12);
        assert_eq!(d.garden().stems().len(), 8);
        assert_eq!(d.heart().phase(), PulsePhase::Idle);
    }

    #[test]
    fn mode_switch_clears_all_animators() {
        let p = Scripted::new(heart_hands());
        let mut d = driver(GestureMode::Heart, &p);
        let mut s = RecordingSurface::new(CANVAS);
        let mut t = 0.0;
        run(&mut d, &mut s, &mut t, 10);
        assert!(d.heart().ripple().is_some());

        d.set_mode(GestureMode::Flower);
        assert!(d.heart().ripple().is_none());
        assert!(!d.heart().is_triggered());
        assert_eq!(d.heart().frame_count(), 0);

        p.set(Ok(fist_hands()));
        run(&mut d, &mut s, &mut t, 30);
        assert!(!d.garden().flowers().is_empty());

        d.set_mode(GestureMode::Heart);
        assert!(d.garden().is_empty());
        assert_eq!(d.garden().frame_count(), 0);
    }

    #[test]
    fn stop_is_final() {
        let p = Scripted::new(heart_hands());
        let mut d = driver(GestureMode::Heart, &p);
        let mut s = RecordingSurface::new(CANVAS);
        d.tick(0.0, &mut s);
        let frames = d.heart().frame_count();
        let calls = p.calls();

        d.stop();
        assert!(d.is_stopped());
        for t in [40.0, 80.0, 120.0] {
            assert_eq!(d.tick(t, &mut s), TickOutcome::Stopped);
        }
        assert_eq!(d.heart().frame_count(), frames);
        assert_eq!(p.calls(), calls);
        assert_eq!(s.clears(), 1);
    }

    #[test]
    fn stop_discards_late_reply() {
        let p = Scripted::new(heart_hands());
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let mut inner = p.clone();
        let gated = move |ts: f64| {
            let _ = rx.recv();
            inner.detect(ts)
        };
        let mut d = FrameDriver::new(DriverConfig::default(), InferenceWorker::spawn(gated));
        let mut s = RecordingSurface::new(CANVAS);
        d.tick(0.0, &mut s);
        d.stop();
        let _ = tx.send(());
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(d.tick(40.0, &mut s), TickOutcome::Stopped);
        assert!(d.latest().is_empty());
        assert!(!d.is_detected());
    }

    #[test]
    fn skeleton_toggle() {
        let p = Scripted::new(heart_hands());
        let mut d = driver(GestureMode::Heart, &p);
        let mut s = RecordingSurface::new(CANVAS);
        d.tick(0.0, &mut s);
        assert_eq!(s.strokes_of(SKELETON_PINK).count(), 2);
        d.set_show_skeleton(false);
        d.tick(16.0, &mut s);
        assert_eq!(s.strokes_of(SKELETON_PINK).count(), 0);
        assert!(s.fills_of(HEART_PINK).count() >= 2);
    }
}
