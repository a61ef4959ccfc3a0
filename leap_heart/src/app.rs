//! Top-level application state machine.
//!
//! `AppState` owns the [`FrameDriver`], the reward picker, and the reward
//! card currently on screen.  It turns window [`Command`]s into driver
//! controls and opens a card whenever the driver reports a completion.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use log::info;

use heart_fx::{DriverConfig, FrameDriver, InferenceWorker, Surface, TickOutcome};
use heart_gesture::GestureMode;

use crate::reward::{RewardCard, RewardPicker};
use crate::sim::{SimInput, SimLandmarkProvider};
use crate::visualizer::{Command, StatusLine, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppConfig {
    pub driver:      DriverConfig,
    pub width:       usize,
    pub height:      usize,
    pub reward_seed: u64,
    /// Simulated hand tremor, normalized units.
    pub jitter:      f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            driver:      DriverConfig::default(),
            width:       640,
            height:      480,
            reward_seed: 0,
            jitter:      0.002,
        }
    }
}

/// What the user should do with their hands in each mode.
pub fn mode_hint(mode: GestureMode) -> &'static str {
    match mode {
        GestureMode::Heart  => "make a finger heart with both hands",
        GestureMode::Mini   => "pinch thumb and index together",
        GestureMode::Flower => "make a fist and raise it",
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    driver:      FrameDriver,
    picker:      RewardPicker,
    reward:      Option<RewardCard>,
    completions: Receiver<()>,

    // ── status message ────────────────────────────────────────────────────
    pub status:  String,
}

impl AppState {
    pub fn new(cfg: &AppConfig, worker: InferenceWorker) -> Self {
        let (done_tx, completions) = mpsc::channel();
        let driver = FrameDriver::new(cfg.driver, worker).with_sink(move || {
            let _ = done_tx.send(());
        });
        AppState {
            driver,
            picker: RewardPicker::seeded(cfg.reward_seed),
            reward: None,
            completions,
            status: format!("Ready: {}", mode_hint(cfg.driver.mode)),
        }
    }

    // ── commands ─────────────────────────────────────────────────────────

    /// Apply one window command.  Returns `false` when the app should quit.
    pub fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::SetMode(mode) => {
                self.driver.set_mode(mode);
                self.status = format!("Mode {}: {}", mode, mode_hint(mode));
            }
            Command::DismissReward => {
                if self.reward.take().is_some() {
                    self.driver.dismiss_reward();
                    self.status = format!("Again? {}", mode_hint(self.driver.mode()));
                }
            }
            Command::ToggleSkeleton => {
                let on = !self.driver.show_skeleton();
                self.driver.set_show_skeleton(on);
                self.status = format!("Skeleton {}", if on { "on" } else { "off" });
            }
            Command::Quit => {
                info!("quit requested");
                self.driver.stop();
                return false;
            }
        }
        true
    }

    // ── per-frame ────────────────────────────────────────────────────────

    /// Run the driver for one frame and open a reward card on completion.
    pub fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) -> TickOutcome {
        let outcome = self.driver.tick(now_ms, surface);

        loop {
            match self.completions.try_recv() {
                Ok(()) => {
                    if self.reward.is_none() {
                        let card = self.picker.pick(now_ms);
                        info!("reward card opened: {}", card.image_url);
                        self.reward = Some(card);
                        self.status = "You did it! Press Enter to close".to_string();
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        outcome
    }

    /// Release the inference worker.
    pub fn shutdown(&mut self) {
        self.driver.stop();
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn driver(&self) -> &FrameDriver        { &self.driver }
    pub fn reward(&self) -> Option<&RewardCard> { self.reward.as_ref() }
    pub fn mode(&self)   -> GestureMode         { self.driver.mode() }
}

// ════════════════════════════════════════════════════════════════════════════
// run
// ════════════════════════════════════════════════════════════════════════════

/// Open the window and run until it closes or the user quits.
pub fn run(cfg: AppConfig) -> Result<(), String> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    // ── Landmark provider ────────────────────────────────────────────────
    #[cfg(feature = "leap")]
    let worker = {
        drop(sim_rx);
        InferenceWorker::spawn(crate::leap::LeapLandmarkProvider::spawn())
    };
    #[cfg(not(feature = "leap"))]
    let worker = InferenceWorker::spawn(
        SimLandmarkProvider::new(sim_rx).with_jitter(cfg.jitter, cfg.driver.seed),
    );

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx, cfg.width, cfg.height)?;

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(&cfg, worker);
    let start = Instant::now();

    // ── Main loop ─────────────────────────────────────────────────────────
    'frames: while vis.is_open() {
        for cmd in vis.poll_input() {
            if !app.handle_command(cmd) {
                break 'frames;
            }
        }

        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        app.tick(now_ms, vis.surface());

        let status = StatusLine {
            mode:     app.mode(),
            detected: app.driver().is_detected(),
            text:     &app.status,
        };
        vis.present(&status, app.reward(), now_ms);
    }

    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::Sender;
    use heart_fx::RecordingSurface;
    use heart_gesture::{CanvasSize, Point};
    use crate::sim::SimPose;

    fn make_app(mode: GestureMode) -> (AppState, Sender<SimInput>) {
        let (tx, rx) = mpsc::channel();
        let cfg = AppConfig {
            driver: DriverConfig { mode, ..DriverConfig::default() },
            ..AppConfig::default()
        };
        let worker = InferenceWorker::inline(SimLandmarkProvider::new(rx));
        (AppState::new(&cfg, worker), tx)
    }

    /// Tick at 60 Hz for `frames` frames starting at `t0`; returns the end time.
    fn run_frames(app: &mut AppState, surface: &mut RecordingSurface, t0: f64, frames: usize) -> f64 {
        let mut t = t0;
        for _ in 0..frames {
            app.tick(t, surface);
            t += 1000.0 / 60.0;
        }
        t
    }

    #[test]
    fn heart_gesture_opens_a_reward_card() {
        let (mut app, tx) = make_app(GestureMode::Heart);
        let mut surface = RecordingSurface::new(CanvasSize::default());
        tx.send(SimInput::Pose(SimPose::Heart)).unwrap();

        run_frames(&mut app, &mut surface, 0.0, 40);
        let card = app.reward().expect("card should be open");
        assert!(crate::reward::REWARD_IMAGES.contains(&card.image_url));
        assert!(app.driver().is_reward_open());
    }

    #[test]
    fn no_second_card_until_dismissed() {
        let (mut app, tx) = make_app(GestureMode::Mini);
        let mut surface = RecordingSurface::new(CanvasSize::default());
        tx.send(SimInput::Pose(SimPose::Pinch)).unwrap();

        let t = run_frames(&mut app, &mut surface, 0.0, 40);
        let first = app.reward().cloned().unwrap();

        // Hand stays up: same card.
        let t = run_frames(&mut app, &mut surface, t, 60);
        assert_eq!(app.reward(), Some(&first));

        assert!(app.handle_command(Command::DismissReward));
        assert!(app.reward().is_none());
        assert!(!app.driver().is_reward_open());

        // Re-armed: a fresh episode opens a new card.
        run_frames(&mut app, &mut surface, t, 40);
        let second = app.reward().unwrap();
        assert!(second.opened_at > first.opened_at);
    }

    #[test]
    fn dismiss_without_card_is_a_no_op() {
        let (mut app, _tx) = make_app(GestureMode::Heart);
        let before = app.status.clone();
        assert!(app.handle_command(Command::DismissReward));
        assert_eq!(app.status, before);
    }

    #[test]
    fn fist_never_opens_a_card() {
        let (mut app, tx) = make_app(GestureMode::Flower);
        let mut surface = RecordingSurface::new(CanvasSize::default());
        tx.send(SimInput::Pose(SimPose::Fist)).unwrap();
        run_frames(&mut app, &mut surface, 0.0, 200);
        assert!(app.reward().is_none());
        assert!(app.driver().is_detected());
        assert!(!app.driver().garden().flowers().is_empty());
    }

    #[test]
    fn mode_switch_and_skeleton_toggle() {
        let (mut app, tx) = make_app(GestureMode::Heart);
        let mut surface = RecordingSurface::new(CanvasSize::default());
        tx.send(SimInput::Pose(SimPose::Fist)).unwrap();
        tx.send(SimInput::Pointer(Point::new(0.5, 0.4))).unwrap();

        let t = run_frames(&mut app, &mut surface, 0.0, 5);
        assert!(!app.driver().is_detected());

        app.handle_command(Command::SetMode(GestureMode::Flower));
        assert_eq!(app.mode(), GestureMode::Flower);
        run_frames(&mut app, &mut surface, t, 5);
        assert!(app.driver().is_detected());

        assert!(app.driver().show_skeleton());
        app.handle_command(Command::ToggleSkeleton);
        assert!(!app.driver().show_skeleton());
    }

    #[test]
    fn quit_stops_the_driver() {
        let (mut app, _tx) = make_app(GestureMode::Heart);
        let mut surface = RecordingSurface::new(CanvasSize::default());
        assert!(!app.handle_command(Command::Quit));
        assert_eq!(app.tick(0.0, &mut surface), TickOutcome::Stopped);
    }
}
