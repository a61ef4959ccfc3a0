//! Keyboard/mouse hand simulator.
//!
//! The visualizer forwards key presses and the pointer position as
//! [`SimInput`]s; [`SimLandmarkProvider`] turns the current pose and pointer
//! into a synthetic [`DetectionResult`] on every inference request, so the
//! rest of the pipeline cannot tell it from a camera model.

use std::sync::mpsc::{Receiver, TryRecvError};

use log::debug;
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strum::{Display, EnumIter};

use heart_fx::{DetectError, LandmarkProvider};
use heart_gesture::{pose, DetectionResult, Hand, Point};

// ════════════════════════════════════════════════════════════════════════════
// SimInput
// ════════════════════════════════════════════════════════════════════════════

/// What the user is pretending to do with their hands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SimPose {
    /// Two hands forming a finger-heart.              H
    Heart,
    /// One hand pinching thumb and index.             P
    Pinch,
    /// One closed fist.                               F
    Fist,
    /// Two relaxed open hands.                        O
    Open,
    /// No hands in view.                              N
    #[default]
    Away,
}

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    Pose(SimPose),
    /// Pointer position, normalized to the canvas.
    Pointer(Point),
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkProvider
// ════════════════════════════════════════════════════════════════════════════

/// Normalized hand span used for every synthetic pose.
const HAND_SIZE: f32 = 0.18;

pub struct SimLandmarkProvider {
    rx:      Receiver<SimInput>,
    pose:    SimPose,
    pointer: Point,
    /// Per-frame tremor amplitude, normalized units.
    jitter:  f32,
    rng:     ChaCha8Rng,
}

impl SimLandmarkProvider {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarkProvider {
            rx,
            pose:    SimPose::default(),
            pointer: Point::new(0.5, 0.5),
            jitter:  0.0,
            rng:     ChaCha8Rng::seed_from_u64(0),
        }
    }

    /// Shake the hands by up to `amount` each frame, reproducibly.
    pub fn with_jitter(mut self, amount: f32, seed: u64) -> Self {
        self.jitter = amount.max(0.0);
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn pose(&self) -> SimPose {
        self.pose
    }

    fn drain_inputs(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(SimInput::Pose(p)) => {
                    if p != self.pose {
                        debug!("sim pose → {}", p);
                    }
                    self.pose = p;
                }
                Ok(SimInput::Pointer(p)) => self.pointer = p,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }

    fn center(&mut self) -> Point {
        if self.jitter == 0.0 {
            return self.pointer;
        }
        let j = self.jitter;
        self.pointer.offset(self.rng.random_range(-j..=j), self.rng.random_range(-j..=j))
    }

    /// Hands for the current pose, arranged around the pointer.
    pub fn hands(&mut self) -> Vec<Hand> {
        let c = self.center();
        let s = HAND_SIZE;
        match self.pose {
            SimPose::Heart => pose::heart_pair(c, s * 0.75).to_vec(),
            SimPose::Pinch => vec![pose::pinch(c.offset(0.1 * s, 1.1 * s), s)],
            SimPose::Fist  => vec![pose::fist(c.offset(0.0, 0.6 * s), s)],
            SimPose::Open  => pose::open_pair(c.offset(0.0, 0.7 * s), s, 2.5 * s).to_vec(),
            SimPose::Away  => Vec::new(),
        }
    }
}

impl LandmarkProvider for SimLandmarkProvider {
    fn detect(&mut self, timestamp_ms: f64) -> Result<DetectionResult, DetectError> {
        self.drain_inputs();
        Ok(DetectionResult::new(timestamp_ms, self.hands()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
