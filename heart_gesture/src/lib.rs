//! # heart_gesture
//!
//! Per-frame hand gesture recognition over 21-point hand landmarks.
//!
//! The landmark model itself lives elsewhere: this crate takes its output
//! (0–2 hands, each 21 normalized keypoints, origin top-left, y growing
//! downward) and answers one question per frame: *does the active gesture
//! hold, and where should the effect be anchored?*
//!
//! ## Gesture modes
//!
//! | Mode | Hands | Trigger | Anchor |
//! |---|---|---|---|
//! | `heart`  | exactly 2 | thumb tips < 0.08 apart **and** index tips < 0.08 apart | centroid of the four tips |
//! | `mini`   | any, first match | thumb tip ↔ index tip < 0.05 **and** middle finger folded | thumb/index midpoint |
//! | `flower` | any, first match | ≥ 3 of 4 fingertips closer to the wrist than 1.2 × their knuckle | knuckle midpoint → wrist axis |
//!
//! Distances are measured in normalized space; anchors are reported in
//! canvas pixels.
//!
//! ## Quick start
//!
//! ```rust
//! use heart_gesture::{Classifier, DetectionResult, GestureMode, CanvasSize, Point, pose};
//!
//! let [left, right] = pose::heart_pair(Point::new(0.5, 0.5), 0.2);
//! let frame = DetectionResult::new(0.0, vec![left, right]);
//!
//! let gesture = Classifier::default()
//!     .classify(&frame, GestureMode::Heart, CanvasSize::new(640.0, 480.0));
//! assert!(gesture.is_detected());
//! ```

pub mod geometry;
pub mod landmark;
pub mod pose;
pub mod classifier;

pub use geometry::{CanvasSize, Path, PathCmd, Point};
pub use landmark::{DetectionResult, Hand, Keypoint, KEYPOINT_COUNT, MAX_HANDS};
pub use classifier::{BouquetPose, Classifier, ClassifierConfig, Gesture, GestureMode};
