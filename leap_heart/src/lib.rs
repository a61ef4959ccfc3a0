//! # leap_heart
//!
//! Finger-heart and fist gestures drive a software-rendered overlay: a
//! beating heart whose ripple fills the window, or a bouquet that grows out
//! of a raised fist.  A finished heart opens a reward card.
//!
//! ## Gesture → Effect mapping
//!
//! | Mode | Gesture | Effect |
//! |---|---|---|
//! | `heart`  | Two hands, thumbs and index tips touching | Pulsing heart + ripple, then reward |
//! | `mini`   | One hand pinching thumb and index          | Pulsing heart + ripple, then reward |
//! | `flower` | One closed fist                            | Bouquet follows the forearm |
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**, keyboard and mouse synthesize hands.
//! * `leap`: **Hardware mode**, polls a real LeapMotion controller via LeapC.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | mouse | Move the hands |
//! | `H` | Finger-heart pair |
//! | `P` | Pinch (mini heart) |
//! | `F` | Fist |
//! | `O` | Two open hands |
//! | `N` | No hands |
//! | `1` / `2` / `3` | Mode heart / mini / flower |
//! | `K` | Toggle skeleton overlay |
//! | `Enter` / `Escape` | Close the reward card |
//! | `Q` | Quit |

pub mod sim;
pub mod raster;
pub mod reward;
pub mod visualizer;
pub mod app;

#[cfg(feature = "leap")]
pub mod leap;
