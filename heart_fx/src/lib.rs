//! # heart_fx
//!
//! Gesture-driven overlay effects and the frame loop that runs them.
//!
//! ```text
//!  LandmarkProvider ──► InferenceWorker ──► FrameDriver::tick ──► Surface
//!   (camera / sim /      (throttled,         classify → animate
//!    LeapMotion)          never blocks)        → draw → complete
//! ```
//!
//! | Mode | Animator | Completes? |
//! |---|---|---|
//! | `heart`, `mini` | [`HeartPulse`]: beating heart + expanding ripple | once per episode |
//! | `flower`        | [`FlowerGarden`]: bouquet out of a fist          | never |
//!
//! Rendering goes through the [`Surface`] trait; the app supplies a pixel
//! rasterizer and the tests use [`RecordingSurface`].

pub mod palette;
pub mod surface;
pub mod heart;
pub mod flower;
pub mod skeleton;
pub mod inference;
pub mod profile;
pub mod driver;

pub use surface::{LineCap, RecordingSurface, Shadow, Stroke, Surface};
pub use heart::{HeartPulse, HeartRipple, PulsePhase};
pub use flower::{Flower, FlowerGarden, GroundStem};
pub use inference::{DetectError, InferenceWorker, LandmarkProvider};
pub use profile::DeviceProfile;
pub use driver::{CompletionSink, DriverConfig, FrameDriver, TickOutcome};
