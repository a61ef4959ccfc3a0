//! Pulsing heart with an expanding ripple.
//!
//! While the gesture holds, a heart beats at the anchor and a second heart
//! (the ripple) grows from it by a fixed step each frame until it covers the
//! canvas well past its corners.  The ripple reaching full size is the
//! completion signal; it fires once per gesture episode.
//!
//! | State | Meaning |
//! |---|---|
//! | `Idle`      | gesture not held (everything reset) |
//! | `Pulsing`   | heart beating, ripple expanding |
//! | `Triggered` | ripple full size, completion already signalled |

use heart_gesture::geometry::centered_heart;
use heart_gesture::{CanvasSize, Point};

use crate::palette::{HEART_GLOW, HEART_PINK, RIPPLE_GLOW};
use crate::surface::{Shadow, Surface};

pub const PULSE_BASE:      f32 = 60.0;
pub const PULSE_AMPLITUDE: f32 = 8.0;
/// Radians of beat phase per frame.
pub const PULSE_RATE:      f32 = 0.15;

pub const RIPPLE_START:    f32 = 20.0;
pub const RIPPLE_GROWTH:   f32 = 40.0;
/// Ripple end size as a multiple of the canvas diagonal.
pub const RIPPLE_REACH:    f32 = 1.5;

const GLOW_BLUR: f32 = 30.0;

/// Heart size on beat frame `frame`.
pub fn beat_size(frame: u32) -> f32 {
    PULSE_BASE + (frame as f32 * PULSE_RATE).sin() * PULSE_AMPLITUDE
}

// ════════════════════════════════════════════════════════════════════════════
// HeartRipple
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct HeartRipple {
    pub center:   Point,
    pub size:     f32,
    pub growth:   f32,
    pub max_size: f32,
    done:         bool,
}

impl HeartRipple {
    pub fn new(center: Point, max_size: f32) -> Self {
        HeartRipple { center, size: RIPPLE_START, growth: RIPPLE_GROWTH, max_size, done: false }
    }

    /// Grow one step.  Size never exceeds `max_size` and never shrinks.
    pub fn grow(&mut self) {
        if self.done {
            return;
        }
        self.size += self.growth;
        if self.size >= self.max_size {
            self.size = self.max_size;
            self.done = true;
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.save();
        surface.set_shadow(Some(Shadow { color: RIPPLE_GLOW, blur: GLOW_BLUR }));
        surface.fill(&centered_heart(self.center, self.size), HEART_PINK);
        surface.restore();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HeartPulse
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulsePhase {
    Idle,
    Pulsing,
    Triggered,
}

/// Heart animator for the two heart modes.
#[derive(Clone, Debug, Default)]
pub struct HeartPulse {
    anchor:      Option<Point>,
    ripple:      Option<HeartRipple>,
    frame_count: u32,
    triggered:   bool,
}

impl HeartPulse {
    pub fn new() -> Self {
        HeartPulse::default()
    }

    pub fn reset(&mut self) {
        *self = HeartPulse::default();
    }

    /// Advance one frame.  `anchor` is the gesture anchor in pixels, `None`
    /// when the gesture does not hold (which resets the animator).
    ///
    /// Returns `true` on exactly the frame the ripple reaches full size.
    pub fn update(&mut self, anchor: Option<Point>, canvas: CanvasSize) -> bool {
        let Some(anchor) = anchor else {
            self.reset();
            return false;
        };

        self.anchor = Some(anchor);
        // Never back to zero while a hand is held: zero means idle.
        self.frame_count = self.frame_count.wrapping_add(1).max(1);

        if self.ripple.is_none() && !self.triggered {
            self.ripple = Some(HeartRipple::new(anchor, canvas.diagonal() * RIPPLE_REACH));
        }

        match self.ripple.as_mut() {
            Some(r) => {
                r.grow();
                if r.is_done() && !self.triggered {
                    self.triggered = true;
                    return true;
                }
                false
            }
            None => false,
        }
    }

    /// Heart first, ripple on top.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let Some(anchor) = self.anchor else { return };

        surface.save();
        surface.set_shadow(Some(Shadow { color: HEART_GLOW, blur: GLOW_BLUR }));
        surface.fill(&centered_heart(anchor, self.beat_size()), HEART_PINK);
        surface.restore();

        if let Some(r) = &self.ripple {
            r.draw(surface);
        }
    }

    pub fn phase(&self) -> PulsePhase {
        if self.triggered {
            PulsePhase::Triggered
        } else if self.frame_count > 0 {
            PulsePhase::Pulsing
        } else {
            PulsePhase::Idle
        }
    }

    pub fn beat_size(&self) -> f32 {
        beat_size(self.frame_count)
    }

    pub fn anchor(&self)      -> Option<Point>        { self.anchor }
    pub fn ripple(&self)      -> Option<&HeartRipple> { self.ripple.as_ref() }
    pub fn frame_count(&self) -> u32                  { self.frame_count }
    pub fn is_triggered(&self) -> bool                { self.triggered }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
