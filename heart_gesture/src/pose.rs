//! Synthetic hand poses.
//!
//! Builds plausible 21-point hands from a canonical template so that the
//! simulator and the tests can produce finger-hearts, pinches, fists, and
//! open hands without a camera.  The template is in hand units with the
//! wrist at the origin and fingers pointing up (negative y); a
//! [`HandBuilder`] mirrors, rotates, scales, and places it in normalized
//! video space.

use crate::geometry::Point;
use crate::landmark::{Hand, Keypoint, KEYPOINT_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// Template
// ════════════════════════════════════════════════════════════════════════════

/// Open right-hand template (image space, palm toward camera).
const OPEN: [(f32, f32); KEYPOINT_COUNT] = [
    ( 0.00,  0.00),                                                   // wrist
    (-0.25, -0.15), (-0.42, -0.30), (-0.55, -0.45), (-0.65, -0.58),   // thumb
    (-0.20, -0.70), (-0.22, -0.95), (-0.23, -1.12), (-0.24, -1.28),   // index
    ( 0.00, -0.75), ( 0.00, -1.02), ( 0.00, -1.20), ( 0.00, -1.36),   // middle
    ( 0.18, -0.70), ( 0.20, -0.95), ( 0.21, -1.10), ( 0.22, -1.24),   // ring
    ( 0.34, -0.60), ( 0.38, -0.80), ( 0.40, -0.92), ( 0.42, -1.03),   // pinky
];

/// Finger joint offsets from the knuckle when curled into the palm.
const CURLED: [(f32, f32); 3] = [(0.0, -0.12), (0.0, 0.02), (0.0, 0.18)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger { Thumb, Index, Middle, Ring, Pinky }

impl Finger {
    /// Base-to-tip keypoint indices.
    pub fn joints(self) -> [usize; 4] {
        match self {
            Finger::Thumb  => [1, 2, 3, 4],
            Finger::Index  => [5, 6, 7, 8],
            Finger::Middle => [9, 10, 11, 12],
            Finger::Ring   => [13, 14, 15, 16],
            Finger::Pinky  => [17, 18, 19, 20],
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandBuilder
// ════════════════════════════════════════════════════════════════════════════

/// Places the template in normalized space.
#[derive(Clone, Debug)]
pub struct HandBuilder {
    local:    [Point; KEYPOINT_COUNT],
    wrist:    Point,
    size:     f32,
    angle:    f32,
    mirrored: bool,
    snaps:    Vec<(Finger, Point)>,
}

impl HandBuilder {
    /// An open hand with its wrist at `wrist`; `size` is the wrist-to-
    /// middle-knuckle span scaled by 1/0.75, in normalized units.
    pub fn new(wrist: Point, size: f32) -> Self {
        HandBuilder {
            local:    OPEN.map(|(x, y)| Point::new(x, y)),
            wrist,
            size,
            angle:    0.0,
            mirrored: false,
            snaps:    Vec::new(),
        }
    }

    /// Flip left/right (a left hand facing the camera).
    pub fn mirrored(mut self) -> Self {
        self.mirrored = !self.mirrored;
        self
    }

    /// Rotate about the wrist, radians, clockwise on screen.
    pub fn rotated(mut self, angle: f32) -> Self {
        self.angle += angle;
        self
    }

    /// Fold `finger` into the palm.
    pub fn curl(mut self, finger: Finger) -> Self {
        let joints = finger.joints();
        if finger == Finger::Thumb {
            self.local[joints[2]] = Point::new(-0.30, -0.45);
            self.local[joints[3]] = Point::new(-0.05, -0.50);
        } else {
            let k = self.local[joints[0]];
            for (&slot, (dx, dy)) in joints[1..].iter().zip(CURLED) {
                self.local[slot] = k.offset(dx, dy);
            }
        }
        self
    }

    pub fn curl_all(self, fingers: &[Finger]) -> Self {
        fingers.iter().fold(self, |b, f| b.curl(*f))
    }

    /// Bend `finger` so its tip lands on `target` (normalized space); the
    /// middle joints are spread evenly between knuckle and tip.
    pub fn snap(mut self, finger: Finger, target: Point) -> Self {
        self.snaps.push((finger, target));
        self
    }

    pub fn build(self) -> Hand {
        let mut world = self.local.map(|p| self.place(p));
        for (finger, target) in &self.snaps {
            let [base, a, b, tip] = finger.joints();
            let k = world[base];
            world[a]   = lerp_point(k, *target, 1.0 / 3.0);
            world[b]   = lerp_point(k, *target, 2.0 / 3.0);
            world[tip] = *target;
        }
        Hand::sanitized(world.map(Keypoint::from))
    }

    /// World position of template keypoint `i` before snapping.
    pub fn locate(&self, i: usize) -> Point {
        self.place(self.local[i])
    }

    fn place(&self, p: Point) -> Point {
        let x = if self.mirrored { -p.x } else { p.x };
        let (s, c) = self.angle.sin_cos();
        Point::new(
            self.wrist.x + (x * c - p.y * s) * self.size,
            self.wrist.y + (x * s + p.y * c) * self.size,
        )
    }
}

fn lerp_point(a: Point, b: Point, t: f32) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

// ════════════════════════════════════════════════════════════════════════════
// Named poses
// ════════════════════════════════════════════════════════════════════════════

const FOLDED: [Finger; 3] = [Finger::Middle, Finger::Ring, Finger::Pinky];

pub fn open_hand(wrist: Point, size: f32) -> Hand {
    HandBuilder::new(wrist, size).build()
}

pub fn fist(wrist: Point, size: f32) -> Hand {
    HandBuilder::new(wrist, size)
        .curl_all(&[Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky])
        .build()
}

/// Thumb and index tips touching, the rest folded: the "mini heart".
pub fn pinch(wrist: Point, size: f32) -> Hand {
    let b = HandBuilder::new(wrist, size).curl_all(&FOLDED);
    let touch = lerp_point(b.locate(4), b.locate(8), 0.5);
    b.snap(Finger::Thumb, touch).snap(Finger::Index, touch).build()
}

/// Two hands forming a finger-heart around `center`: thumb tips meet
/// below it, index tips meet above it, each pair 0.02 apart.
pub fn heart_pair(center: Point, size: f32) -> [Hand; 2] {
    let thumb_y = center.y + 0.5 * size;
    let index_y = center.y - 0.1 * size;
    let wrist_dx = 0.7 * size;
    let wrist_y  = center.y + 1.1 * size;

    let left = HandBuilder::new(Point::new(center.x - wrist_dx, wrist_y), size)
        .mirrored()
        .rotated(0.5)
        .curl_all(&FOLDED)
        .snap(Finger::Thumb, Point::new(center.x - 0.01, thumb_y))
        .snap(Finger::Index, Point::new(center.x - 0.01, index_y))
        .build();
    let right = HandBuilder::new(Point::new(center.x + wrist_dx, wrist_y), size)
        .rotated(-0.5)
        .curl_all(&FOLDED)
        .snap(Finger::Thumb, Point::new(center.x + 0.01, thumb_y))
        .snap(Finger::Index, Point::new(center.x + 0.01, index_y))
        .build();
    [left, right]
}

/// Two relaxed hands side by side, `spread` apart.
pub fn open_pair(center: Point, size: f32, spread: f32) -> [Hand; 2] {
    [
        HandBuilder::new(Point::new(center.x - spread / 2.0, center.y), size).mirrored().build(),
        HandBuilder::new(Point::new(center.x + spread / 2.0, center.y), size).build(),
    ]
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
