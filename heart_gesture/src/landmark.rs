//! Hand landmarks as delivered by the external landmark model.
//!
//! A [`Hand`] is exactly 21 keypoints in the standard anatomical order; a
//! [`DetectionResult`] is the 0–2 hands seen in one frame.  Construction is
//! the only place malformed provider output is checked: a hand with the
//! wrong number of keypoints, or with non-finite coordinates, never becomes
//! a `Hand`.

use log::debug;

use crate::geometry::{CanvasSize, Point};

// ════════════════════════════════════════════════════════════════════════════
// Keypoint indices
// ════════════════════════════════════════════════════════════════════════════

pub const KEYPOINT_COUNT: usize = 21;
/// The landmark model is configured for at most two hands.
pub const MAX_HANDS: usize = 2;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Tips of the four non-thumb fingers, paired index-for-index with
/// [`FINGER_KNUCKLES`].
pub const FINGERTIPS:      [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
pub const FINGER_KNUCKLES: [usize; 4] = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// Bone connections for skeleton overlays.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),   (1, 2),   (2, 3),   (3, 4),
    (0, 5),   (5, 6),   (6, 7),   (7, 8),
    (5, 9),   (9, 10),  (10, 11), (11, 12),
    (9, 13),  (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
    (0, 17),
];

// ════════════════════════════════════════════════════════════════════════════
// Keypoint / Hand
// ════════════════════════════════════════════════════════════════════════════

/// One normalized landmark.  `z` is relative depth and unused by the
/// classifier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Keypoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Keypoint { x, y, z: 0.0 }
    }

    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Point> for Keypoint {
    fn from(p: Point) -> Self {
        Keypoint::new(p.x, p.y)
    }
}

/// A well-formed hand: exactly [`KEYPOINT_COUNT`] finite keypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    points: [Keypoint; KEYPOINT_COUNT],
}

impl Hand {
    pub fn new(points: [Keypoint; KEYPOINT_COUNT]) -> Option<Self> {
        points.iter().all(Keypoint::is_finite).then_some(Hand { points })
    }

    /// Replace any non-finite coordinate with zero.  For hands this crate
    /// synthesizes itself.
    pub(crate) fn sanitized(points: [Keypoint; KEYPOINT_COUNT]) -> Self {
        Hand { points: points.map(|k| if k.is_finite() { k } else { Keypoint::default() }) }
    }

    /// Validate raw provider output.  `None` for the wrong keypoint count
    /// or any non-finite coordinate.
    pub fn from_points(points: &[Keypoint]) -> Option<Self> {
        let arr: [Keypoint; KEYPOINT_COUNT] = points.try_into().ok()?;
        Hand::new(arr)
    }

    pub fn keypoints(&self) -> &[Keypoint; KEYPOINT_COUNT] {
        &self.points
    }

    /// Normalized position of keypoint `i`.
    ///
    /// # Panics
    /// If `i >= KEYPOINT_COUNT`; all callers use the index constants above.
    pub fn point(&self, i: usize) -> Point {
        self.points[i].xy()
    }

    pub fn pixel(&self, i: usize, canvas: CanvasSize) -> Point {
        canvas.to_pixels(self.point(i))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectionResult
// ════════════════════════════════════════════════════════════════════════════

/// The hands detected in one inference cycle.  Replaced wholesale on every
/// successful inference; reused as-is on throttled frames.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionResult {
    pub timestamp_ms: f64,
    hands: Vec<Hand>,
}

impl DetectionResult {
    /// Keeps at most [`MAX_HANDS`] hands, in detection order.
    pub fn new(timestamp_ms: f64, mut hands: Vec<Hand>) -> Self {
        hands.truncate(MAX_HANDS);
        DetectionResult { timestamp_ms, hands }
    }

    pub fn empty(timestamp_ms: f64) -> Self {
        DetectionResult { timestamp_ms, hands: Vec::new() }
    }

    /// Build from unvalidated provider output; malformed hands are dropped.
    pub fn from_raw<I, H>(timestamp_ms: f64, raw: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: AsRef<[Keypoint]>,
    {
        let mut dropped = 0usize;
        let hands = raw
            .into_iter()
            .filter_map(|h| {
                let hand = Hand::from_points(h.as_ref());
                if hand.is_none() { dropped += 1; }
                hand
            })
            .collect();
        if dropped > 0 {
            debug!("dropped {} malformed hand(s) at t={:.1}ms", dropped, timestamp_ms);
        }
        DetectionResult::new(timestamp_ms, hands)
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn len(&self) -> usize {
        self.hands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(n: usize) -> Vec<Keypoint> {
        (0..n).map(|i| Keypoint::new(i as f32 / 40.0, 0.5)).collect()
    }

    #[test]
    fn exact_count_accepted() {
        let h = Hand::from_points(&raw(21)).unwrap();
        assert_eq!(h.point(INDEX_TIP), Point::new(8.0 / 40.0, 0.5));
    }

    #[test]
    fn wrong_count_rejected() {
        assert!(Hand::from_points(&raw(20)).is_none());
        assert!(Hand::from_points(&raw(0)).is_none());
        assert!(Hand::from_points(&raw(22)).is_none());
    }

    #[test]
    fn non_finite_rejected() {
        let mut pts = raw(21);
        pts[7].y = f32::NAN;
        assert!(Hand::from_points(&pts).is_none());
    }

    #[test]
    fn from_raw_drops_malformed_keeps_order() {
        let mut second = raw(21);
        second[0].x = 0.9;
        let r = DetectionResult::from_raw(5.0, vec![raw(3), raw(21), second]);
        assert_eq!(r.len(), 2);
        assert_eq!(r.hands()[1].point(WRIST).x, 0.9);
    }

    #[test]
    fn at_most_two_hands() {
        let hands: Vec<Hand> = (0..3).map(|_| Hand::from_points(&raw(21)).unwrap()).collect();
        assert_eq!(DetectionResult::new(0.0, hands).len(), MAX_HANDS);
    }

    #[test]
    fn pixel_mapping() {
        let h = Hand::from_points(&raw(21)).unwrap();
        let p = h.pixel(WRIST, CanvasSize::new(100.0, 200.0));
        assert_eq!(p, Point::new(0.0, 100.0));
    }
}
