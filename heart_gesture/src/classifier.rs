//! Gesture classification: one pure decision per frame.
//!
//! [`Classifier::classify`] looks at a [`DetectionResult`] through the lens
//! of the active [`GestureMode`] and reports either [`Gesture::Absent`] or
//! the detected gesture with its anchor in canvas pixels.  Hands that do not
//! matter to the active mode are ignored; for the single-hand modes the
//! first matching hand in detection order wins, even if a later hand would
//! match "better".

use strum::{Display, EnumIter, EnumString};

use crate::geometry::{centroid, heading, midpoint, CanvasSize, Point};
use crate::landmark::{
    DetectionResult, Hand, FINGERTIPS, FINGER_KNUCKLES, INDEX_MCP, INDEX_TIP, MIDDLE_MCP,
    MIDDLE_TIP, THUMB_IP, THUMB_TIP, WRIST,
};

// ════════════════════════════════════════════════════════════════════════════
// GestureMode
// ════════════════════════════════════════════════════════════════════════════

/// The effect the user has selected.  Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum GestureMode {
    /// Two-handed finger-heart → pulsing heart and ripple.
    #[default]
    Heart,
    /// One-handed thumb/index pinch ("mini heart") → pulsing heart and ripple.
    Mini,
    /// Closed fist → growing flower bouquet.
    Flower,
}

// ════════════════════════════════════════════════════════════════════════════
// ClassifierConfig
// ════════════════════════════════════════════════════════════════════════════

/// Thresholds, all in normalized (0–1) video units except the ratios.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierConfig {
    /// Max thumb-tip and index-tip separation between two hands.
    pub heart_touch: f32,
    /// Max thumb-tip ↔ index-tip separation on one hand.
    pub pinch_touch: f32,
    /// A finger is folded when tip→wrist < `fold_ratio` × knuckle→wrist.
    pub fold_ratio:  f32,
    /// Folded non-thumb fingers needed for a fist.
    pub min_folded:  usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            heart_touch: 0.08,
            pinch_touch: 0.05,
            fold_ratio:  1.2,
            min_folded:  3,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// Where the bouquet grows from, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BouquetPose {
    /// Between the thumb joint and the index knuckle.
    pub top:    Point,
    /// The wrist.
    pub bottom: Point,
    /// Direction bottom → top, radians.
    pub angle:  f32,
}

/// Outcome of classifying one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Absent,
    FingerHeart { anchor: Point },
    MiniHeart   { anchor: Point },
    Fist(BouquetPose),
}

impl Gesture {
    pub fn is_detected(&self) -> bool {
        !matches!(self, Gesture::Absent)
    }

    /// The point effects attach to: the heart anchor, or the bouquet top.
    pub fn anchor(&self) -> Option<Point> {
        match self {
            Gesture::Absent                   => None,
            Gesture::FingerHeart { anchor }
            | Gesture::MiniHeart { anchor }   => Some(*anchor),
            Gesture::Fist(pose)               => Some(pose.top),
        }
    }

    pub fn bouquet(&self) -> Option<BouquetPose> {
        match self {
            Gesture::Fist(pose) => Some(*pose),
            _                   => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Classifier { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one frame for `mode`.  Never fails: no hands, or no hand
    /// that satisfies the mode, is simply [`Gesture::Absent`].
    pub fn classify(&self, frame: &DetectionResult, mode: GestureMode, canvas: CanvasSize) -> Gesture {
        let hands = frame.hands();
        match mode {
            GestureMode::Heart => match hands {
                [a, b] => self
                    .finger_heart(a, b, canvas)
                    .map_or(Gesture::Absent, |anchor| Gesture::FingerHeart { anchor }),
                _ => Gesture::Absent,
            },
            GestureMode::Mini => hands
                .iter()
                .find_map(|h| self.mini_heart(h, canvas))
                .map_or(Gesture::Absent, |anchor| Gesture::MiniHeart { anchor }),
            GestureMode::Flower => hands
                .iter()
                .find_map(|h| self.bouquet(h, canvas))
                .map_or(Gesture::Absent, Gesture::Fist),
        }
    }

    /// Two hands touching thumb-to-thumb and index-to-index.  Returns the
    /// centroid of the four tips in pixels.
    pub fn finger_heart(&self, a: &Hand, b: &Hand, canvas: CanvasSize) -> Option<Point> {
        let thumbs = a.point(THUMB_TIP).distance(b.point(THUMB_TIP));
        let index  = a.point(INDEX_TIP).distance(b.point(INDEX_TIP));
        if thumbs < self.config.heart_touch && index < self.config.heart_touch {
            let c = centroid(&[
                a.point(THUMB_TIP), b.point(THUMB_TIP),
                a.point(INDEX_TIP), b.point(INDEX_TIP),
            ]);
            Some(canvas.to_pixels(c))
        } else {
            None
        }
    }

    /// Thumb and index tips pinched together with the middle finger folded
    /// down.  Returns the pinch midpoint in pixels.
    pub fn mini_heart(&self, hand: &Hand, canvas: CanvasSize) -> Option<Point> {
        let (thumb, index) = (hand.point(THUMB_TIP), hand.point(INDEX_TIP));
        let folded = hand.point(MIDDLE_TIP).y > hand.point(MIDDLE_MCP).y;
        (thumb.distance(index) < self.config.pinch_touch && folded)
            .then(|| canvas.to_pixels(midpoint(thumb, index)))
    }

    /// Number of non-thumb fingers curled toward the wrist.
    pub fn folded_fingers(&self, hand: &Hand) -> usize {
        let wrist = hand.point(WRIST);
        FINGERTIPS
            .iter()
            .zip(FINGER_KNUCKLES.iter())
            .filter(|&(&tip, &mcp)| {
                let reach = hand.point(tip).distance(wrist);
                let base  = hand.point(mcp).distance(wrist);
                reach < base * self.config.fold_ratio
            })
            .count()
    }

    pub fn is_fist(&self, hand: &Hand) -> bool {
        self.folded_fingers(hand) >= self.config.min_folded
    }

    /// Bouquet placement for a fist, `None` if the hand is not a fist.
    pub fn bouquet(&self, hand: &Hand, canvas: CanvasSize) -> Option<BouquetPose> {
        if !self.is_fist(hand) {
            return None;
        }
        let top    = canvas.to_pixels(midpoint(hand.point(THUMB_IP), hand.point(INDEX_MCP)));
        let bottom = hand.pixel(WRIST, canvas);
        Some(BouquetPose { top, bottom, angle: heading(bottom, top) })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Keypoint, PINKY_TIP, RING_TIP};
    use crate::pose;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    const CANVAS: CanvasSize = CanvasSize::new(640.0, 480.0);

    /// Copy of `base` with some keypoints moved.
    fn with(base: &Hand, moves: &[(usize, Point)]) -> Hand {
        let mut pts: Vec<Keypoint> = base.keypoints().to_vec();
        for &(i, p) in moves {
            pts[i] = Keypoint::from(p);
        }
        Hand::from_points(&pts).unwrap()
    }

    fn pair(t1: Point, t2: Point, i1: Point, i2: Point) -> DetectionResult {
        let base = pose::open_hand(Point::new(0.5, 0.9), 0.2);
        let a = with(&base, &[(THUMB_TIP, t1), (INDEX_TIP, i1)]);
        let b = with(&base, &[(THUMB_TIP, t2), (INDEX_TIP, i2)]);
        DetectionResult::new(0.0, vec![a, b])
    }

    fn classify(frame: &DetectionResult, mode: GestureMode) -> Gesture {
        Classifier::default().classify(frame, mode, CANVAS)
    }

    #[test]
    fn mode_names() {
        assert_eq!(GestureMode::from_str("mini").unwrap(), GestureMode::Mini);
        assert_eq!(GestureMode::Flower.to_string(), "flower");
        assert_eq!(GestureMode::iter().count(), 3);
    }

    #[test]
    fn no_hands_is_absent_in_every_mode() {
        let empty = DetectionResult::empty(0.0);
        for mode in GestureMode::iter() {
            assert_eq!(classify(&empty, mode), Gesture::Absent);
        }
    }

    #[test]
    fn heart_scenario_from_two_hands() {
        let frame = pair(
            Point::new(0.50, 0.50), Point::new(0.52, 0.50),
            Point::new(0.48, 0.45), Point::new(0.50, 0.45),
        );
        match classify(&frame, GestureMode::Heart) {
            Gesture::FingerHeart { anchor } => {
                assert!((anchor.x - 320.0).abs() < 0.01);
                assert!((anchor.y - 228.0).abs() < 0.01);
            }
            g => panic!("expected finger heart, got {:?}", g),
        }
    }

    #[test]
    fn heart_threshold_is_strict() {
        // Exactly 0.08 apart on the thumbs: not a heart.
        let at = pair(
            Point::new(0.0, 0.5), Point::new(0.08, 0.5),
            Point::new(0.0, 0.4), Point::new(0.01, 0.4),
        );
        assert_eq!(classify(&at, GestureMode::Heart), Gesture::Absent);

        let inside = pair(
            Point::new(0.0, 0.5), Point::new(0.079, 0.5),
            Point::new(0.0, 0.4), Point::new(0.079, 0.4),
        );
        assert!(classify(&inside, GestureMode::Heart).is_detected());

        let index_apart = pair(
            Point::new(0.0, 0.5), Point::new(0.01, 0.5),
            Point::new(0.0, 0.4), Point::new(0.2, 0.4),
        );
        assert_eq!(classify(&index_apart, GestureMode::Heart), Gesture::Absent);
    }

    #[test]
    fn heart_needs_exactly_two_hands() {
        let [l, _] = pose::heart_pair(Point::new(0.5, 0.5), 0.2);
        let one = DetectionResult::new(0.0, vec![l]);
        assert_eq!(classify(&one, GestureMode::Heart), Gesture::Absent);
    }

    #[test]
    fn synthetic_heart_pair_detected() {
        let [l, r] = pose::heart_pair(Point::new(0.5, 0.5), 0.2);
        let frame = DetectionResult::new(0.0, vec![l, r]);
        assert!(classify(&frame, GestureMode::Heart).is_detected());
        // Neither hand pinches on its own.
        assert_eq!(classify(&frame, GestureMode::Mini), Gesture::Absent);
    }

    #[test]
    fn mini_heart_pinch() {
        let h = pose::pinch(Point::new(0.5, 0.8), 0.2);
        let frame = DetectionResult::new(0.0, vec![h.clone()]);
        match classify(&frame, GestureMode::Mini) {
            Gesture::MiniHeart { anchor } => {
                let mid = CANVAS.to_pixels(midpoint(h.point(THUMB_TIP), h.point(INDEX_TIP)));
                assert_eq!(anchor, mid);
            }
            g => panic!("expected mini heart, got {:?}", g),
        }
    }

    #[test]
    fn mini_heart_needs_folded_middle() {
        let h = pose::pinch(Point::new(0.5, 0.8), 0.2);
        let up = Point::new(h.point(MIDDLE_MCP).x, h.point(MIDDLE_MCP).y - 0.1);
        let straight = with(&h, &[(MIDDLE_TIP, up)]);
        let frame = DetectionResult::new(0.0, vec![straight]);
        assert_eq!(classify(&frame, GestureMode::Mini), Gesture::Absent);
    }

    #[test]
    fn mini_heart_first_match_wins() {
        let first  = pose::pinch(Point::new(0.3, 0.8), 0.2);
        let second = pose::pinch(Point::new(0.7, 0.8), 0.2);
        let expected = CANVAS.to_pixels(midpoint(first.point(THUMB_TIP), first.point(INDEX_TIP)));

        let both = DetectionResult::new(0.0, vec![first.clone(), second]);
        assert_eq!(classify(&both, GestureMode::Mini).anchor(), Some(expected));

        // A non-matching hand earlier in the list is skipped.
        let open = pose::open_hand(Point::new(0.5, 0.9), 0.2);
        let skip = DetectionResult::new(0.0, vec![open, first]);
        assert_eq!(classify(&skip, GestureMode::Mini).anchor(), Some(expected));
    }

    #[test]
    fn fist_detection() {
        let c = Classifier::default();
        assert!(c.is_fist(&pose::fist(Point::new(0.5, 0.8), 0.2)));
        assert!(!c.is_fist(&pose::open_hand(Point::new(0.5, 0.8), 0.2)));
        assert_eq!(c.folded_fingers(&pose::fist(Point::new(0.5, 0.8), 0.2)), 4);
    }

    #[test]
    fn fist_needs_three_folded() {
        let c = Classifier::default();
        let fist = pose::fist(Point::new(0.5, 0.8), 0.2);
        let open = pose::open_hand(Point::new(0.5, 0.8), 0.2);
        // Straighten ring and pinky: two folded, not a fist.
        let two = with(&fist, &[(RING_TIP, open.point(RING_TIP)), (PINKY_TIP, open.point(PINKY_TIP))]);
        assert_eq!(c.folded_fingers(&two), 2);
        assert!(!c.is_fist(&two));
        // Straighten only the pinky: three folded, still a fist.
        let three = with(&fist, &[(PINKY_TIP, open.point(PINKY_TIP))]);
        assert!(c.is_fist(&three));
    }

    #[test]
    fn fold_threshold_is_strict() {
        let c = Classifier::default();
        let ratio = c.config().fold_ratio;
        // Wrist straight above every joint, so each distance is a plain dy.
        let base = pose::fist(Point::new(0.5, 0.8), 0.2);
        let mut moves = vec![(WRIST, Point::new(0.5, 0.0))];
        for &mcp in &FINGER_KNUCKLES {
            moves.push((mcp, Point::new(0.5, 0.25)));
        }
        let [index, middle, ring, pinky] = FINGERTIPS;
        moves.push((middle, Point::new(0.5, 0.1)));
        moves.push((ring,   Point::new(0.5, 0.1)));
        moves.push((pinky,  Point::new(0.5, 0.5)));

        // Index tip exactly at the limit: not folded, so only two count.
        let mut at = moves.clone();
        at.push((index, Point::new(0.5, 0.25 * ratio)));
        let at = with(&base, &at);
        assert_eq!(c.folded_fingers(&at), 2);
        assert!(!c.is_fist(&at));

        let mut inside = moves;
        inside.push((index, Point::new(0.5, 0.25 * ratio - 1e-4)));
        let inside = with(&base, &inside);
        assert_eq!(c.folded_fingers(&inside), 3);
        assert!(c.is_fist(&inside));
    }

    #[test]
    fn pinch_threshold_is_strict() {
        let h = pose::pinch(Point::new(0.5, 0.8), 0.2);
        let y = h.point(THUMB_TIP).y;

        // Exactly 0.05 apart: not a pinch.
        let at = with(&h, &[(THUMB_TIP, Point::new(0.0, y)), (INDEX_TIP, Point::new(0.05, y))]);
        let frame = DetectionResult::new(0.0, vec![at]);
        assert_eq!(classify(&frame, GestureMode::Mini), Gesture::Absent);

        let inside = with(&h, &[(THUMB_TIP, Point::new(0.0, y)), (INDEX_TIP, Point::new(0.049, y))]);
        let frame = DetectionResult::new(0.0, vec![inside]);
        assert!(classify(&frame, GestureMode::Mini).is_detected());
    }

    #[test]
    fn bouquet_axis_points_from_wrist_to_knuckles() {
        let h = pose::fist(Point::new(0.5, 0.8), 0.2);
        let frame = DetectionResult::new(0.0, vec![h.clone()]);
        let pose = classify(&frame, GestureMode::Flower).bouquet().unwrap();
        assert_eq!(pose.bottom, h.pixel(WRIST, CANVAS));
        let top = CANVAS.to_pixels(midpoint(h.point(THUMB_IP), h.point(INDEX_MCP)));
        assert_eq!(pose.top, top);
        let expected = (top.y - pose.bottom.y).atan2(top.x - pose.bottom.x);
        assert!((pose.angle - expected).abs() < 1e-6);
        // Fingers point up the screen.
        assert!(pose.angle < 0.0);
    }
}
