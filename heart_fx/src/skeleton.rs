//! Hand skeleton overlay: bones as thin pink lines, keypoints as white dots.

use heart_gesture::landmark::HAND_CONNECTIONS;
use heart_gesture::{CanvasSize, DetectionResult, Hand, Path};

use crate::palette::{SKELETON_PINK, WHITE};
use crate::surface::{Stroke, Surface};

const BONE_WIDTH: f32 = 2.0;
const JOINT_RADIUS: f32 = 3.0;
const OVERLAY_ALPHA: f32 = 0.5;

pub fn bones(hand: &Hand, canvas: CanvasSize) -> Path {
    HAND_CONNECTIONS.iter().fold(Path::new(), |p, &(a, b)| {
        p.move_to(hand.pixel(a, canvas)).line_to(hand.pixel(b, canvas))
    })
}

pub fn joints(hand: &Hand, canvas: CanvasSize) -> Path {
    (0..hand.keypoints().len()).fold(Path::new(), |p, i| p.circle(hand.pixel(i, canvas), JOINT_RADIUS))
}

/// Draw every hand in `frame`.  Nothing is drawn for an empty frame.
pub fn draw_skeleton(surface: &mut dyn Surface, frame: &DetectionResult) {
    if frame.is_empty() {
        return;
    }
    let canvas = surface.size();
    surface.save();
    surface.set_alpha(OVERLAY_ALPHA);
    for hand in frame.hands() {
        surface.stroke(&bones(hand, canvas), Stroke::new(SKELETON_PINK, BONE_WIDTH));
        surface.fill(&joints(hand, canvas), WHITE);
    }
    surface.restore();
}
