//! The 2-D drawing surface the effects render onto.
//!
//! Modeled on an HTML-canvas context: a current transform, a global alpha,
//! and an optional drop shadow, all saved and restored as one unit.  Paths
//! are given in local coordinates and mapped through the current transform
//! by the implementation.
//!
//! Two implementations exist: the software rasterizer in the app crate, and
//! [`RecordingSurface`] here, which keeps every draw call for inspection.

use heart_gesture::geometry::Affine;
use heart_gesture::{CanvasSize, Path, Point};

use crate::palette::Color;

// ════════════════════════════════════════════════════════════════════════════
// Paint state
// ════════════════════════════════════════════════════════════════════════════

/// Soft glow painted under a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Color,
    /// Blur radius, pixels.
    pub blur:  f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub cap:   LineCap,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Stroke { color, width, cap: LineCap::Butt }
    }

    pub fn round(mut self) -> Self {
        self.cap = LineCap::Round;
        self
    }
}

/// Everything `save`/`restore` covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintState {
    pub transform: Affine,
    pub alpha:     f32,
    pub shadow:    Option<Shadow>,
}

impl Default for PaintState {
    fn default() -> Self {
        PaintState { transform: Affine::IDENTITY, alpha: 1.0, shadow: None }
    }
}

/// The save/restore stack shared by surface implementations.
#[derive(Clone, Debug, Default)]
pub struct StateStack {
    current: PaintState,
    saved:   Vec<PaintState>,
}

impl StateStack {
    pub fn current(&self) -> &PaintState {
        &self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(s) = self.saved.pop() {
            self.current = s;
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current.transform.translate(dx, dy);
    }

    pub fn rotate(&mut self, radians: f32) {
        self.current.transform.rotate(radians);
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.current.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.current.shadow = shadow;
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Back to identity with nothing saved.
    pub fn reset(&mut self) {
        *self = StateStack::default();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Surface
// ════════════════════════════════════════════════════════════════════════════

pub trait Surface {
    /// Canvas size in pixels.
    fn size(&self) -> CanvasSize;
    /// Erase to transparent and reset the paint state.
    fn clear(&mut self);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, radians: f32);
    fn set_alpha(&mut self, alpha: f32);
    fn set_shadow(&mut self, shadow: Option<Shadow>);

    fn fill(&mut self, path: &Path, color: Color);
    fn stroke(&mut self, path: &Path, stroke: Stroke);
}

// ════════════════════════════════════════════════════════════════════════════
// RecordingSurface: keeps every draw call (used by tests)
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum DrawKind {
    Fill(Color),
    Stroke(Stroke),
}

/// One recorded draw call with the paint state it was issued under.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawOp {
    pub kind:  DrawKind,
    pub path:  Path,
    pub state: PaintState,
}

impl DrawOp {
    pub fn color(&self) -> Color {
        match self.kind {
            DrawKind::Fill(c)   => c,
            DrawKind::Stroke(s) => s.color,
        }
    }

    /// Canvas-space bounds of the path under the recorded transform.
    pub fn device_bounds(&self) -> Option<(Point, Point)> {
        let t = self.state.transform;
        let lines = self.path.flatten();
        let mut pts = lines.iter().flat_map(|l| l.points.iter()).map(|p| t.apply(*p));
        let first = pts.next()?;
        Some(pts.fold((first, first), |(lo, hi), p| {
            (Point::new(lo.x.min(p.x), lo.y.min(p.y)), Point::new(hi.x.max(p.x), hi.y.max(p.y)))
        }))
    }
}

#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size:   CanvasSize,
    state:  StateStack,
    ops:    Vec<DrawOp>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new(size: CanvasSize) -> Self {
        RecordingSurface { size, state: StateStack::default(), ops: Vec::new(), clears: 0 }
    }

    /// Draw calls since the last `clear`.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn fills_of(&self, color: Color) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(move |op| op.kind == DrawKind::Fill(color))
    }

    pub fn strokes_of(&self, color: Color) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(move |op| matches!(op.kind, DrawKind::Stroke(s) if s.color == color))
    }

    /// Open `save`s not yet restored.
    pub fn save_depth(&self) -> usize {
        self.state.depth()
    }

    fn record(&mut self, kind: DrawKind, path: &Path) {
        self.ops.push(DrawOp { kind, path: path.clone(), state: *self.state.current() });
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> CanvasSize { self.size }

    fn clear(&mut self) {
        self.ops.clear();
        self.state.reset();
        self.clears += 1;
    }

    fn save(&mut self)                            { self.state.save() }
    fn restore(&mut self)                         { self.state.restore() }
    fn translate(&mut self, dx: f32, dy: f32)     { self.state.translate(dx, dy) }
    fn rotate(&mut self, radians: f32)            { self.state.rotate(radians) }
    fn set_alpha(&mut self, alpha: f32)           { self.state.set_alpha(alpha) }
    fn set_shadow(&mut self, shadow: Option<Shadow>) { self.state.set_shadow(shadow) }

    fn fill(&mut self, path: &Path, color: Color) {
        self.record(DrawKind::Fill(color), path);
    }

    fn stroke(&mut self, path: &Path, stroke: Stroke) {
        self.record(DrawKind::Stroke(stroke), path);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
