//! 2-D geometry: points, canvas scaling, angles, vector paths, and the
//! affine transform used by render surfaces.
//!
//! Every function here is total over finite input: distances go through
//! `hypot`, headings through `atan2`, and nothing divides by a length.

use std::f32::consts::TAU;

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A 2-D point.  Used both for normalized video coordinates (0–1) and for
/// canvas pixels; which one is meant is always stated at the call site.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        distance(self, other)
    }

    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Euclidean distance.
pub fn distance(a: Point, b: Point) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Arithmetic mean of `points`; the origin for an empty slice.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ORIGIN;
    }
    let n = points.len() as f32;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Direction of the vector `from → to`, in radians (`atan2(dy, dx)`).
pub fn heading(from: Point, to: Point) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

pub fn lerp(start: f32, end: f32, factor: f32) -> f32 {
    start + (end - start) * factor
}


// ════════════════════════════════════════════════════════════════════════════
// CanvasSize: normalized → pixel mapping
// ════════════════════════════════════════════════════════════════════════════

/// Pixel size of the overlay canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width:  f32,
    pub height: f32,
}

impl CanvasSize {
    pub const fn new(width: f32, height: f32) -> Self {
        CanvasSize { width, height }
    }

    /// Map a normalized (0–1) point into canvas pixels.
    pub fn to_pixels(&self, p: Point) -> Point {
        Point::new(p.x * self.width, p.y * self.height)
    }

    pub fn diagonal(&self) -> f32 {
        self.width.hypot(self.height)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        CanvasSize::new(640.0, 480.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Path: vector path construction
// ════════════════════════════════════════════════════════════════════════════

/// One path construction step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    QuadTo  { ctrl: Point, to: Point },
    CubicTo { c1: Point, c2: Point, to: Point },
    /// A full, axis-aligned ellipse.  Always a closed subpath of its own.
    Ellipse { center: Point, rx: f32, ry: f32 },
    Close,
}

/// A sequence of path commands, built fluently.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    cmds: Vec<PathCmd>,
}

/// A flattened subpath.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

const QUAD_STEPS:    usize = 12;
const CUBIC_STEPS:   usize = 16;
const ELLIPSE_STEPS: usize = 40;

impl Path {
    pub fn new() -> Self {
        Path::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.cmds.push(PathCmd::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.cmds.push(PathCmd::LineTo(p));
        self
    }

    pub fn quad_to(mut self, ctrl: Point, to: Point) -> Self {
        self.cmds.push(PathCmd::QuadTo { ctrl, to });
        self
    }

    pub fn cubic_to(mut self, c1: Point, c2: Point, to: Point) -> Self {
        self.cmds.push(PathCmd::CubicTo { c1, c2, to });
        self
    }

    pub fn ellipse(mut self, center: Point, rx: f32, ry: f32) -> Self {
        self.cmds.push(PathCmd::Ellipse { center, rx, ry });
        self
    }

    pub fn circle(self, center: Point, r: f32) -> Self {
        self.ellipse(center, r, r)
    }

    pub fn close(mut self) -> Self {
        self.cmds.push(PathCmd::Close);
        self
    }

    pub fn commands(&self) -> &[PathCmd] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Approximate the path with straight segments.
    pub fn flatten(&self) -> Vec<Polyline> {
        let mut out: Vec<Polyline> = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        let mut pen = Point::ORIGIN;

        let flush = |current: &mut Vec<Point>, out: &mut Vec<Polyline>, closed: bool| {
            if current.len() > 1 {
                out.push(Polyline { points: std::mem::take(current), closed });
            } else {
                current.clear();
            }
        };

        for cmd in &self.cmds {
            match *cmd {
                PathCmd::MoveTo(p) => {
                    flush(&mut current, &mut out, false);
                    current.push(p);
                    pen = p;
                }
                PathCmd::LineTo(p) => {
                    if current.is_empty() { current.push(pen); }
                    current.push(p);
                    pen = p;
                }
                PathCmd::QuadTo { ctrl, to } => {
                    if current.is_empty() { current.push(pen); }
                    let p0 = pen;
                    for i in 1..=QUAD_STEPS {
                        let t = i as f32 / QUAD_STEPS as f32;
                        let u = 1.0 - t;
                        current.push(Point::new(
                            u * u * p0.x + 2.0 * u * t * ctrl.x + t * t * to.x,
                            u * u * p0.y + 2.0 * u * t * ctrl.y + t * t * to.y,
                        ));
                    }
                    pen = to;
                }
                PathCmd::CubicTo { c1, c2, to } => {
                    if current.is_empty() { current.push(pen); }
                    let p0 = pen;
                    for i in 1..=CUBIC_STEPS {
                        let t = i as f32 / CUBIC_STEPS as f32;
                        let u = 1.0 - t;
                        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
                        current.push(Point::new(
                            a * p0.x + b * c1.x + c * c2.x + d * to.x,
                            a * p0.y + b * c1.y + c * c2.y + d * to.y,
                        ));
                    }
                    pen = to;
                }
                PathCmd::Ellipse { center, rx, ry } => {
                    flush(&mut current, &mut out, false);
                    let ring = (0..ELLIPSE_STEPS)
                        .map(|i| {
                            let a = TAU * i as f32 / ELLIPSE_STEPS as f32;
                            Point::new(center.x + rx * a.cos(), center.y + ry * a.sin())
                        })
                        .collect();
                    out.push(Polyline { points: ring, closed: true });
                    pen = center;
                }
                PathCmd::Close => {
                    let start = current.first().copied();
                    flush(&mut current, &mut out, true);
                    if let Some(s) = start { pen = s; }
                }
            }
        }
        flush(&mut current, &mut out, false);
        out
    }

    /// Axis-aligned bounds `(min, max)` of the flattened path.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let lines = self.flatten();
        let mut it = lines.iter().flat_map(|l| l.points.iter());
        let first = *it.next()?;
        Some(it.fold((first, first), |(lo, hi), p| {
            (Point::new(lo.x.min(p.x), lo.y.min(p.y)), Point::new(hi.x.max(p.x), hi.y.max(p.y)))
        }))
    }
}

/// The heart outline: four cubic lobes, top-centre notch at
/// `(x, y + 0.3·size)`, bottom tip at `(x, y + size)`, `size` wide.
pub fn heart_path(x: f32, y: f32, size: f32) -> Path {
    let top  = size * 0.3;
    let half = size / 2.0;
    let waist = y + (size + top) / 2.0;
    Path::new()
        .move_to(Point::new(x, y + top))
        .cubic_to(Point::new(x, y), Point::new(x - half, y), Point::new(x - half, y + top))
        .cubic_to(Point::new(x - half, waist), Point::new(x, waist), Point::new(x, y + size))
        .cubic_to(Point::new(x, waist), Point::new(x + half, waist), Point::new(x + half, y + top))
        .cubic_to(Point::new(x + half, y), Point::new(x, y), Point::new(x, y + top))
        .close()
}

/// Heart of `size` whose vertical centre sits on `center`.
pub fn centered_heart(center: Point, size: f32) -> Path {
    heart_path(center.x, center.y - size / 2.0, size)
}

// ════════════════════════════════════════════════════════════════════════════
// Affine: 2-D transform with canvas-style post-multiplication
// ════════════════════════════════════════════════════════════════════════════

/// `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f32, pub b: f32,
    pub c: f32, pub d: f32,
    pub e: f32, pub f: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Affine::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    /// Translate in the current (local) frame.
    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.e += self.a * tx + self.c * ty;
        self.f += self.b * tx + self.d * ty;
    }

    /// Rotate the local frame by `theta` radians.
    pub fn rotate(&mut self, theta: f32) {
        let (s, c) = theta.sin_cos();
        let (a, b, cc, d) = (self.a, self.b, self.c, self.d);
        self.a = a * c + cc * s;
        self.b = b * c + d * s;
        self.c = -a * s + cc * c;
        self.d = -b * s + d * c;
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Uniform scale factor, for stroke widths and blur radii.
    pub fn scale_factor(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn close(a: f32, b: f32) -> bool { (a - b).abs() < 1e-4 }

    #[test]
    fn distance_is_hypot() {
        assert!(close(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0));
        assert_eq!(distance(Point::new(0.2, 0.2), Point::new(0.2, 0.2)), 0.0);
    }

    #[test]
    fn centroid_of_four() {
        let c = centroid(&[
            Point::new(0.0, 0.0), Point::new(2.0, 0.0),
            Point::new(2.0, 2.0), Point::new(0.0, 2.0),
        ]);
        assert_eq!(c, Point::new(1.0, 1.0));
        assert_eq!(centroid(&[]), Point::ORIGIN);
    }

    #[test]
    fn heading_points_up_in_image_space() {
        // y grows downward, so "up" is -π/2
        let h = heading(Point::new(10.0, 10.0), Point::new(10.0, 0.0));
        assert!(close(h, -PI / 2.0));
    }

    #[test]
    fn lerp_moves_by_factor() {
        assert!(close(lerp(3.0, -3.0, 0.08), 2.52));
        assert!(close(lerp(-1.0, 1.0, 1.0), 1.0));
    }

    #[test]
    fn canvas_scaling() {
        let c = CanvasSize::new(640.0, 480.0);
        assert_eq!(c.to_pixels(Point::new(0.5, 0.25)), Point::new(320.0, 120.0));
        assert!(close(c.diagonal(), 800.0));
    }

    #[test]
    fn heart_path_geometry() {
        let p = heart_path(100.0, 50.0, 60.0);
        assert_eq!(p.commands().len(), 6);
        assert_eq!(p.commands()[0], PathCmd::MoveTo(Point::new(100.0, 68.0)));
        let (lo, hi) = p.bounds().unwrap();
        assert!(close(lo.x, 70.0));
        assert!(close(hi.x, 130.0));
        assert!(close(hi.y, 110.0)); // bottom tip
        assert!(lo.y > 50.0);
    }

    #[test]
    fn centered_heart_straddles_anchor() {
        let (lo, hi) = centered_heart(Point::new(0.0, 0.0), 40.0).bounds().unwrap();
        assert!(lo.y < 0.0 && hi.y > 0.0);
        assert!(close(hi.y, 20.0));
    }

    #[test]
    fn flatten_splits_subpaths() {
        let p = Path::new()
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.0, 0.0))
            .circle(Point::new(5.0, 5.0), 2.0);
        let lines = p.flatten();
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].closed);
        assert!(lines[1].closed);
        assert_eq!(lines[1].points.len(), ELLIPSE_STEPS);
    }

    #[test]
    fn quad_ends_on_target() {
        let lines = Path::new()
            .move_to(Point::new(0.0, 0.0))
            .quad_to(Point::new(5.0, 10.0), Point::new(10.0, 0.0))
            .flatten();
        assert_eq!(*lines[0].points.last().unwrap(), Point::new(10.0, 0.0));
    }

    #[test]
    fn affine_translate_then_rotate() {
        let mut m = Affine::IDENTITY;
        m.translate(10.0, 0.0);
        m.rotate(PI / 2.0);
        let p = m.apply(Point::new(1.0, 0.0));
        assert!(close(p.x, 10.0));
        assert!(close(p.y, 1.0));
        assert!(close(m.scale_factor(), 1.0));
    }
}
