//! Software rasterizer: a [`Surface`] over a `0xAARRGGBB` pixel buffer.
//!
//! Paths are flattened, mapped through the current transform, and filled
//! with a nonzero scanline fill sampled at pixel centres.  Strokes become
//! one quad per segment (plus discs for round caps) filled the same way, so
//! overlapping pieces of one stroke never double-blend.  Shadows are drawn
//! under fills only, as a few outward-grown copies of the shape.
//!
//! The buffer also carries the flat drawing helpers (rectangles, borders,
//! 3×5 bitmap text) the visualizer uses for its status bar and reward card.

use heart_fx::palette::{alpha, Color};
use heart_fx::surface::{PaintState, StateStack};
use heart_fx::{Stroke, LineCap, Surface};
use heart_gesture::geometry::{centroid, Affine};
use heart_gesture::{CanvasSize, Path, Point};

/// Outward copies painted for a shadow.
const GLOW_STEPS: usize = 4;
/// Vertices per round cap.
const CAP_STEPS:  usize = 12;

// ════════════════════════════════════════════════════════════════════════════
// Raster
// ════════════════════════════════════════════════════════════════════════════

pub struct Raster {
    width:      usize,
    height:     usize,
    pixels:     Vec<u32>,
    background: u32,
    state:      StateStack,
}

impl Raster {
    pub fn new(width: usize, height: usize, background: u32) -> Self {
        Raster {
            width,
            height,
            pixels: vec![background; width * height],
            background,
            state: StateStack::default(),
        }
    }

    pub fn width(&self)  -> usize  { self.width }
    pub fn height(&self) -> usize  { self.height }
    pub fn pixels(&self) -> &[u32] { &self.pixels }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    // ── pixel primitives ──────────────────────────────────────────────────

    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }

    /// Source-over blend of `color` at `opacity` (0.0–1.0) onto one pixel.
    fn blend_pixel(&mut self, idx: usize, color: u32, opacity: f32) {
        if opacity >= 1.0 {
            self.pixels[idx] = color | 0xFF000000;
            return;
        }
        let dst = self.pixels[idx];
        let mix = |shift: u32| {
            let s = ((color >> shift) & 0xFF) as f32;
            let d = ((dst >> shift) & 0xFF) as f32;
            ((s * opacity + d * (1.0 - opacity)).round() as u32).min(255) << shift
        };
        self.pixels[idx] = 0xFF000000 | mix(16) | mix(8) | mix(0);
    }

    /// Rectangle, alpha-blended by the color's own alpha.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: usize, h: usize, color: u32) {
        let opacity = alpha(color) as f32 / 255.0;
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = ((x + w as i32).max(0) as usize).min(self.width);
        let y1 = ((y + h as i32).max(0) as usize).min(self.height);
        for row in y0..y1 {
            for col in x0..x1 {
                self.blend_pixel(row * self.width + col, color, opacity);
            }
        }
    }

    pub fn draw_border(&mut self, x: i32, y: i32, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 {
            return;
        }
        let (r, b) = (x + w as i32 - 1, y + h as i32 - 1);
        for col in x..=r {
            self.set_pixel(col, y, color);
            self.set_pixel(col, b, color);
        }
        for row in y..=b {
            self.set_pixel(x, row, color);
            self.set_pixel(r, row, color);
        }
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`×`scale` block.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: usize, color: u32) {
        let s = scale.max(1) as i32;
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3i32 {
                    if bits & (1 << (2 - col)) != 0 {
                        for dy in 0..s {
                            for dx in 0..s {
                                self.set_pixel(cx + col * s + dx, y + row as i32 * s + dy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * s;
            if cx >= self.width as i32 { break; }
        }
    }

    pub fn text_width(text: &str, scale: usize) -> usize {
        (text.chars().count() * 4 * scale.max(1)).saturating_sub(scale.max(1))
    }

    // ── polygon fill ──────────────────────────────────────────────────────

    /// Nonzero fill of device-space rings.  Every ring is first turned
    /// counter-clockwise, so overlapping rings form a union.
    fn fill_rings(&mut self, rings: &[Vec<Point>], color: u32, opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        let rings: Vec<Vec<Point>> = rings.iter()
            .filter(|r| r.len() >= 3)
            .map(|r| oriented(r))
            .collect();
        let Some((y_min, y_max)) = rings.iter().flatten().fold(None, |acc: Option<(f32, f32)>, p| {
            Some(acc.map_or((p.y, p.y), |(lo, hi)| (lo.min(p.y), hi.max(p.y))))
        }) else { return };
        if !y_min.is_finite() || !y_max.is_finite() {
            return;
        }

        let row0 = (y_min.floor().max(0.0)) as usize;
        let row1 = ((y_max.ceil().max(0.0)) as usize).min(self.height);
        let mut crossings: Vec<(f32, i32)> = Vec::new();

        for row in row0..row1 {
            let yc = row as f32 + 0.5;
            crossings.clear();
            for ring in &rings {
                for (i, a) in ring.iter().enumerate() {
                    let b = ring[(i + 1) % ring.len()];
                    let (up, down) = (a.y <= yc && b.y > yc, b.y <= yc && a.y > yc);
                    if up || down {
                        let x = a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y);
                        crossings.push((x, if up { 1 } else { -1 }));
                    }
                }
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                let c0 = (pair[0].0 - 0.5).ceil().max(0.0) as usize;
                let c1 = ((pair[1].0 - 0.5).ceil().max(0.0) as usize).min(self.width);
                for col in c0..c1 {
                    self.blend_pixel(row * self.width + col, color, opacity);
                }
            }
        }
    }

    fn device_rings(path: &Path, t: &Affine) -> Vec<Vec<Point>> {
        path.flatten()
            .into_iter()
            .map(|line| line.points.into_iter().map(|p| t.apply(p)).collect())
            .collect()
    }

    fn paint_opacity(state: &PaintState, color: Color) -> f32 {
        state.alpha * alpha(color) as f32 / 255.0
    }
}

/// Counter-clockwise (in y-down pixel space) copy of `ring`.
fn oriented(ring: &[Point]) -> Vec<Point> {
    let area2: f32 = ring.iter().enumerate()
        .map(|(i, a)| {
            let b = ring[(i + 1) % ring.len()];
            a.x * b.y - b.x * a.y
        })
        .sum();
    let mut out = ring.to_vec();
    if area2 < 0.0 {
        out.reverse();
    }
    out
}

/// `ring` with every vertex pushed `by` pixels away from its centroid.
fn grown(ring: &[Point], by: f32) -> Vec<Point> {
    let c = centroid(ring);
    ring.iter()
        .map(|p| {
            let d = p.distance(c);
            if d < 1e-3 { *p } else { Point::new(p.x + (p.x - c.x) / d * by, p.y + (p.y - c.y) / d * by) }
        })
        .collect()
}

fn disc(center: Point, r: f32) -> Vec<Point> {
    (0..CAP_STEPS)
        .map(|i| {
            let a = std::f32::consts::TAU * i as f32 / CAP_STEPS as f32;
            Point::new(center.x + r * a.cos(), center.y + r * a.sin())
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Surface impl
// ════════════════════════════════════════════════════════════════════════════

impl Surface for Raster {
    fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width as f32, self.height as f32)
    }

    fn clear(&mut self) {
        self.pixels.fill(self.background);
        self.state.reset();
    }

    fn save(&mut self)                                { self.state.save() }
    fn restore(&mut self)                             { self.state.restore() }
    fn translate(&mut self, dx: f32, dy: f32)         { self.state.translate(dx, dy) }
    fn rotate(&mut self, radians: f32)                { self.state.rotate(radians) }
    fn set_alpha(&mut self, a: f32)                   { self.state.set_alpha(a) }
    fn set_shadow(&mut self, shadow: Option<heart_fx::Shadow>) { self.state.set_shadow(shadow) }

    fn fill(&mut self, path: &Path, color: Color) {
        let state = *self.state.current();
        let rings = Raster::device_rings(path, &state.transform);

        if let Some(shadow) = state.shadow {
            let blur = shadow.blur * state.transform.scale_factor();
            let layer = Raster::paint_opacity(&state, shadow.color) / GLOW_STEPS as f32;
            for k in (1..=GLOW_STEPS).rev() {
                let by = blur * k as f32 / GLOW_STEPS as f32;
                let halo: Vec<Vec<Point>> = rings.iter().map(|r| grown(r, by)).collect();
                self.fill_rings(&halo, shadow.color, layer);
            }
        }
        self.fill_rings(&rings, color, Raster::paint_opacity(&state, color));
    }

    fn stroke(&mut self, path: &Path, stroke: Stroke) {
        let state = *self.state.current();
        let half = stroke.width * state.transform.scale_factor() / 2.0;
        if half <= 0.0 {
            return;
        }
        let mut pieces: Vec<Vec<Point>> = Vec::new();
        for line in path.flatten() {
            let pts: Vec<Point> = line.points.iter().map(|p| state.transform.apply(*p)).collect();
            let mut segs: Vec<(Point, Point)> = pts.windows(2).map(|w| (w[0], w[1])).collect();
            if line.closed {
                if let (Some(&first), Some(&last)) = (pts.first(), pts.last()) {
                    segs.push((last, first));
                }
            }
            for (a, b) in segs {
                let len = a.distance(b);
                if len < 1e-4 {
                    continue;
                }
                let nx = -(b.y - a.y) / len * half;
                let ny =  (b.x - a.x) / len * half;
                pieces.push(vec![
                    Point::new(a.x + nx, a.y + ny),
                    Point::new(b.x + nx, b.y + ny),
                    Point::new(b.x - nx, b.y - ny),
                    Point::new(a.x - nx, a.y - ny),
                ]);
            }
            if stroke.cap == LineCap::Round {
                pieces.extend(pts.iter().map(|p| disc(*p, half)));
            }
        }
        self.fill_rings(&pieces, stroke.color, Raster::paint_opacity(&state, stroke.color));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '[' => [0b011, 0b010, 0b010, 0b010, 0b011],
        ']' => [0b110, 0b010, 0b010, 0b010, 0b110],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
