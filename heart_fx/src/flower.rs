//! Flower bouquet growing out of a closed fist.
//!
//! While the fist holds, a flower and a ground stem are planted every third
//! frame (up to 12 and 8), each with randomized shape, and everything grows
//! a little every frame.  Flowers sprout from the knuckles along the forearm
//! axis; ground stems hang from the wrist.  The hand pose is low-pass
//! filtered so the bouquet does not jitter with the landmarks.
//!
//! Releasing the fist for a single frame clears the whole garden.

use std::f32::consts::{FRAC_PI_2, TAU};

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use heart_gesture::geometry::lerp;
use heart_gesture::{BouquetPose, Path, Point};

use crate::palette::{Color, BLOOM_GOLD, FLOWER_PALETTE, STEM_GREEN};
use crate::surface::{Stroke, Surface};

pub const MAX_FLOWERS: usize = 12;
pub const MAX_STEMS:   usize = 8;
/// Frames between plantings.
pub const PLANT_EVERY: u32 = 3;
pub const SMOOTHING:   f32 = 0.08;
/// The frame counter rolls over on a multiple of `PLANT_EVERY`, keeping the
/// planting cadence.
const FRAME_WRAP: u32 = u32::MAX - u32::MAX % PLANT_EVERY;

const BLOOM_STEP:        f32 = 2.0;
/// Stem fraction at which the bloom starts opening.
const BLOOM_AT:          f32 = 0.3;
const FLOWER_STEM_WIDTH: f32 = 4.0;
const STEM_BOW:          f32 = 20.0;

// ════════════════════════════════════════════════════════════════════════════
// GroundStem
// ════════════════════════════════════════════════════════════════════════════

/// A short leafless stem hanging from the wrist.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundStem {
    pub angle:      f32,
    pub length:     f32,
    pub max_length: f32,
    pub width:      f32,
    pub speed:      f32,
    pub offset_x:   f32,
}

impl GroundStem {
    pub fn sprout<R: Rng>(rng: &mut R) -> Self {
        GroundStem {
            angle:      (rng.random::<f32>() - 0.5) * 0.5,
            length:     0.0,
            max_length: rng.random_range(40.0..80.0),
            width:      rng.random_range(3.0..5.0),
            speed:      rng.random_range(5.0..8.0),
            offset_x:   rng.random_range(-10.0..10.0),
        }
    }

    pub fn grow(&mut self) {
        self.length = (self.length + self.speed).min(self.max_length);
    }

    pub fn draw(&self, surface: &mut dyn Surface, base: Point, heading: f32) {
        surface.save();
        surface.translate(base.x, base.y);
        surface.rotate(heading + FRAC_PI_2);
        surface.translate(self.offset_x, 0.0);
        let (s, c) = self.angle.sin_cos();
        let line = Path::new()
            .move_to(Point::ORIGIN)
            .line_to(Point::new(s * self.length, c * self.length));
        surface.stroke(&line, Stroke::new(STEM_GREEN, self.width).round());
        surface.restore();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Flower
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Flower {
    pub angle:           f32,
    pub stem_height:     f32,
    pub max_stem_height: f32,
    pub bloom:           f32,
    pub max_bloom:       f32,
    pub color:           Color,
    pub speed:           f32,
    pub offset:          Point,
    pub petals:          u8,
}

impl Flower {
    pub fn sprout<R: Rng>(rng: &mut R) -> Self {
        Flower {
            angle:           rng.random_range(-1.0..1.0),
            stem_height:     0.0,
            max_stem_height: rng.random_range(80.0..180.0),
            bloom:           0.0,
            max_bloom:       rng.random_range(40.0..70.0),
            color:           FLOWER_PALETTE[rng.random_range(0..FLOWER_PALETTE.len())],
            speed:           rng.random_range(6.0..10.0),
            offset:          Point::new(rng.random_range(-15.0..15.0), rng.random_range(-5.0..5.0)),
            petals:          rng.random_range(5..=6),
        }
    }

    pub fn grow(&mut self) {
        self.stem_height = (self.stem_height + self.speed).min(self.max_stem_height);
        if self.stem_height > self.max_stem_height * BLOOM_AT {
            self.bloom = (self.bloom + BLOOM_STEP).min(self.max_bloom);
        }
    }

    /// Stem tip in the flower's local frame (stem grows toward -y).
    pub fn tip(&self) -> Point {
        let (s, c) = self.angle.sin_cos();
        Point::new(s * self.stem_height, -c * self.stem_height)
    }

    pub fn draw(&self, surface: &mut dyn Surface, base: Point, heading: f32) {
        surface.save();
        surface.translate(base.x, base.y);
        surface.rotate(heading + FRAC_PI_2);
        surface.translate(self.offset.x, self.offset.y);

        let tip = self.tip();
        let ctrl = Point::new(tip.x / 2.0 + self.angle.sin() * STEM_BOW, tip.y / 2.0);
        let stem = Path::new().move_to(Point::ORIGIN).quad_to(ctrl, tip);
        surface.stroke(&stem, Stroke::new(STEM_GREEN, FLOWER_STEM_WIDTH).round());

        if self.bloom > 0.0 {
            surface.translate(tip.x, tip.y);
            let petal = Path::new().ellipse(
                Point::new(0.0, self.bloom * 0.6),
                self.bloom * 0.5,
                self.bloom * 0.7,
            );
            let step = TAU / self.petals as f32;
            for _ in 0..self.petals {
                surface.rotate(step);
                surface.fill(&petal, self.color);
            }
            surface.fill(&Path::new().circle(Point::ORIGIN, self.bloom * 0.3), BLOOM_GOLD);
        }
        surface.restore();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PoseFilter: exponential smoothing of the bouquet pose
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct PoseFilter {
    factor: f32,
    state:  Option<BouquetPose>,
}

impl PoseFilter {
    pub fn new(factor: f32) -> Self {
        PoseFilter { factor, state: None }
    }

    /// The first target is taken as-is; later ones are approached by
    /// `factor` per call.
    pub fn follow(&mut self, target: BouquetPose) -> BouquetPose {
        let k = self.factor;
        let next = match self.state {
            None => target,
            Some(s) => BouquetPose {
                top:    Point::new(lerp(s.top.x, target.top.x, k), lerp(s.top.y, target.top.y, k)),
                bottom: Point::new(lerp(s.bottom.x, target.bottom.x, k), lerp(s.bottom.y, target.bottom.y, k)),
                angle:  lerp(s.angle, target.angle, k),
            },
        };
        self.state = Some(next);
        next
    }

    pub fn value(&self) -> Option<BouquetPose> {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FlowerGarden
// ════════════════════════════════════════════════════════════════════════════

/// Bouquet animator for flower mode.
#[derive(Clone, Debug)]
pub struct FlowerGarden<R: Rng = ChaCha8Rng> {
    flowers:     Vec<Flower>,
    stems:       Vec<GroundStem>,
    frame_count: u32,
    filter:      PoseFilter,
    rng:         R,
}

impl FlowerGarden<ChaCha8Rng> {
    /// Reproducible garden: the same seed grows the same bouquet.
    pub fn seeded(seed: u64) -> Self {
        FlowerGarden::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> FlowerGarden<R> {
    pub fn new(rng: R) -> Self {
        FlowerGarden {
            flowers:     Vec::with_capacity(MAX_FLOWERS),
            stems:       Vec::with_capacity(MAX_STEMS),
            frame_count: 0,
            filter:      PoseFilter::new(SMOOTHING),
            rng,
        }
    }

    /// Drop every shape and forget the smoothed pose.  The generator keeps
    /// its position.
    pub fn reset(&mut self) {
        self.flowers.clear();
        self.stems.clear();
        self.frame_count = 0;
        self.filter.reset();
    }

    /// Advance one frame.  `None` means no fist this frame.
    pub fn update(&mut self, pose: Option<BouquetPose>) {
        let Some(target) = pose else {
            self.reset();
            return;
        };
        self.filter.follow(target);

        self.frame_count = if self.frame_count >= FRAME_WRAP {
            self.frame_count - FRAME_WRAP + 1
        } else {
            self.frame_count + 1
        };
        if self.frame_count % PLANT_EVERY == 0 {
            if self.flowers.len() < MAX_FLOWERS {
                self.flowers.push(Flower::sprout(&mut self.rng));
            }
            if self.stems.len() < MAX_STEMS {
                self.stems.push(GroundStem::sprout(&mut self.rng));
            }
        }

        self.stems.iter_mut().for_each(GroundStem::grow);
        self.flowers.iter_mut().for_each(Flower::grow);
        self.flowers.sort_by(|a, b| b.stem_height.total_cmp(&a.stem_height));
    }

    /// Ground stems from the wrist, then flowers tallest first.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let Some(pose) = self.filter.value() else { return };
        for stem in &self.stems {
            stem.draw(surface, pose.bottom, pose.angle);
        }
        for flower in &self.flowers {
            flower.draw(surface, pose.top, pose.angle);
        }
    }

    pub fn flowers(&self)     -> &[Flower]            { &self.flowers }
    pub fn stems(&self)       -> &[GroundStem]        { &self.stems }
    pub fn frame_count(&self) -> u32                  { self.frame_count }
    pub fn smoothed(&self)    -> Option<BouquetPose>  { self.filter.value() }

    pub fn is_empty(&self) -> bool {
        self.flowers.is_empty() && self.stems.is_empty() && self.filter.value().is_none()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
