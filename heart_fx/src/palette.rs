//! Packed `0xAARRGGBB` colors used by the effects.

/// Packed ARGB, alpha in the top byte.
pub type Color = u32;

pub const HEART_PINK:     Color = 0xFFEC4899;
/// `rgba(236, 72, 153, 0.6)`
pub const HEART_GLOW:     Color = 0x99EC4899;
/// `rgba(236, 72, 153, 0.5)`
pub const RIPPLE_GLOW:    Color = 0x80EC4899;
pub const STEM_GREEN:     Color = 0xFF88C999;
pub const BLOOM_GOLD:     Color = 0xFFFFD700;
pub const SKELETON_PINK:  Color = 0xFFFF69B4;
pub const WHITE:          Color = 0xFFFFFFFF;

/// Pastel petal colors; each flower draws one at spawn.
pub const FLOWER_PALETTE: [Color; 9] = [
    0xFFFFB7B2, 0xFFFF9AA2, 0xFFFFDAC1,
    0xFFE2F0CB, 0xFFB5EAD7, 0xFFC7CEEA,
    0xFFFFF5BA, 0xFFFF99CC, 0xFFFFCC99,
];

pub fn alpha(c: Color) -> u8 {
    (c >> 24) as u8
}

/// Replace the alpha byte.
pub fn with_alpha(c: Color, a: u8) -> Color {
    (c & 0x00FF_FFFF) | ((a as u32) << 24)
}

/// Linear blend of the colour channels.  `t` = 0.0 → all `a`, 1.0 → all `b`.
/// The result is opaque.
pub fn blend(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}
