//! The reward card shown when a heart effect completes.

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const REWARD_HEADING: &str = "Happy Valentine's Day!";
pub const REWARD_MESSAGE: &str = "You are special to me!";

/// Celebratory GIFs, one picked per card.
pub const REWARD_IMAGES: [&str; 3] = [
    "https://media4.giphy.com/media/v1.Y2lkPTc5MGI3NjExNjlxdnZmOWN6cWV5eGVvbjBrams2Z3BqNHYzenFwYTlzbjA1ZHAyZiZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/uKvAWApE3vWL1MAASf/giphy.gif",
    "https://media0.giphy.com/media/v1.Y2lkPTc5MGI3NjExeHlxeHRndWZneGNtZzYxNWVneHN0eWM0eWZyam15Mzl1bHU5N2VsaSZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/XtydbjSSwkC7K2zBTH/giphy.gif",
    "https://media1.giphy.com/media/v1.Y2lkPTc5MGI3NjExMjh0emk4aTUwdmNvc2M5NHkydmJyZmd6MHJvbTFzd3lxdGxhbWllNiZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/Zl7u48zLVFgLpRwq6f/giphy.gif",
];

/// Milliseconds for the card to pop in.
const POP_IN_MS: f64 = 250.0;

#[derive(Clone, Debug, PartialEq)]
pub struct RewardCard {
    pub image_url: &'static str,
    pub opened_at: f64,
}

impl RewardCard {
    pub fn heading(&self) -> &'static str { REWARD_HEADING }
    pub fn message(&self) -> &'static str { REWARD_MESSAGE }

    /// Pop-in progress 0.0–1.0 at `now_ms`.
    pub fn reveal(&self, now_ms: f64) -> f32 {
        ((now_ms - self.opened_at) / POP_IN_MS).clamp(0.0, 1.0) as f32
    }
}

pub struct RewardPicker<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl RewardPicker<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        RewardPicker { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl<R: Rng> RewardPicker<R> {
    pub fn new(rng: R) -> Self {
        RewardPicker { rng }
    }

    /// A card with an image chosen uniformly from [`REWARD_IMAGES`].
    pub fn pick(&mut self, now_ms: f64) -> RewardCard {
        let image_url = REWARD_IMAGES[self.rng.random_range(0..REWARD_IMAGES.len())];
        RewardCard { image_url, opened_at: now_ms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_every_image_eventually() {
        let mut p = RewardPicker::seeded(1);
        let mut seen = [false; 3];
        for i in 0..200 {
            let card = p.pick(i as f64);
            let idx = REWARD_IMAGES.iter().position(|u| *u == card.image_url).unwrap();
            seen[idx] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RewardPicker::seeded(9);
        let mut b = RewardPicker::seeded(9);
        for _ in 0..10 {
            assert_eq!(a.pick(0.0), b.pick(0.0));
        }
    }

    #[test]
    fn reveal_ramps() {
        let card = RewardPicker::seeded(0).pick(1000.0);
        assert_eq!(card.reveal(900.0), 0.0);
        assert_eq!(card.reveal(1125.0), 0.5);
        assert_eq!(card.reveal(5000.0), 1.0);
        assert_eq!(card.heading(), "Happy Valentine's Day!");
    }
}
