//! Software-rendered window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  effect canvas (skeleton + heart / bouquet)  │
//! │                                              │
//! │          ┌──────────────────────┐            │
//! │          │  reward card (modal) │            │
//! │          └──────────────────────┘            │
//! │                                              │
//! │  status bar                                  │
//! │  key legend                                  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The effects draw into the [`Raster`] through the `Surface` trait; the
//! status bar and reward card are painted on top with the raster's flat
//! helpers, then the buffer is pushed to the window.

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use heart_fx::palette::{blend, HEART_PINK, WHITE};
use heart_fx::Surface;
use heart_gesture::{GestureMode, Point};

use crate::raster::Raster;
use crate::reward::RewardCard;
use crate::sim::{SimInput, SimPose};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:     u32 = 0xFF1A1A2E;
const STATUS_BG:    u32 = 0xC00F3460;
const STATUS_H:     usize = 34;
const CARD_W:       usize = 420;
const CARD_H:       usize = 220;
const CARD_BG:      u32 = 0xFFFFF0F5;
const CARD_SHADE:   u32 = 0x99000000;
const TEXT_COLOR:   u32 = 0xFFEEEEEE;
const LEGEND_COLOR: u32 = 0xFF888888;
const DETECTED_ON:  u32 = 0xFF7CFC00;
const DETECTED_OFF: u32 = 0xFF666666;

// ════════════════════════════════════════════════════════════════════════════
// Commands back to the app
// ════════════════════════════════════════════════════════════════════════════

/// Window input that concerns the app rather than the hand simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    SetMode(GestureMode),
    DismissReward,
    ToggleSkeleton,
    Quit,
}

/// What the status bar shows.
pub struct StatusLine<'a> {
    pub mode:     GestureMode,
    pub detected: bool,
    pub text:     &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:      Window,
    raster:      Raster,
    sim_tx:      Sender<SimInput>,
    last_cursor: Option<(f32, f32)>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>, width: usize, height: usize) -> Result<Self, String> {
        let mut window = Window::new(
            "Leap Heart: Gesture Hearts & Flowers",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            raster: Raster::new(width, height, BG_COLOR),
            sim_tx,
            last_cursor: None,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// The effect canvas.
    pub fn surface(&mut self) -> &mut Raster {
        &mut self.raster
    }

    /// Forward simulator keys and the pointer; return app commands.
    pub fn poll_input(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if !self.window.is_open() {
            commands.push(Command::Quit);
            return commands;
        }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) {
            commands.push(Command::Quit);
        }
        if pressed(Key::Enter) || pressed(Key::Escape) {
            commands.push(Command::DismissReward);
        }
        if pressed(Key::K) {
            commands.push(Command::ToggleSkeleton);
        }
        for (key, mode) in [
            (Key::Key1, GestureMode::Heart),
            (Key::Key2, GestureMode::Mini),
            (Key::Key3, GestureMode::Flower),
        ] {
            if pressed(key) {
                commands.push(Command::SetMode(mode));
            }
        }

        let poses = [
            (Key::H, SimPose::Heart),
            (Key::P, SimPose::Pinch),
            (Key::F, SimPose::Fist),
            (Key::O, SimPose::Open),
            (Key::N, SimPose::Away),
        ];
        let chosen: Vec<SimPose> = poses.iter().filter(|(k, _)| pressed(*k)).map(|(_, p)| *p).collect();
        for pose in chosen {
            let _ = self.sim_tx.send(SimInput::Pose(pose));
        }

        if let Some(pos) = self.window.get_mouse_pos(MouseMode::Clamp) {
            if self.last_cursor != Some(pos) {
                self.last_cursor = Some(pos);
                let (w, h) = (self.raster.width() as f32, self.raster.height() as f32);
                let _ = self.sim_tx.send(SimInput::Pointer(Point::new(pos.0 / w, pos.1 / h)));
            }
        }

        commands
    }

    /// Paint the overlays onto the canvas and show the frame.
    pub fn present(&mut self, status: &StatusLine<'_>, reward: Option<&RewardCard>, now_ms: f64) {
        self.draw_status(status);
        if let Some(card) = reward {
            self.draw_reward(card, now_ms);
        }
        let (w, h) = (self.raster.width(), self.raster.height());
        self.window.update_with_buffer(self.raster.pixels(), w, h).ok();
    }

    // ── Status bar ────────────────────────────────────────────────────────

    fn draw_status(&mut self, status: &StatusLine<'_>) {
        let (w, h) = (self.raster.width(), self.raster.height());
        let top = h.saturating_sub(STATUS_H) as i32;
        let r = &mut self.raster;

        r.fill_rect(0, top, w, STATUS_H, STATUS_BG);

        let lamp = if status.detected { DETECTED_ON } else { DETECTED_OFF };
        r.fill_rect(10, top + 6, 8, 8, lamp);
        let mode = format!("MODE {}", status.mode).to_uppercase();
        r.draw_text(&mode, 24, top + 6, 2, TEXT_COLOR);
        let x = 24 + Raster::text_width(&mode, 2) as i32 + 16;
        r.draw_text(status.text, x, top + 8, 1, TEXT_COLOR);

        r.draw_text(
            "1/2/3=mode  H=heart  P=pinch  F=fist  O=open  N=none  K=skeleton  Enter=close  Q=quit",
            10, top + 24, 1, LEGEND_COLOR,
        );
    }

    // ── Reward card ───────────────────────────────────────────────────────

    fn draw_reward(&mut self, card: &RewardCard, now_ms: f64) {
        let (w, h) = (self.raster.width(), self.raster.height());
        let reveal = card.reveal(now_ms);
        let r = &mut self.raster;

        r.fill_rect(0, 0, w, h, CARD_SHADE);

        let cw = ((CARD_W as f32) * (0.6 + 0.4 * reveal)) as usize;
        let ch = ((CARD_H as f32) * (0.6 + 0.4 * reveal)) as usize;
        let x = (w.saturating_sub(cw) / 2) as i32;
        let y = (h.saturating_sub(ch) / 2) as i32;
        r.fill_rect(x, y, cw, ch, CARD_BG);
        r.draw_border(x, y, cw, ch, HEART_PINK);
        r.draw_border(x + 1, y + 1, cw.saturating_sub(2), ch.saturating_sub(2), blend(HEART_PINK, WHITE, 0.5));

        if reveal < 1.0 {
            return;
        }

        let center = |text: &str, scale: usize| x + (cw.saturating_sub(Raster::text_width(text, scale)) / 2) as i32;

        let heading = card.heading();
        r.draw_text(heading, center(heading, 3), y + 28, 3, HEART_PINK);

        let mut heart = heart_gesture::geometry::centered_heart(
            Point::new(x as f32 + cw as f32 / 2.0, y as f32 + 100.0),
            48.0,
        );
        r.fill(&heart, HEART_PINK);
        heart = heart_gesture::geometry::centered_heart(
            Point::new(x as f32 + cw as f32 / 2.0, y as f32 + 100.0),
            24.0,
        );
        r.fill(&heart, blend(HEART_PINK, WHITE, 0.6));

        let message = card.message();
        r.draw_text(message, center(message, 2), y + 140, 2, 0xFF444444);

        let url = shorten(card.image_url, (cw - 20) / 4);
        r.draw_text(&url, center(&url, 1), y + 172, 1, 0xFF888888);
        r.draw_text("press enter to close", center("press enter to close", 1), y + 196, 1, 0xFFAAAAAA);
    }
}

/// Keep at most `max` characters, eliding the middle.
fn shorten(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max || max < 5 {
        return s.chars().take(max.max(1)).collect();
    }
    let keep = (max - 3) / 2;
    let head: String = s.chars().take(keep).collect();
    let tail: String = s.chars().skip(n - keep).collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::shorten;

    #[test]
    fn shorten_elides_middle() {
        assert_eq!(shorten("abcdef", 10), "abcdef");
        let s = shorten("https://example.com/very/long/path/giphy.gif", 21);
        assert!(s.len() <= 21);
        assert!(s.starts_with("https://") && s.ends_with("giphy.gif"));
    }
}
