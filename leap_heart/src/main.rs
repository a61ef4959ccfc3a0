//! leap_heart: interactive entry point.

use std::io::{self, Write};

use clap::Parser;
use env_logger::{Builder, Env};
use strum::IntoEnumIterator;

use heart_fx::{DeviceProfile, DriverConfig};
use heart_gesture::GestureMode;
use leap_heart::app::{mode_hint, run, AppConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Effect to start in: heart, mini, or flower
    #[arg(long)]
    mode: Option<GestureMode>,

    /// Device profile that sets the inference interval
    #[arg(long)]
    profile: Option<DeviceProfile>,

    /// Inference interval in milliseconds, overriding the profile
    #[arg(long)]
    interval_ms: Option<f64>,

    /// Seed for flower shapes, reward picks, and simulated tremor
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 640)]
    width: usize,

    #[arg(long, default_value_t = 480)]
    height: usize,

    /// Hide the hand skeleton overlay
    #[arg(long)]
    no_skeleton: bool,

    /// Skip the interactive prompts and use defaults
    #[arg(long)]
    quick: bool,
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Leap Heart: Finger Hearts, Ripples & Bouquets         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Input: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Input: Keyboard/mouse simulation  (use --features leap for hardware)");
    println!();

    let prompt = !args.quick;
    let mode = match args.mode {
        Some(m)           => m,
        None if prompt    => pick_mode(),
        None              => GestureMode::default(),
    };
    let profile = match args.profile {
        Some(p)           => p,
        None if prompt    => pick_profile(),
        None              => DeviceProfile::default(),
    };

    let cfg = AppConfig {
        driver: DriverConfig {
            mode,
            profile,
            interval_override: args.interval_ms,
            show_skeleton:     !args.no_skeleton,
            seed:              args.seed,
            ..DriverConfig::default()
        },
        width:       args.width.max(160),
        height:      args.height.max(120),
        reward_seed: args.seed,
        ..AppConfig::default()
    };

    println!();
    println!("  {} mode, {} ({} ms between inferences)", mode, profile.label(), cfg.driver.interval_ms());
    println!("  Try it: {}", mode_hint(mode));
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn pick_mode() -> GestureMode {
    println!("  Effect:");
    for (i, m) in GestureMode::iter().enumerate() {
        println!("    {}. {:<7} {}", i + 1, m.to_string(), mode_hint(m));
    }
    read_line("  Choice (default 1): ")
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| GestureMode::iter().nth(n.wrapping_sub(1)))
        .unwrap_or_default()
}

fn pick_profile() -> DeviceProfile {
    println!("  Device profile:");
    for (i, p) in DeviceProfile::iter().enumerate() {
        println!("    {}. {:<17} {:>3} ms", i + 1, p.to_string(), p.interval_ms());
    }
    let default_idx = DeviceProfile::iter()
        .position(|p| p == DeviceProfile::default())
        .map_or(1, |i| i + 1);
    read_line(&format!("  Choice (default {}): ", default_idx))
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| DeviceProfile::iter().nth(n.wrapping_sub(1)))
        .unwrap_or_default()
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
