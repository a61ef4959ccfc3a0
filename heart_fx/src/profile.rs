//! Device profiles: how often inference may run on a given class of machine.

use std::time::Duration;

use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum DeviceProfile {
    Mobile,
    OnboardGpu,
    #[default]
    Standard,
    HighPerformance,
    LowSpec,
}

impl DeviceProfile {
    /// Minimum time between inference requests.
    pub fn inference_interval(self) -> Duration {
        Duration::from_millis(match self {
            DeviceProfile::Mobile          => 60,
            DeviceProfile::OnboardGpu      => 50,
            DeviceProfile::Standard        => 40,
            DeviceProfile::HighPerformance => 25,
            DeviceProfile::LowSpec         => 60,
        })
    }

    pub fn interval_ms(self) -> f64 {
        self.inference_interval().as_secs_f64() * 1000.0
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceProfile::Mobile          => "Mobile device",
            DeviceProfile::OnboardGpu      => "Onboard GPU",
            DeviceProfile::Standard        => "Standard",
            DeviceProfile::HighPerformance => "High performance",
            DeviceProfile::LowSpec         => "Low-spec (software rendering)",
        }
    }

    /// Ideal camera resolution `(width, height)`.
    pub fn video_resolution(self) -> (u32, u32) {
        match self {
            DeviceProfile::Mobile                                  => (480, 640),
            DeviceProfile::OnboardGpu | DeviceProfile::Standard    => (640, 480),
            DeviceProfile::HighPerformance | DeviceProfile::LowSpec => (1280, 720),
        }
    }
}
