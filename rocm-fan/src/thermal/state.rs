use super::config::FanCurve;
use crate::sensor::SensorSnapshot;

/// Which branch of the fan curve a snapshot falls into.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CoolingRegime {
    /// At least one sensor reads below zero (unreadable). Fan goes to max.
    FailSafe,

    /// Hottest sensor is above `temperature_min_c`. Speed follows the ramp.
    Ramp,

    /// Every sensor is readable and at or below `temperature_min_c`.
    Quiet,
}

impl CoolingRegime {
    /// Classify a snapshot.
    ///
    /// The fail-safe test looks at the coldest reading, not the hottest, so
    /// one unreadable sensor wins even when another reports a high value.
    pub fn from_snapshot(snapshot: &SensorSnapshot, curve: &FanCurve) -> Self {
        if snapshot.coldest_c() < 0 {
            CoolingRegime::FailSafe
        } else if snapshot.hottest_c() > curve.temperature_min_c {
            CoolingRegime::Ramp
        } else {
            CoolingRegime::Quiet
        }
    }
}
