/// Fan curve constants. Fixed at build time; `Default` is the only curve
/// the daemon ever uses.
#[derive(Debug, Clone)]
pub struct FanCurve {
    /// Lowest level ever written to the fan controller.
    pub min_speed: u8,

    /// Highest level accepted by the fan controller.
    pub max_speed: u8,

    /// Level changes smaller than this are not written (hysteresis band).
    pub threshold_speed: u8,

    /// At or below this (°C), with every sensor readable, the fan sits at
    /// `min_speed`.
    pub temperature_min_c: i32,

    /// Zero point of the ramp (°C). Must be below `temperature_max_c`.
    pub temperature_target_c: i32,

    /// Full-ramp point (°C).
    pub temperature_max_c: i32,
}

impl FanCurve {
    /// Width of the usable fan range.
    pub fn speed_range(&self) -> u8 {
        self.max_speed - self.min_speed
    }

    /// Degrees between the ramp's zero point and its full point.
    pub fn ramp_span_c(&self) -> i32 {
        self.temperature_max_c - self.temperature_target_c
    }
}

impl Default for FanCurve {
    fn default() -> Self {
        Self {
            min_speed: 58,
            max_speed: 255,
            threshold_speed: 4,
            temperature_min_c: 40,
            temperature_target_c: 56,
            temperature_max_c: 70,
        }
    }
}
