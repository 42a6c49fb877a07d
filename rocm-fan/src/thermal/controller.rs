use super::config::FanCurve;
use super::state::CoolingRegime;
use crate::sensor::SensorSnapshot;

/// What to do with the fan this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedDecision {
    /// Write this level. Always within the curve's `[min_speed, max_speed]`.
    Apply(u8),

    /// Current level is within the hysteresis band of the target.
    NoChange,
}

/// Intermediate values of the ramp branch, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampPoint {
    pub temperature_c: i32,
    pub diff_c: i32,
    pub ratio: f64,
}

/// Full result of evaluating one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub regime: CoolingRegime,

    /// Ramp inputs when `regime` is [`CoolingRegime::Ramp`].
    pub ramp: Option<RampPoint>,

    /// Target level before hysteresis.
    pub candidate: u8,

    pub decision: SpeedDecision,
}

/// Maps sensor snapshots to fan levels.
///
/// Stateless: the current fan level comes from the snapshot, never from a
/// previous decision, so nothing drifts when a write fails or someone else
/// touches the fan.
///
/// The ramp is deliberately inverted relative to a conventional cooling
/// curve: the level is highest at or below `temperature_target_c` and falls
/// to `min_speed` at `temperature_max_c`. Above `temperature_min_c` the drop
/// is `floor(|speed_range * ratio|)`, so readings below the target also move
/// away from `max_speed`.
#[derive(Debug, Clone, Default)]
pub struct SpeedController {
    curve: FanCurve,
}

impl SpeedController {
    pub fn new(curve: FanCurve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> &FanCurve {
        &self.curve
    }

    /// Decide the fan level for `snapshot`.
    pub fn decide(&self, snapshot: &SensorSnapshot) -> SpeedDecision {
        self.evaluate(snapshot).decision
    }

    /// Decide the fan level and report how the decision was reached.
    pub fn evaluate(&self, snapshot: &SensorSnapshot) -> Evaluation {
        let regime = CoolingRegime::from_snapshot(snapshot, &self.curve);
        let current = snapshot.fan_level;

        let (raw, ramp) = match regime {
            CoolingRegime::FailSafe => (i64::from(self.curve.max_speed), None),
            CoolingRegime::Quiet => (i64::from(self.curve.min_speed), None),
            CoolingRegime::Ramp => {
                let (speed, point) = self.ramp(snapshot.hottest_c());

                // Ramp output never leaves the curve's range, so the band
                // check can short-circuit before clamping.
                if let Ok(speed) = u8::try_from(speed) {
                    if self.within_band(speed, current) {
                        return Evaluation {
                            regime,
                            ramp: Some(point),
                            candidate: speed,
                            decision: SpeedDecision::NoChange,
                        };
                    }
                }

                (speed, Some(point))
            }
        };

        let candidate = self.clamp(raw);
        let decision = if self.within_band(candidate, current) {
            SpeedDecision::NoChange
        } else {
            SpeedDecision::Apply(candidate)
        };

        Evaluation {
            regime,
            ramp,
            candidate,
            decision,
        }
    }

    /// Unclamped ramp level for the hottest reading.
    fn ramp(&self, temperature_c: i32) -> (i64, RampPoint) {
        let span = i64::from(self.curve.ramp_span_c());
        let diff_c = temperature_c - self.curve.temperature_target_c;
        let ratio = f64::from(diff_c) / span as f64;

        // floor(|range * diff / span|) in integers; the operands are
        // non-negative so division truncates toward the floor.
        let drop = i64::from(self.curve.speed_range()) * i64::from(diff_c.unsigned_abs()) / span;
        let speed = (i64::from(self.curve.max_speed) - drop).max(i64::from(self.curve.min_speed));

        (
            speed,
            RampPoint {
                temperature_c,
                diff_c,
                ratio,
            },
        )
    }

    fn clamp(&self, speed: i64) -> u8 {
        let clamped = speed.clamp(
            i64::from(self.curve.min_speed),
            i64::from(self.curve.max_speed),
        );
        clamped as u8
    }

    fn within_band(&self, speed: u8, current: u8) -> bool {
        speed.abs_diff(current) < self.curve.threshold_speed
    }
}
