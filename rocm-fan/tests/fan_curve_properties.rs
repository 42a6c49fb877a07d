//! Invariants of the fan curve over arbitrary sensor snapshots.

use proptest::prelude::*;

use rocm_fan::sensor::{SensorSnapshot, Temperature};
use rocm_fan::thermal::{CoolingRegime, FanCurve, SpeedController, SpeedDecision};

fn temperature() -> impl Strategy<Value = Temperature> {
    prop_oneof![
        1 => Just(Temperature::Unreadable),
        8 => (-20i32..=120).prop_map(Temperature::Celsius),
    ]
}

fn readable(range: std::ops::RangeInclusive<i32>) -> impl Strategy<Value = Temperature> {
    range.prop_map(Temperature::Celsius)
}

fn snapshot() -> impl Strategy<Value = SensorSnapshot> {
    (temperature(), temperature(), temperature(), any::<u8>()).prop_map(
        |(edge, junction, memory, fan_level)| SensorSnapshot {
            edge,
            junction,
            memory,
            fan_level,
        },
    )
}

proptest! {
    /// Whatever the readings, a write stays inside the curve's range.
    #[test]
    fn applied_speed_stays_within_curve(snapshot in snapshot()) {
        let controller = SpeedController::default();
        let curve = FanCurve::default();

        if let SpeedDecision::Apply(level) = controller.decide(&snapshot) {
            prop_assert!(level >= curve.min_speed);
            prop_assert!(level <= curve.max_speed);
        }
    }

    /// The candidate is always within range too, even when nothing is written.
    #[test]
    fn candidate_stays_within_curve(snapshot in snapshot()) {
        let curve = FanCurve::default();
        let evaluation = SpeedController::default().evaluate(&snapshot);

        prop_assert!(evaluation.candidate >= curve.min_speed);
        prop_assert!(evaluation.candidate <= curve.max_speed);
    }

    /// Any negative reading forces max speed, regardless of the others.
    #[test]
    fn negative_reading_fails_safe(
        bad in prop_oneof![Just(Temperature::Unreadable), readable(-40..=-1)],
        other_a in temperature(),
        other_b in temperature(),
        slot in 0usize..3,
        fan_level in any::<u8>(),
    ) {
        let mut temps = [other_a, other_b, other_a];
        temps[slot] = bad;
        let snapshot = SensorSnapshot {
            edge: temps[0],
            junction: temps[1],
            memory: temps[2],
            fan_level,
        };

        let evaluation = SpeedController::default().evaluate(&snapshot);

        prop_assert_eq!(evaluation.regime, CoolingRegime::FailSafe);
        prop_assert_eq!(evaluation.candidate, FanCurve::default().max_speed);
    }

    /// Cool, readable sensors pin the fan to its minimum.
    #[test]
    fn cool_readable_sensors_use_min_speed(
        edge in readable(0..=40),
        junction in readable(0..=40),
        memory in readable(0..=40),
        fan_level in any::<u8>(),
    ) {
        let snapshot = SensorSnapshot { edge, junction, memory, fan_level };

        let evaluation = SpeedController::default().evaluate(&snapshot);

        prop_assert_eq!(evaluation.regime, CoolingRegime::Quiet);
        prop_assert_eq!(evaluation.candidate, FanCurve::default().min_speed);
    }

    /// At the target temperature the ramp yields max speed; at the max
    /// temperature it yields min speed.
    #[test]
    fn ramp_end_points(
        others in (readable(0..=56), readable(0..=56)),
        fan_level in any::<u8>(),
    ) {
        let controller = SpeedController::default();
        let curve = FanCurve::default();

        let at_target = SensorSnapshot {
            edge: Temperature::Celsius(curve.temperature_target_c),
            junction: others.0,
            memory: others.1,
            fan_level,
        };
        prop_assert_eq!(controller.evaluate(&at_target).candidate, curve.max_speed);

        let at_max = SensorSnapshot {
            edge: others.0,
            junction: Temperature::Celsius(curve.temperature_max_c),
            memory: others.1,
            fan_level,
        };
        prop_assert_eq!(controller.evaluate(&at_max).candidate, curve.min_speed);
    }

    /// Re-evaluating with the fan already at the candidate never writes.
    #[test]
    fn settled_fan_is_left_alone(snapshot in snapshot(), offset in -3i16..=3) {
        let controller = SpeedController::default();
        let candidate = controller.evaluate(&snapshot).candidate;
        let settled = (i16::from(candidate) + offset).clamp(0, 255) as u8;

        let decision = controller.decide(&SensorSnapshot { fan_level: settled, ..snapshot });

        prop_assert_eq!(decision, SpeedDecision::NoChange);
    }
}

#[test]
fn reference_scenarios() {
    let controller = SpeedController::default();
    let snapshot = |edge, junction, memory, fan_level| SensorSnapshot {
        edge,
        junction,
        memory,
        fan_level,
    };
    let c = Temperature::Celsius;

    assert_eq!(
        controller.decide(&snapshot(c(50), c(50), c(50), 100)),
        SpeedDecision::Apply(171)
    );
    assert_eq!(
        controller.decide(&snapshot(c(30), c(30), c(30), 58)),
        SpeedDecision::NoChange
    );
    assert_eq!(
        controller.decide(&snapshot(Temperature::Unreadable, c(45), c(40), 200)),
        SpeedDecision::Apply(255)
    );
    assert_eq!(
        controller.decide(&snapshot(c(70), c(65), c(60), 59)),
        SpeedDecision::NoChange
    );
}
