//! Property-based tests for PWM period/duty math.
//! Verifies invariants hold for ALL valid inputs, not just fixed examples.

use platform::pwm_types::{DutyRatio, FrequencyHz, PeriodNs};

proptest::proptest! {
    /// Duty never exceeds the period for any ratio the clamp lets through.
    #[test]
    fn duty_never_exceeds_period(period in 0u64..=u64::from(u32::MAX), ratio in -1.0f64..2.0f64) {
        let period = PeriodNs::new(period);
        let duty = period.duty_ns(DutyRatio::new(ratio));
        assert!(duty <= period.get(), "duty {duty} > period {}", period.get());
    }

    /// A full duty ratio always yields exactly the period.
    #[test]
    fn full_duty_is_the_period(period in 0u64..=1_000_000_000u64) {
        let period = PeriodNs::new(period);
        assert_eq!(period.duty_ns(DutyRatio::new(1.0)), period.get());
    }

    /// Higher duty ratio → greater or equal duty (monotone).
    #[test]
    fn duty_is_monotone_in_ratio(period in 1u64..=1_000_000_000u64, a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let period = PeriodNs::new(period);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        assert!(period.duty_ns(DutyRatio::new(lo)) <= period.duty_ns(DutyRatio::new(hi)));
    }

    /// Converting a frequency to a period and back stays within rounding error.
    #[test]
    fn period_round_trip_within_half_ns(hz in 1.0f64..=1_000_000.0f64) {
        let Ok(freq) = FrequencyHz::new(hz) else {
            return Err(proptest::test_runner::TestCaseError::fail(format!("{hz} Hz rejected")));
        };
        let period = PeriodNs::from_frequency(freq);
        let exact = 1.0e9 / hz;
        #[allow(clippy::cast_precision_loss)]
        let err = (period.get() as f64 - exact).abs();
        assert!(err <= 0.5 + f64::EPSILON * exact, "period {} vs exact {exact}", period.get());
    }

    /// DutyRatio::new never panics and always lands in 0..=1.
    #[test]
    fn duty_ratio_clamps_everything(ratio in proptest::num::f64::ANY) {
        let r = DutyRatio::new(ratio).get();
        assert!((0.0..=1.0).contains(&r));
    }
}
