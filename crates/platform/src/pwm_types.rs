//! PWM domain newtypes.
//!
//! These wrappers carry the invariants the kernel PWM interface relies on:
//! - `FrequencyHz`: finite and strictly positive
//! - `DutyRatio`: clamped to 0.0–1.0
//! - `PeriodNs`: the integer nanosecond period the kernel stores, with
//!   [`PeriodNs::duty_ns`] guaranteeing `duty_ns <= period_ns`

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is outside its valid range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("{value} is outside {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: f64,
    /// The inclusive minimum allowed value.
    pub min: f64,
    /// The inclusive maximum allowed value.
    pub max: f64,
}

const NS_PER_SECOND: f64 = 1.0e9;

// ── FrequencyHz ──────────────────────────────────────────────────────────────

/// PWM output frequency in Hz.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct FrequencyHz(f64);

impl FrequencyHz {
    /// Create a `FrequencyHz`, rejecting zero, negative and non-finite input.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz` is not a finite value above 0.
    pub fn new(hz: f64) -> Result<Self, OutOfRangeError> {
        if hz.is_finite() && hz > 0.0 {
            Ok(Self(hz))
        } else {
            Err(OutOfRangeError {
                value: hz,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            })
        }
    }

    /// Frequency implied by a period the kernel reports.
    ///
    /// Returns `None` for a zero period (channel never configured).
    #[must_use]
    pub fn from_period(period: PeriodNs) -> Option<Self> {
        if period.get() == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)] // periods are far below 2^52 ns
        let ns = period.get() as f64;
        Self::new(NS_PER_SECOND / ns).ok()
    }

    /// Return the frequency in Hz.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl core::fmt::Display for FrequencyHz {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}Hz", self.0)
    }
}

// ── DutyRatio ────────────────────────────────────────────────────────────────

/// High-time fraction of a PWM period, clamped to 0.0–1.0.
///
/// Construct with [`DutyRatio::new`] (clamping) or [`DutyRatio::try_new`]
/// (fallible, strict).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct DutyRatio(f64);

impl DutyRatio {
    /// Create a `DutyRatio`, clamping into 0.0–1.0. NaN becomes 0.0.
    #[must_use]
    pub fn new(ratio: f64) -> Self {
        if ratio.is_nan() {
            Self(0.0)
        } else {
            Self(ratio.clamp(0.0, 1.0))
        }
    }

    /// Create a `DutyRatio`, returning an error outside 0.0–1.0.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `ratio` is NaN or outside 0.0–1.0.
    pub fn try_new(ratio: f64) -> Result<Self, OutOfRangeError> {
        if (0.0..=1.0).contains(&ratio) {
            Ok(Self(ratio))
        } else {
            Err(OutOfRangeError {
                value: ratio,
                min: 0.0,
                max: 1.0,
            })
        }
    }

    /// Return the ratio.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

// ── PeriodNs ─────────────────────────────────────────────────────────────────

/// PWM period in integer nanoseconds, as stored in `period_ns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PeriodNs(u64);

impl PeriodNs {
    /// Wrap a raw nanosecond value.
    #[must_use]
    pub fn new(ns: u64) -> Self {
        Self(ns)
    }

    /// `round(1e9 / freq)`, saturating at `u64::MAX` for sub-nanohertz input.
    #[must_use]
    pub fn from_frequency(freq: FrequencyHz) -> Self {
        let ns = (NS_PER_SECOND / freq.get()).round();
        // freq > 0 and finite, so ns is positive; `as` saturates
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ns = ns as u64;
        Self(ns)
    }

    /// Parse a `period_ns` attribute (`"1000000\n"`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok().map(Self)
    }

    /// `round(period * ratio)`; never exceeds the period.
    #[must_use]
    pub fn duty_ns(self, ratio: DutyRatio) -> u64 {
        #[allow(clippy::cast_precision_loss)]
        let duty = (self.0 as f64 * ratio.get()).round();
        // ratio is in 0..=1; min() absorbs float slack above the period
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let duty = duty as u64;
        duty.min(self.0)
    }

    /// Return the period in nanoseconds.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for PeriodNs {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ns", self.0)
    }
}
