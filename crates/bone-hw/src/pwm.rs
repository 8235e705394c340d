//! PWM channel driver.
//!
//! Applies a frequency and duty ratio to an exported, running channel under
//! `/sys/class/pwm/pwm<N>` with the least disruptive sequence the kernel
//! accepts:
//!
//! ```text
//! frequency changed:   run=0 → duty_ns=0 → period_ns=P → run=1 → duty_ns=D
//! frequency unchanged:                                           duty_ns=D
//! ```
//!
//! Duty is zeroed before the period changes because the kernel refuses a
//! period shorter than the current duty. If the kernel refuses the new period
//! anyway (`EINVAL`/`EBUSY`), the driver reads back the period actually in
//! effect, restarts the channel at that period and reports the substitution
//! in [`PwmUpdate::fallback`]. Any other failure aborts the sequence and the
//! channel stays as last written.
//!
//! # Concurrency
//!
//! The driver owns a [`PwmChannelRegistry`]. Each channel's state sits
//! behind its own mutex which is held for the whole sequence, so two callers
//! on one channel are serialized while different channels proceed
//! independently.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use platform::{is_rejected_write, DutyRatio, FrequencyHz, PeriodNs, Sysfs};

use crate::attr;
use crate::error::{HwError, ModeResult};

const RUN: &str = "run";
const PERIOD_NS: &str = "period_ns";
const DUTY_NS: &str = "duty_ns";

/// Per-channel record kept by the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct PwmChannelState {
    /// Channel directory, `/sys/class/pwm/pwm<N>`.
    pub path: PathBuf,
    /// Frequency whose period was last written successfully; `None` until
    /// then, and again while a reconfiguration is in flight.
    pub frequency: Option<FrequencyHz>,
}

/// Channel name → state, one lock per channel.
#[derive(Debug, Default)]
pub struct PwmChannelRegistry {
    channels: Mutex<BTreeMap<String, Arc<Mutex<PwmChannelState>>>>,
}

impl PwmChannelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, BTreeMap<String, Arc<Mutex<PwmChannelState>>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the directory of `channel`.
    ///
    /// Re-registering the same path keeps the cached frequency; a different
    /// path starts from an unset frequency.
    pub fn register(&self, channel: &str, path: PathBuf) {
        let mut map = self.map();
        if let Some(entry) = map.get(channel) {
            let mut state = lock_channel(entry);
            if state.path != path {
                *state = PwmChannelState {
                    path,
                    frequency: None,
                };
            }
            return;
        }
        map.insert(
            channel.to_owned(),
            Arc::new(Mutex::new(PwmChannelState {
                path,
                frequency: None,
            })),
        );
    }

    /// Exclusive handle on a channel's state.
    fn entry(&self, channel: &str) -> Option<Arc<Mutex<PwmChannelState>>> {
        self.map().get(channel).cloned()
    }

    /// Copy of a channel's state.
    pub fn snapshot(&self, channel: &str) -> Option<PwmChannelState> {
        self.entry(channel).map(|entry| lock_channel(&entry).clone())
    }

    /// Names of all registered channels.
    pub fn channels(&self) -> Vec<String> {
        self.map().keys().cloned().collect()
    }
}

fn lock_channel(entry: &Mutex<PwmChannelState>) -> MutexGuard<'_, PwmChannelState> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The kernel refused a period and an older one stayed in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodFallback {
    /// Period that was asked for.
    pub requested: PeriodNs,
    /// Period read back and used instead.
    pub applied: PeriodNs,
    /// The kernel's refusal.
    pub reason: String,
}

/// Outcome of [`PwmDriver::write_freq_and_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct PwmUpdate {
    /// Period in effect after the call.
    pub period: PeriodNs,
    /// Duty written, `<= period`.
    pub duty_ns: u64,
    /// Frequency now cached for the channel.
    pub frequency: Option<FrequencyHz>,
    /// Whether the stop/period/restart sequence ran.
    pub reconfigured: bool,
    /// Set when the requested period was refused.
    pub fallback: Option<PeriodFallback>,
}

/// Frequency and duty read back from a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmReading {
    /// `1e9 / period_ns`.
    pub frequency: FrequencyHz,
    /// `duty_ns / period_ns`.
    pub duty_ratio: f64,
}

/// Drives exported PWM channels.
#[derive(Debug)]
pub struct PwmDriver<S> {
    sysfs: S,
    channels: PwmChannelRegistry,
}

impl<S: Sysfs> PwmDriver<S> {
    /// Create a driver with an empty channel registry.
    pub fn new(sysfs: S) -> Self {
        Self {
            sysfs,
            channels: PwmChannelRegistry::new(),
        }
    }

    /// The channel registry.
    pub fn channels(&self) -> &PwmChannelRegistry {
        &self.channels
    }

    /// Record where `channel` lives. Called by the pin mode controller once
    /// the channel is exported and running.
    pub fn register_channel(&self, channel: &str, path: PathBuf) {
        tracing::debug!(channel, path = %path.display(), "PWM channel registered");
        self.channels.register(channel, path);
    }

    /// Frequency currently cached for `channel`.
    pub fn cached_frequency(&self, channel: &str) -> Option<FrequencyHz> {
        self.channels.snapshot(channel).and_then(|s| s.frequency)
    }

    /// Apply `freq` and `duty` to `channel`.
    ///
    /// # Errors
    ///
    /// [`HwError::ChannelNotConfigured`] if the channel was never registered;
    /// [`HwError::Io`] for any write failure other than a refused period;
    /// [`HwError::Parse`] if the period read back after a refusal is not a
    /// number. On error nothing new is cached.
    pub fn write_freq_and_value(
        &self,
        channel: &str,
        freq: FrequencyHz,
        duty: DutyRatio,
    ) -> ModeResult<PwmUpdate> {
        let entry = self
            .channels
            .entry(channel)
            .ok_or_else(|| HwError::ChannelNotConfigured(channel.to_owned()))?;
        let mut state = lock_channel(&entry);
        let path = state.path.clone();
        let target = PeriodNs::from_frequency(freq);

        let mut fallback = None;
        let reconfigured = state.frequency != Some(freq);
        let period = if reconfigured {
            // Until the sequence completes the kernel's period is unknown.
            state.frequency = None;
            let (period, refused) = self.reconfigure(channel, &path, target)?;
            fallback = refused;
            period
        } else {
            target
        };

        let duty_ns = period.duty_ns(duty);
        tracing::debug!(channel, duty_ns, "updating PWM duty");
        attr::write(&self.sysfs, &path.join(DUTY_NS), &format!("{duty_ns}\n"))?;

        if reconfigured {
            state.frequency = match &fallback {
                Some(f) => FrequencyHz::from_period(f.applied),
                None => Some(freq),
            };
        }

        Ok(PwmUpdate {
            period,
            duty_ns,
            frequency: state.frequency,
            reconfigured,
            fallback,
        })
    }

    /// Stop, zero duty, write the period and restart.
    fn reconfigure(
        &self,
        channel: &str,
        path: &Path,
        target: PeriodNs,
    ) -> ModeResult<(PeriodNs, Option<PeriodFallback>)> {
        tracing::debug!(channel, "stopping PWM");
        attr::write(&self.sysfs, &path.join(RUN), "0\n")?;
        tracing::debug!(channel, "setting duty to 0");
        attr::write(&self.sysfs, &path.join(DUTY_NS), "0\n")?;

        let period_path = path.join(PERIOD_NS);
        tracing::debug!(channel, period_ns = target.get(), "updating PWM period");
        let (period, fallback) = match self.sysfs.write(&period_path, &format!("{}\n", target.get())) {
            Ok(()) => (target, None),
            Err(err) if is_rejected_write(&err) => {
                let raw = attr::read(&self.sysfs, &period_path)?;
                let applied = PeriodNs::parse(&raw).ok_or_else(|| HwError::parse(&period_path, &raw))?;
                tracing::info!(
                    channel,
                    requested = target.get(),
                    applied = applied.get(),
                    %err,
                    "unable to update PWM period, keeping current period"
                );
                let fallback = PeriodFallback {
                    requested: target,
                    applied,
                    reason: err.to_string(),
                };
                (applied, Some(fallback))
            }
            Err(err) => return Err(HwError::io(&period_path, err)),
        };

        tracing::debug!(channel, "starting PWM");
        attr::write(&self.sysfs, &path.join(RUN), "1\n")?;
        Ok((period, fallback))
    }

    /// Read the frequency and duty ratio back from the kernel.
    ///
    /// Best effort: `None` if the channel is unknown, an attribute cannot be
    /// read or parsed, or the period is zero.
    pub fn read_freq_and_value(&self, channel: &str) -> Option<PwmReading> {
        let path = self.channels.snapshot(channel)?.path;
        let period = PeriodNs::parse(&attr::read_opt(&self.sysfs, &path.join(PERIOD_NS))?)?;
        let duty = PeriodNs::parse(&attr::read_opt(&self.sysfs, &path.join(DUTY_NS))?)?;
        let frequency = FrequencyHz::from_period(period)?;
        #[allow(clippy::cast_precision_loss)]
        let duty_ratio = duty.get() as f64 / period.get() as f64;
        Some(PwmReading {
            frequency,
            duty_ratio,
        })
    }
}
