//! Pin mode controller.
//!
//! Routes a header pin to GPIO or PWM by writing the pin's mux helper
//! (`<ocp>/<key>_pinmux.*/state`) and preparing the peripheral behind it:
//!
//! | `pin_data & 0b111` | template | mux `state` | peripheral |
//! |--------------------|----------|-------------|------------|
//! | `0b111`            | any      | `gpio`      | value file recorded |
//! | other              | `bspwm`  | `pwm`       | channel exported, `run=1`, registered |
//! | other              | other    | untouched   | `UnknownModeTemplate` |
//!
//! Failures are not rolled back; repeating the call is idempotent.

use std::path::{Path, PathBuf};

use platform::config::{PINCTRL_PINS, PINMUX_BASE, PWM_CLASS};
use platform::{locate, PinDescriptor, Sysfs};

use crate::attr;
use crate::error::{HwError, ModeResult};
use crate::gpio::{value_path, GpioController};
use crate::pwm::PwmDriver;

/// Template name selecting the PWM overlay scheme.
pub const PWM_TEMPLATE: &str = "bspwm";

/// Mux mode bits selecting the GPIO function.
pub const GPIO_MODE: u32 = 0b111;

/// What a pin was routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinMode {
    /// Digital I/O through `value_file`.
    Gpio {
        /// `/sys/class/gpio/gpio<N>/value`.
        value_file: PathBuf,
    },
    /// PWM output on `channel`.
    Pwm {
        /// Channel name.
        channel: String,
        /// `/sys/class/pwm/pwm<N>`.
        path: PathBuf,
    },
}

/// Pull resistor setting of a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    /// No pull resistor.
    Disabled,
    /// Pull-up.
    Up,
    /// Pull-down.
    Down,
}

impl Pull {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Decoded pad control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PadConfig {
    /// Mux mode, bits 0..=2.
    pub mux: u8,
    /// Bits 3 and 4.
    pub pull: Pull,
    /// Input buffer enabled, bit 5.
    pub receiver: bool,
    /// Slow slew rate, bit 6.
    pub slow_slew: bool,
    /// Register value as read.
    pub raw: u32,
}

impl PadConfig {
    /// Decode a pad control register value.
    pub fn from_register(raw: u32) -> Self {
        let pull = if raw & 0x08 != 0 {
            Pull::Disabled
        } else if raw & 0x10 != 0 {
            Pull::Up
        } else {
            Pull::Down
        };
        #[allow(clippy::cast_possible_truncation)] // three bits
        let mux = (raw & 0x07) as u8;
        Self {
            mux,
            pull,
            receiver: raw & 0x20 != 0,
            slow_slew: raw & 0x40 != 0,
            raw,
        }
    }
}

/// Find the register value for `address` in a pinctrl `pins` dump.
///
/// Lines look like `pin 18 (44e10848) 00000027 pinctrl-single`.
fn pinctrl_value(dump: &str, address: u32) -> Option<&str> {
    let tag = format!("({address:08x})");
    dump.lines().find_map(|line| {
        let mut fields = line.split_whitespace().skip(2);
        if fields.next()? == tag {
            fields.next()
        } else {
            None
        }
    })
}

/// Switches pins between GPIO and PWM.
#[derive(Debug)]
pub struct PinModeController<S> {
    sysfs: S,
}

impl<S: Sysfs> PinModeController<S> {
    /// Create a controller.
    pub fn new(sysfs: S) -> Self {
        Self { sysfs }
    }

    /// Route `pin` according to `pin_data` and `template`.
    ///
    /// On success a GPIO pin's value file is recorded in `gpio`, and a PWM
    /// channel is registered with `pwm` ready for
    /// [`PwmDriver::write_freq_and_value`].
    ///
    /// # Errors
    ///
    /// [`HwError::NoMuxControl`] if the pin has no mux helper;
    /// [`HwError::NotGpioCapable`] / [`HwError::NotPwmCapable`] if the pin
    /// lacks the requested function (checked before any write);
    /// [`HwError::UnknownModeTemplate`] for an unsupported template;
    /// [`HwError::Io`] for a failed write.
    pub fn set_pin_mode<P: Sysfs, G: Sysfs>(
        &self,
        pin: &PinDescriptor,
        pin_data: u32,
        template: &str,
        pwm: &PwmDriver<P>,
        gpio: &GpioController<G>,
    ) -> ModeResult<PinMode> {
        tracing::debug!(pin = %pin.key, pin_data, template, "set pin mode");
        let pinmux = locate::find_pinmux(&self.sysfs, &pin.key)
            .ok_or_else(|| HwError::NoMuxControl(pin.key.clone()))?;
        let state = pinmux.join("state");

        if pin_data & GPIO_MODE == GPIO_MODE {
            let line = pin
                .gpio
                .ok_or_else(|| HwError::NotGpioCapable(pin.key.clone()))?;
            let value_file = value_path(line);
            attr::write(&self.sysfs, &state, "gpio")?;
            gpio.record_value_file(&pin.key, value_file.clone());
            Ok(PinMode::Gpio { value_file })
        } else if template == PWM_TEMPLATE {
            let info = pin
                .pwm
                .as_ref()
                .ok_or_else(|| HwError::NotPwmCapable(pin.key.clone()))?;
            attr::write(&self.sysfs, &state, "pwm")?;
            let path = Path::new(PWM_CLASS).join(format!("pwm{}", info.sysfs));
            if !self.sysfs.exists(&path) {
                tracing::debug!(channel = %info.name, index = info.sysfs, "exporting pwm");
                attr::write(&self.sysfs, &Path::new(PWM_CLASS).join("export"), &info.sysfs.to_string())?;
            }
            attr::write(&self.sysfs, &path.join("run"), "1")?;
            pwm.register_channel(&info.name, path.clone());
            Ok(PinMode::Pwm {
                channel: info.name.clone(),
                path,
            })
        } else {
            Err(HwError::UnknownModeTemplate(template.to_owned()))
        }
    }

    /// Current pad configuration of `pin` from the pinctrl debug dump.
    ///
    /// `Ok(None)` when the dump is unavailable (debugfs not mounted) or does
    /// not list the pin.
    pub fn read_pin_mux(&self, pin: &PinDescriptor) -> ModeResult<Option<PadConfig>> {
        let offset = pin
            .mux_reg_offset
            .ok_or_else(|| HwError::NoMuxControl(pin.key.clone()))?;
        let path = Path::new(PINCTRL_PINS);
        if !self.sysfs.exists(path) {
            tracing::debug!(pin = %pin.key, "no valid mux data");
            return Ok(None);
        }
        let dump = attr::read(&self.sysfs, path)?;
        let Some(value) = PINMUX_BASE
            .checked_add(offset)
            .and_then(|address| pinctrl_value(&dump, address))
        else {
            return Ok(None);
        };
        let raw = u32::from_str_radix(value, 16).map_err(|_| HwError::parse(path, value))?;
        Ok(Some(PadConfig::from_register(raw)))
    }
}
