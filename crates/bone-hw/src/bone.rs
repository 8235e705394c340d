//! Board handle: every controller over one accessor, addressed by pin key.

use std::path::Path;

use platform::config::PWM_CLASS;
use platform::{
    Direction, DutyRatio, Edge, FrequencyHz, HwConfig, LocalSysfs, PinDescriptor, PinRegistry,
    PinState, Sysfs,
};

use crate::ain::AnalogInput;
use crate::board::{self, EepromMap, Platform};
use crate::error::{HwError, ModeResult};
use crate::gpio::{EdgeWatch, GpioController};
use crate::pinmux::{PadConfig, PinMode, PinModeController};
use crate::pwm::{PwmDriver, PwmReading, PwmUpdate};

/// A board session.
///
/// # Example
///
/// ```no_run
/// use bone_hw::{Bone, PWM_TEMPLATE};
/// use platform::{DutyRatio, FrequencyHz, HwConfig};
///
/// let bone = Bone::from_config(&HwConfig::from_env())?;
/// bone.set_pin_mode("P9_14", 0x06, PWM_TEMPLATE)?;
/// bone.write_pwm("P9_14", FrequencyHz::new(2000.0)?, DutyRatio::new(0.5))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Bone<S> {
    sysfs: S,
    pins: PinRegistry,
    modes: PinModeController<S>,
    pwm: PwmDriver<S>,
    gpio: GpioController<S>,
    ain: AnalogInput<S>,
}

impl Bone<LocalSysfs> {
    /// Open the board described by `config`.
    pub fn from_config(config: &HwConfig) -> ModeResult<Self> {
        let pins = PinRegistry::load(config.pin_table.as_deref())?;
        tracing::debug!(root = %config.sysfs_root.display(), pins = pins.len(), "opening board");
        Ok(Self::new(LocalSysfs::new(&config.sysfs_root), pins))
    }
}

impl<S: Sysfs + Clone> Bone<S> {
    /// Build controllers sharing `sysfs`.
    pub fn new(sysfs: S, pins: PinRegistry) -> Self {
        Self {
            modes: PinModeController::new(sysfs.clone()),
            pwm: PwmDriver::new(sysfs.clone()),
            gpio: GpioController::new(sysfs.clone()),
            ain: AnalogInput::new(sysfs.clone()),
            sysfs,
            pins,
        }
    }

    /// The pin table.
    pub fn pins(&self) -> &PinRegistry {
        &self.pins
    }

    /// Descriptor for `key`.
    pub fn pin(&self, key: &str) -> ModeResult<&PinDescriptor> {
        self.pins
            .get(key)
            .ok_or_else(|| HwError::UnknownPin(key.to_owned()))
    }

    /// The PWM driver.
    pub fn pwm(&self) -> &PwmDriver<S> {
        &self.pwm
    }

    /// The GPIO controller.
    pub fn gpio(&self) -> &GpioController<S> {
        &self.gpio
    }

    /// The analog reader.
    pub fn analog(&self) -> &AnalogInput<S> {
        &self.ain
    }

    /// See [`PinModeController::set_pin_mode`].
    pub fn set_pin_mode(&self, key: &str, pin_data: u32, template: &str) -> ModeResult<PinMode> {
        let pin = self.pin(key)?;
        self.modes
            .set_pin_mode(pin, pin_data, template, &self.pwm, &self.gpio)
    }

    /// See [`PinModeController::read_pin_mux`].
    pub fn read_pin_mux(&self, key: &str) -> ModeResult<Option<PadConfig>> {
        self.modes.read_pin_mux(self.pin(key)?)
    }

    fn pwm_channel(&self, key: &str) -> ModeResult<(&str, u32)> {
        let pin = self.pin(key)?;
        pin.pwm
            .as_ref()
            .map(|info| (info.name.as_str(), info.sysfs))
            .ok_or_else(|| HwError::NotPwmCapable(key.to_owned()))
    }

    /// Register an already exported channel without touching the mux.
    ///
    /// For processes picking up a channel another process configured.
    pub fn attach_pwm(&self, key: &str) -> ModeResult<()> {
        let (channel, index) = self.pwm_channel(key)?;
        let path = Path::new(PWM_CLASS).join(format!("pwm{index}"));
        if !self.sysfs.exists(&path) {
            return Err(HwError::ChannelNotConfigured(channel.to_owned()));
        }
        self.pwm.register_channel(channel, path);
        Ok(())
    }

    /// See [`PwmDriver::write_freq_and_value`].
    pub fn write_pwm(&self, key: &str, freq: FrequencyHz, duty: DutyRatio) -> ModeResult<PwmUpdate> {
        let (channel, _) = self.pwm_channel(key)?;
        self.pwm.write_freq_and_value(channel, freq, duty)
    }

    /// See [`PwmDriver::read_freq_and_value`].
    pub fn read_pwm(&self, key: &str) -> ModeResult<Option<PwmReading>> {
        let (channel, _) = self.pwm_channel(key)?;
        Ok(self.pwm.read_freq_and_value(channel))
    }

    /// See [`GpioController::export`].
    pub fn export_gpio(&self, key: &str, direction: Direction) -> ModeResult<()> {
        self.gpio.export(self.pin(key)?, direction)
    }

    /// See [`GpioController::write`].
    pub fn digital_write(&self, key: &str, state: PinState) -> ModeResult<()> {
        self.gpio.write(self.pin(key)?, state)
    }

    /// See [`GpioController::read`].
    pub fn digital_read(&self, key: &str) -> ModeResult<PinState> {
        self.gpio.read(self.pin(key)?)
    }

    /// See [`GpioController::set_edge`].
    pub fn set_edge(&self, key: &str, edge: Edge) -> ModeResult<EdgeWatch> {
        self.gpio.set_edge(self.pin(key)?, edge)
    }

    /// See [`GpioController::set_led_pin_to_gpio`].
    pub fn set_led_pin_to_gpio(&self, key: &str) -> ModeResult<()> {
        self.gpio.set_led_pin_to_gpio(self.pin(key)?)
    }

    /// Enable analog inputs if not yet enabled, then read `key`.
    pub fn analog_read(&self, key: &str) -> ModeResult<f64> {
        let pin = self.pin(key)?;
        if !self.ain.is_enabled() {
            self.ain.enable()?;
        }
        self.ain.read(pin)
    }

    /// See [`board::read_platform`].
    pub fn platform(&self) -> ModeResult<Platform> {
        board::read_platform(&self.sysfs)
    }

    /// See [`board::read_eeproms`].
    pub fn eeproms(&self) -> ModeResult<EepromMap> {
        board::read_eeproms(&self.sysfs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pinmux::PWM_TEMPLATE;
    use platform::mocks::MockSysfs;

    fn bone(sysfs: &MockSysfs) -> Bone<&MockSysfs> {
        Bone::new(sysfs, PinRegistry::bundled().unwrap())
    }

    #[test]
    fn unknown_pin_is_reported() {
        let sysfs = MockSysfs::new();
        let bone = bone(&sysfs);
        assert!(matches!(
            bone.set_pin_mode("P10_1", 7, PWM_TEMPLATE),
            Err(HwError::UnknownPin(key)) if key == "P10_1"
        ));
    }

    #[test]
    fn pwm_by_pin_key() {
        let sysfs = MockSysfs::new();
        sysfs.with_pinmux(&["P9_14"]);
        let bone = bone(&sysfs);
        bone.set_pin_mode("P9_14", 0x06, PWM_TEMPLATE).unwrap();
        bone.write_pwm("P9_14", FrequencyHz::new(1000.0).unwrap(), DutyRatio::new(0.5))
            .unwrap();
        assert_eq!(sysfs.contents("/sys/class/pwm/pwm3/duty_ns").as_deref(), Some("500000"));
        let reading = bone.read_pwm("P9_14").unwrap().unwrap();
        assert!((reading.duty_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn attach_requires_exported_channel() {
        let sysfs = MockSysfs::new();
        let bone = bone(&sysfs);
        assert!(matches!(
            bone.attach_pwm("P9_14"),
            Err(HwError::ChannelNotConfigured(_))
        ));
        sysfs.with_pwm_channel(3, 1_000_000, 250_000);
        bone.attach_pwm("P9_14").unwrap();
        assert!(sysfs.writes().is_empty());
        let reading = bone.read_pwm("P9_14").unwrap().unwrap();
        assert!((reading.frequency.get() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn gpio_only_pin_is_not_pwm_capable() {
        let sysfs = MockSysfs::new();
        let bone = bone(&sysfs);
        assert!(matches!(
            bone.read_pwm("P9_12"),
            Err(HwError::NotPwmCapable(_))
        ));
    }

    #[test]
    fn analog_read_enables_on_first_use() {
        let sysfs = MockSysfs::new();
        sysfs
            .add_file("/sys/devices/bone_capemgr.9/slots", "")
            .add_file("/sys/devices/ocp.3/helper.14/AIN0", "450");
        let bone = bone(&sysfs);
        let value = bone.analog_read("P9_39").unwrap();
        assert!((value - 0.25).abs() < 1e-9);
        assert!(bone.analog().is_enabled());
    }
}
