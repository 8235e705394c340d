//! Board configuration and kernel path constants
//!
//! This module defines the sysfs locations and numeric constants used across
//! the workspace. All kernel paths should reference these constants rather
//! than hardcoding values.

use std::path::PathBuf;

/// GPIO class directory.
pub const GPIO_CLASS: &str = "/sys/class/gpio";

/// PWM class directory.
pub const PWM_CLASS: &str = "/sys/class/pwm";

/// LED class directory prefix for the on-board user LEDs.
pub const LED_PREFIX: &str = "/sys/class/leds/beaglebone:green:";

/// Parent of the `ocp.*` and `bone_capemgr.*` device directories.
pub const DEVICES_DIR: &str = "/sys/devices";

/// Pad configuration dump from the pinctrl debugfs.
pub const PINCTRL_PINS: &str = "/sys/kernel/debug/pinctrl/44e10800.pinmux/pins";

/// Physical base address of the AM335x control module pad registers.
pub const PINMUX_BASE: u32 = 0x44e1_0800;

/// Baseboard EEPROM as exposed by the at24 driver.
pub const BASEBOARD_EEPROM: &str = "/sys/bus/i2c/drivers/at24/1-0050/eeprom";

/// Image build tag written by the distribution.
pub const DOGTAG: &str = "/etc/dogtag";

/// Full-scale ADC reading in millivolts.
pub const AIN_FULL_SCALE_MV: f64 = 1800.0;

/// Environment variable naming the sysfs root (default `/`).
pub const ENV_SYSFS_ROOT: &str = "BONE_SYSFS_ROOT";

/// Environment variable naming a JSON pin table (default: bundled table).
pub const ENV_PIN_TABLE: &str = "BONE_PINS";

/// Runtime configuration for a board session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwConfig {
    /// Directory kernel paths are resolved against.
    pub sysfs_root: PathBuf,
    /// JSON pin table; `None` selects the bundled BeagleBone table.
    pub pin_table: Option<PathBuf>,
}

impl Default for HwConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/"),
            pin_table: None,
        }
    }
}

impl HwConfig {
    /// Build from `BONE_SYSFS_ROOT` and `BONE_PINS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(root) = std::env::var_os(ENV_SYSFS_ROOT) {
            config.sysfs_root = PathBuf::from(root);
        }
        config.pin_table = std::env::var_os(ENV_PIN_TABLE).map(PathBuf::from);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_live_kernel() {
        let config = HwConfig::default();
        assert_eq!(config.sysfs_root, PathBuf::from("/"));
        assert!(config.pin_table.is_none());
    }

    #[test]
    fn pinmux_base_matches_pinctrl_device_name() {
        assert!(PINCTRL_PINS.contains(&format!("{PINMUX_BASE:x}")));
    }
}
