//! Analog inputs through the `cape-bone-iio` helper.
//!
//! Loading the overlay instantiates `<ocp>/helper.*` with one `AIN<n>` file
//! per channel holding the reading in millivolts (0..=1800).

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use platform::config::AIN_FULL_SCALE_MV;
use platform::{locate, PinDescriptor, Sysfs};

use crate::attr;
use crate::error::{HwError, ModeResult};

/// Device-tree overlay providing the ADC helper.
pub const AIN_OVERLAY: &str = "cape-bone-iio";

/// ADC reader.
#[derive(Debug)]
pub struct AnalogInput<S> {
    sysfs: S,
    helper: Mutex<Option<PathBuf>>,
}

impl<S: Sysfs> AnalogInput<S> {
    /// Create a reader; call [`enable`](Self::enable) before reading.
    pub fn new(sysfs: S) -> Self {
        Self {
            sysfs,
            helper: Mutex::new(None),
        }
    }

    fn helper(&self) -> MutexGuard<'_, Option<PathBuf>> {
        self.helper.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether [`enable`](Self::enable) has succeeded.
    pub fn is_enabled(&self) -> bool {
        self.helper().is_some()
    }

    /// Load the ADC overlay if needed and locate its helper directory.
    ///
    /// Returns the helper directory.
    pub fn enable(&self) -> ModeResult<PathBuf> {
        let ocp = locate::find_ocp(&self.sysfs)
            .ok_or(HwError::AnalogNotEnabled("unable to find ocp directory"))?;
        self.load_overlay()?;
        let helper = locate::find_prefixed(&self.sysfs, &ocp, "helper.").ok_or_else(|| {
            tracing::error!(ocp = %ocp.display(), "error enabling analog inputs");
            HwError::AnalogNotEnabled("helper directory not found")
        })?;
        tracing::debug!(helper = %helper.display(), "analog inputs enabled");
        *self.helper() = Some(helper.clone());
        Ok(helper)
    }

    fn load_overlay(&self) -> ModeResult<()> {
        let capemgr = locate::find_capemgr(&self.sysfs).ok_or(HwError::CapeManagerNotFound)?;
        let slots = capemgr.join("slots");
        let loaded = attr::read(&self.sysfs, &slots)?;
        if loaded.contains(AIN_OVERLAY) {
            return Ok(());
        }
        tracing::info!(overlay = AIN_OVERLAY, "loading overlay");
        attr::write(&self.sysfs, &slots, AIN_OVERLAY)
    }

    /// Normalized reading of `pin`, 0.0 at 0 mV and 1.0 at full scale.
    pub fn read(&self, pin: &PinDescriptor) -> ModeResult<f64> {
        let channel = pin
            .ain
            .ok_or_else(|| HwError::NotAnalogCapable(pin.key.clone()))?;
        let helper = self
            .helper()
            .clone()
            .ok_or(HwError::AnalogNotEnabled("call enable first"))?;
        self.read_channel(&helper, channel)
    }

    fn read_channel(&self, helper: &Path, channel: u8) -> ModeResult<f64> {
        let path = helper.join(format!("AIN{channel}"));
        let raw = attr::read(&self.sysfs, &path).map_err(|err| {
            tracing::error!(%err, "analog read failed");
            err
        })?;
        let millivolts: u32 = raw.trim().parse().map_err(|_| HwError::parse(&path, &raw))?;
        Ok(f64::from(millivolts) / AIN_FULL_SCALE_MV)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use platform::mocks::MockSysfs;

    const SLOTS: &str = "/sys/devices/bone_capemgr.9/slots";
    const HELPER: &str = "/sys/devices/ocp.3/helper.14";

    fn board() -> MockSysfs {
        let sysfs = MockSysfs::new();
        sysfs
            .add_file(SLOTS, " 0: 54:PF---\n")
            .add_dir(HELPER)
            .add_file(format!("{HELPER}/AIN0"), "900\n")
            .add_file(format!("{HELPER}/AIN6"), "1800\n");
        sysfs
    }

    fn p9_39() -> PinDescriptor {
        PinDescriptor::new("P9_39").with_ain(0)
    }

    #[test]
    fn enable_loads_overlay_and_finds_helper() {
        let sysfs = board();
        let ain = AnalogInput::new(&sysfs);
        assert_eq!(ain.enable().unwrap(), PathBuf::from(HELPER));
        assert_eq!(sysfs.writes_to(SLOTS), vec![AIN_OVERLAY]);
        assert!(ain.is_enabled());
    }

    #[test]
    fn loaded_overlay_is_not_loaded_again() {
        let sysfs = board();
        sysfs.add_file(SLOTS, " 7: ff:P-O-L Override Board Name,00A0,Override Manuf,cape-bone-iio\n");
        let ain = AnalogInput::new(&sysfs);
        ain.enable().unwrap();
        assert!(sysfs.writes().is_empty());
    }

    #[test]
    fn reading_is_scaled_to_full_scale() {
        let sysfs = board();
        let ain = AnalogInput::new(&sysfs);
        ain.enable().unwrap();
        assert_eq!(ain.read(&p9_39()).unwrap(), 0.5);
        assert_eq!(ain.read(&PinDescriptor::new("P9_35").with_ain(6)).unwrap(), 1.0);
    }

    #[test]
    fn read_before_enable_fails() {
        let sysfs = board();
        let ain = AnalogInput::new(&sysfs);
        assert!(matches!(ain.read(&p9_39()), Err(HwError::AnalogNotEnabled(_))));
    }

    #[test]
    fn non_analog_pin_fails() {
        let sysfs = board();
        let ain = AnalogInput::new(&sysfs);
        ain.enable().unwrap();
        let pin = PinDescriptor::new("P9_14").with_gpio(50);
        assert!(matches!(ain.read(&pin), Err(HwError::NotAnalogCapable(_))));
    }

    #[test]
    fn missing_helper_leaves_inputs_disabled() {
        let sysfs = MockSysfs::new();
        sysfs.add_file(SLOTS, "").add_dir("/sys/devices/ocp.3");
        let ain = AnalogInput::new(&sysfs);
        assert!(matches!(ain.enable(), Err(HwError::AnalogNotEnabled(_))));
        assert!(!ain.is_enabled());
    }

    #[test]
    fn missing_cape_manager_is_reported() {
        let sysfs = MockSysfs::new();
        sysfs.add_dir("/sys/devices/ocp.3");
        let ain = AnalogInput::new(&sysfs);
        assert!(matches!(ain.enable(), Err(HwError::CapeManagerNotFound)));
    }
}
