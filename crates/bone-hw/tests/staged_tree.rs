//! End-to-end runs on a staged copy of the kernel tree in a temp directory.
//!
//! `LocalSysfs` never creates attribute files, so the tree is laid out as the
//! kernel would leave it after export.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use bone_hw::{Bone, PWM_TEMPLATE};
use platform::{Direction, DutyRatio, FrequencyHz, HwConfig, LocalSysfs, PinState};
use tempfile::TempDir;

fn stage(root: &Path) {
    let touch = |rel: &str, contents: &str| {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    };
    touch("sys/devices/ocp.3/P9_14_pinmux.27/state", "default\n");
    touch("sys/devices/ocp.3/P8_7_pinmux.13/state", "default\n");
    touch("sys/devices/ocp.3/helper.14/AIN2", "1350\n");
    touch("sys/devices/bone_capemgr.9/slots", " 0: 54:PF---\n");
    touch("sys/devices/bone_capemgr.9/baseboard/board-name", "A335BONE\n");
    touch("sys/devices/bone_capemgr.9/baseboard/revision", "00A6\n");
    touch("sys/devices/bone_capemgr.9/baseboard/serial-number", "1234BB000001\n");
    touch("sys/class/pwm/export", "");
    touch("sys/class/pwm/pwm3/run", "0\n");
    touch("sys/class/pwm/pwm3/period_ns", "0\n");
    touch("sys/class/pwm/pwm3/duty_ns", "0\n");
    touch("sys/class/gpio/export", "");
    touch("sys/class/gpio/gpio66/direction", "in\n");
    touch("sys/class/gpio/gpio66/value", "0\n");
}

fn open(tmp: &TempDir) -> Bone<LocalSysfs> {
    stage(tmp.path());
    Bone::from_config(&HwConfig {
        sysfs_root: tmp.path().to_path_buf(),
        pin_table: None,
    })
    .unwrap()
}

#[test]
fn pwm_on_staged_tree() {
    let tmp = TempDir::new().unwrap();
    let bone = open(&tmp);

    bone.set_pin_mode("P9_14", 0x06, PWM_TEMPLATE).unwrap();
    bone.write_pwm("P9_14", FrequencyHz::new(2000.0).unwrap(), DutyRatio::new(0.25))
        .unwrap();

    let read = |rel: &str| fs::read_to_string(tmp.path().join(rel)).unwrap();
    assert_eq!(read("sys/devices/ocp.3/P9_14_pinmux.27/state"), "pwm");
    // Channel directory existed, so no export.
    assert_eq!(read("sys/class/pwm/export"), "");
    assert_eq!(read("sys/class/pwm/pwm3/period_ns"), "500000\n");
    assert_eq!(read("sys/class/pwm/pwm3/duty_ns"), "125000\n");
    assert_eq!(read("sys/class/pwm/pwm3/run"), "1\n");

    let reading = bone.read_pwm("P9_14").unwrap().unwrap();
    assert!((reading.frequency.get() - 2000.0).abs() < 1e-9);
}

#[test]
fn gpio_on_staged_tree() {
    let tmp = TempDir::new().unwrap();
    let bone = open(&tmp);

    bone.set_pin_mode("P8_7", 0x07, "").unwrap();
    bone.export_gpio("P8_7", Direction::Out).unwrap();
    bone.digital_write("P8_7", PinState::High).unwrap();

    assert_eq!(bone.digital_read("P8_7").unwrap(), PinState::High);
    assert_eq!(bone.gpio().read_direction(66), Some(Direction::Out));
}

#[test]
fn analog_and_identity_on_staged_tree() {
    let tmp = TempDir::new().unwrap();
    let bone = open(&tmp);

    let value = bone.analog_read("P9_37").unwrap();
    assert!((value - 0.75).abs() < 1e-9);
    assert_eq!(
        fs::read_to_string(tmp.path().join("sys/devices/bone_capemgr.9/slots")).unwrap(),
        "cape-bone-iio"
    );

    let platform = bone.platform().unwrap();
    assert_eq!(platform.name, "BeagleBone");
    assert_eq!(platform.serial_number.as_deref(), Some("1234BB000001"));
}
