//! Board identity from the cape manager's baseboard EEPROM view.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use platform::config::{BASEBOARD_EEPROM, DOGTAG};
use platform::{locate, Sysfs};

use crate::attr;
use crate::error::{HwError, ModeResult};

/// Identity of the running board.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// Marketing name, or the raw EEPROM board name if unrecognized.
    pub name: String,
    /// Board revision; absent if the EEPROM field is not printable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Serial number; absent if the EEPROM field is not printable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Contents of `/etc/dogtag`, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dogtag: Option<String>,
}

/// Raw EEPROM fields as the kernel reports them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EepromInfo {
    /// `board-name`.
    pub board_name: String,
    /// `revision`.
    pub version: String,
    /// `serial-number`.
    pub serial_number: String,
}

/// EEPROM device path → contents.
pub type EepromMap = BTreeMap<PathBuf, EepromInfo>;

/// Marketing name for an EEPROM board name.
pub fn board_display_name(raw: &str) -> &str {
    match raw {
        "A335BONE" => "BeagleBone",
        "A335BNLT" => "BeagleBone Black",
        other => other,
    }
}

fn printable(value: String) -> Option<String> {
    value
        .bytes()
        .all(|b| (b' '..=b'~').contains(&b))
        .then_some(value)
}

fn baseboard<S: Sysfs + ?Sized>(sysfs: &S) -> ModeResult<PathBuf> {
    locate::find_capemgr(sysfs)
        .map(|capemgr| capemgr.join("baseboard"))
        .ok_or(HwError::CapeManagerNotFound)
}

/// Identify the board.
pub fn read_platform<S: Sysfs + ?Sized>(sysfs: &S) -> ModeResult<Platform> {
    let baseboard = baseboard(sysfs)?;
    let raw_name = attr::read(sysfs, &baseboard.join("board-name"))?;
    let version = attr::read(sysfs, &baseboard.join("revision"))?;
    let serial = attr::read(sysfs, &baseboard.join("serial-number"))?;
    Ok(Platform {
        name: board_display_name(raw_name.trim()).to_owned(),
        version: printable(version.trim().to_owned()),
        serial_number: printable(serial.trim().to_owned()),
        dogtag: sysfs.read_to_string(Path::new(DOGTAG)).ok(),
    })
}

/// Read the baseboard EEPROM fields.
pub fn read_eeproms<S: Sysfs + ?Sized>(sysfs: &S) -> ModeResult<EepromMap> {
    let baseboard = baseboard(sysfs)?;
    let info = EepromInfo {
        board_name: attr::read(sysfs, &baseboard.join("board-name"))?,
        version: attr::read(sysfs, &baseboard.join("revision"))?,
        serial_number: attr::read(sysfs, &baseboard.join("serial-number"))?,
    };
    Ok(BTreeMap::from([(PathBuf::from(BASEBOARD_EEPROM), info)]))
}
