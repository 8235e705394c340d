//! Pin registry: logical pin key → capability record.
//!
//! The table is JSON, an array of [`PinDescriptor`] objects with mux offsets
//! as hex strings:
//!
//! ```json
//! [{ "key": "P9_14", "muxRegOffset": "0x048", "gpio": 50,
//!    "pwm": { "name": "ehrpwm1A", "sysfs": 3 } }]
//! ```
//!
//! A BeagleBone table is bundled and used when no path is configured.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::pin::PinDescriptor;

const BUNDLED_TABLE: &str = include_str!("../pins/bone.json");

/// Error loading a pin table.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The table file could not be read.
    #[error("reading pin table {}: {source}", .path.display())]
    Io {
        /// Table path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The table is not valid JSON or a descriptor is malformed.
    #[error("parsing pin table: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two descriptors share a key.
    #[error("duplicate pin key {0}")]
    DuplicateKey(String),
    /// Two descriptors claim the same PWM channel name.
    #[error("PWM channel {channel} claimed by both {first} and {second}")]
    DuplicatePwmChannel {
        /// Channel name.
        channel: String,
        /// Pin seen first.
        first: String,
        /// Pin seen second.
        second: String,
    },
}

/// Immutable lookup table of pin descriptors.
#[derive(Debug, Clone, Default)]
pub struct PinRegistry {
    pins: BTreeMap<String, PinDescriptor>,
}

impl PinRegistry {
    /// Build from descriptors, rejecting duplicate keys and PWM channels.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKey`] or
    /// [`RegistryError::DuplicatePwmChannel`].
    pub fn from_pins(pins: impl IntoIterator<Item = PinDescriptor>) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        let mut channels: BTreeMap<String, String> = BTreeMap::new();
        for pin in pins {
            if let Some(pwm) = &pin.pwm {
                if let Some(first) = channels.insert(pwm.name.clone(), pin.key.clone()) {
                    return Err(RegistryError::DuplicatePwmChannel {
                        channel: pwm.name.clone(),
                        first,
                        second: pin.key.clone(),
                    });
                }
            }
            let key = pin.key.clone();
            if map.insert(key.clone(), pin).is_some() {
                return Err(RegistryError::DuplicateKey(key));
            }
        }
        Ok(Self { pins: map })
    }

    /// Parse a JSON table.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let pins: Vec<PinDescriptor> = serde_json::from_str(json)?;
        Self::from_pins(pins)
    }

    /// Load a JSON table from disk.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The bundled BeagleBone table.
    pub fn bundled() -> Result<Self, RegistryError> {
        Self::from_json_str(BUNDLED_TABLE)
    }

    /// Load `path` if given, otherwise the bundled table.
    pub fn load(path: Option<&Path>) -> Result<Self, RegistryError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    /// Look up a pin by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PinDescriptor> {
        self.pins.get(key)
    }

    /// Find the pin routed to a PWM channel.
    #[must_use]
    pub fn by_pwm_channel(&self, channel: &str) -> Option<&PinDescriptor> {
        self.pins
            .values()
            .find(|pin| pin.pwm.as_ref().is_some_and(|pwm| pwm.name == channel))
    }

    /// All pins, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = &PinDescriptor> {
        self.pins.values()
    }

    /// Number of pins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn bundled_table_parses() {
        let registry = PinRegistry::bundled().unwrap();
        let p9_14 = registry.get("P9_14").unwrap();
        assert_eq!(p9_14.mux_reg_offset, Some(0x48));
        assert_eq!(p9_14.gpio, Some(50));
        assert_eq!(p9_14.pwm.as_ref().unwrap().sysfs, 3);
        assert_eq!(registry.get("P9_39").unwrap().ain, Some(0));
        assert_eq!(registry.get("USR0").unwrap().led.as_deref(), Some("usr0"));
    }

    #[test]
    fn lookup_by_channel_name() {
        let registry = PinRegistry::bundled().unwrap();
        assert_eq!(registry.by_pwm_channel("ehrpwm1B").unwrap().key, "P9_16");
        assert!(registry.by_pwm_channel("ehrpwm9Z").is_none());
    }

    #[test]
    fn duplicate_keys_rejected() {
        let err = PinRegistry::from_pins([PinDescriptor::new("P9_14"), PinDescriptor::new("P9_14")])
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey(k) if k == "P9_14"));
    }

    #[test]
    fn duplicate_pwm_channels_rejected() {
        let err = PinRegistry::from_pins([
            PinDescriptor::new("P9_14").with_pwm("ehrpwm1A", 3),
            PinDescriptor::new("P9_16").with_pwm("ehrpwm1A", 4),
        ])
        .unwrap_err();
        match err {
            RegistryError::DuplicatePwmChannel { first, second, .. } => {
                assert_eq!(first, "P9_14");
                assert_eq!(second, "P9_16");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PinRegistry::from_path(Path::new("/nonexistent/pins.json")).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }

    #[test]
    fn load_reads_file_when_given() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"[{"key":"P8_7","muxRegOffset":"0x090","gpio":66}]"#).unwrap();
        let registry = PinRegistry::load(Some(tmp.path())).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("P8_7").unwrap().gpio, Some(66));
    }
}
