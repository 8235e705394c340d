//! Pin descriptors and digital pin types
//!
//! A [`PinDescriptor`] is the immutable capability record of one header pin:
//! which mux register drives it, and which GPIO line, PWM channel, analog
//! channel or LED it can be routed to.

use serde::{Deserialize, Deserializer};

/// PWM channel a pin can be routed to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PwmChannelInfo {
    /// Channel name, unique per board (`ehrpwm1A`).
    pub name: String,
    /// Index written to `/sys/class/pwm/export`.
    pub sysfs: u32,
}

/// Capability record of one physical pin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinDescriptor {
    /// Logical key (`P9_14`, `USR0`).
    pub key: String,
    /// Offset of the pad register from [`PINMUX_BASE`](crate::config::PINMUX_BASE).
    #[serde(default, deserialize_with = "hex_offset")]
    pub mux_reg_offset: Option<u32>,
    /// GPIO line number.
    #[serde(default)]
    pub gpio: Option<u32>,
    /// PWM channel.
    #[serde(default)]
    pub pwm: Option<PwmChannelInfo>,
    /// Analog input channel.
    #[serde(default)]
    pub ain: Option<u8>,
    /// User LED alias (`usr0`).
    #[serde(default)]
    pub led: Option<String>,
}

impl PinDescriptor {
    /// Create a descriptor with only a key; chain the `with_*` builders.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            mux_reg_offset: None,
            gpio: None,
            pwm: None,
            ain: None,
            led: None,
        }
    }

    /// Set the mux register offset.
    #[must_use]
    pub fn with_mux(mut self, offset: u32) -> Self {
        self.mux_reg_offset = Some(offset);
        self
    }

    /// Set the GPIO line.
    #[must_use]
    pub fn with_gpio(mut self, line: u32) -> Self {
        self.gpio = Some(line);
        self
    }

    /// Set the PWM channel.
    #[must_use]
    pub fn with_pwm(mut self, name: impl Into<String>, sysfs: u32) -> Self {
        self.pwm = Some(PwmChannelInfo {
            name: name.into(),
            sysfs,
        });
        self
    }

    /// Set the analog channel.
    #[must_use]
    pub fn with_ain(mut self, channel: u8) -> Self {
        self.ain = Some(channel);
        self
    }

    /// Set the LED alias.
    #[must_use]
    pub fn with_led(mut self, led: impl Into<String>) -> Self {
        self.led = Some(led.into());
        self
    }
}

/// Parse a `"0x048"`-style register offset.
///
/// # Errors
///
/// Returns the input back if it is not a hexadecimal `u32`.
pub fn parse_hex_offset(raw: &str) -> Result<u32, &str> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    u32::from_str_radix(digits, 16).map_err(|_| raw)
}

fn hex_offset<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        parse_hex_offset(&s)
            .map_err(|bad| serde::de::Error::custom(format!("invalid mux offset {bad:?}")))
    })
    .transpose()
}

/// Digital pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    /// High (logic 1)
    High,
    /// Low (logic 0)
    Low,
}

impl PinState {
    /// Text written to a `value` or `brightness` attribute.
    #[must_use]
    pub fn as_sysfs(self) -> &'static str {
        match self {
            Self::High => "1",
            Self::Low => "0",
        }
    }

    /// Parse a `value` attribute (`"1\n"`).
    #[must_use]
    pub fn from_sysfs(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" => Some(Self::High),
            "0" => Some(Self::Low),
            _ => None,
        }
    }
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<PinState> for bool {
    fn from(value: PinState) -> Self {
        matches!(value, PinState::High)
    }
}

/// GPIO direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Input
    In,
    /// Output
    Out,
}

impl Direction {
    /// Text written to a `direction` attribute.
    #[must_use]
    pub fn as_sysfs(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// Parse a `direction` attribute. `high`/`low` are outputs with an
    /// initial level.
    #[must_use]
    pub fn from_sysfs(raw: &str) -> Option<Self> {
        match raw.trim() {
            "in" => Some(Self::In),
            "out" | "high" | "low" => Some(Self::Out),
            _ => None,
        }
    }
}

/// Edge that wakes a poller on a GPIO `value` file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Interrupts disabled
    None,
    /// Trigger on rising edge
    Rising,
    /// Trigger on falling edge
    Falling,
    /// Trigger on both edges
    Both,
}

impl Edge {
    /// Text written to an `edge` attribute.
    #[must_use]
    pub fn as_sysfs(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Both => "both",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hex_offsets_accept_prefix_and_bare_digits() {
        assert_eq!(parse_hex_offset("0x048"), Ok(0x48));
        assert_eq!(parse_hex_offset("0X164"), Ok(0x164));
        assert_eq!(parse_hex_offset("4c"), Ok(0x4c));
        assert_eq!(parse_hex_offset("0xzz"), Err("0xzz"));
    }

    #[test]
    fn descriptor_deserializes_from_camel_case() {
        let pin: PinDescriptor = serde_json::from_str(
            r#"{"key":"P9_14","muxRegOffset":"0x048","gpio":50,
                "pwm":{"name":"ehrpwm1A","sysfs":3}}"#,
        )
        .unwrap();
        assert_eq!(
            pin,
            PinDescriptor::new("P9_14")
                .with_mux(0x48)
                .with_gpio(50)
                .with_pwm("ehrpwm1A", 3)
        );
    }

    #[test]
    fn bad_offset_is_a_deserialize_error() {
        let err = serde_json::from_str::<PinDescriptor>(r#"{"key":"P9_14","muxRegOffset":"nope"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid mux offset"));
    }

    #[test]
    fn pin_state_round_trips_sysfs_text() {
        assert_eq!(PinState::from_sysfs("1\n"), Some(PinState::High));
        assert_eq!(PinState::from_sysfs("0"), Some(PinState::Low));
        assert_eq!(PinState::from_sysfs("2"), None);
        assert_eq!(PinState::High.as_sysfs(), "1");
    }

    #[test]
    fn direction_treats_initial_levels_as_output() {
        assert_eq!(Direction::from_sysfs("high\n"), Some(Direction::Out));
        assert_eq!(Direction::from_sysfs("in\n"), Some(Direction::In));
        assert_eq!(Direction::from_sysfs(""), None);
    }
}
