//! Pin controllers for BeagleBone-class boards
//!
//! Everything here is a sequence of reads and writes on kernel attribute
//! files through a [`platform::Sysfs`] accessor, so every controller runs
//! unchanged against the live `/sys`, a staged copy of it, or
//! [`platform::mocks::MockSysfs`].
//!
//! - [`pinmux`] - route a pin to GPIO or PWM, read back pad configuration
//! - [`pwm`] - frequency and duty updates on exported PWM channels
//! - [`gpio`] - export, direction, level, edge and user LED control
//! - [`ain`] - ADC readings through the `cape-bone-iio` helper
//! - [`board`] - board name, revision and serial number
//! - [`Bone`] - all of the above addressed by pin key
//!
//! No operation panics. Failures come back as [`HwError`] and affect only
//! the pin they were issued for.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod ain;
mod attr;
pub mod board;
mod bone;
pub mod error;
pub mod gpio;
pub mod pinmux;
pub mod pwm;

pub use ain::AnalogInput;
pub use board::{read_eeproms, read_platform, EepromInfo, EepromMap, Platform};
pub use bone::Bone;
pub use error::{HwError, ModeResult};
pub use gpio::{EdgeWatch, GpioController};
pub use pinmux::{PadConfig, PinMode, PinModeController, Pull, GPIO_MODE, PWM_TEMPLATE};
pub use pwm::{PeriodFallback, PwmChannelRegistry, PwmChannelState, PwmDriver, PwmReading, PwmUpdate};
