//! Platform layer for sysfs-driven BeagleBone-class boards
//!
//! This crate provides the pieces every pin controller stands on, enabling
//! development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (bonectl, user programs)
//!         ↓
//! Controllers (bone-hw: pin mode, PWM, GPIO, AIN, board identity)
//!         ↓
//! Platform (this crate - sysfs accessor, pin registry, discovery)
//!         ↓
//! Kernel pseudo-filesystem (/sys)
//! ```
//!
//! # Modules
//!
//! - [`sysfs`] - the [`Sysfs`] accessor trait
//! - [`sysfs_local`] - `std::fs` backend rooted at a configurable directory
//! - [`mocks`] - in-memory kernel emulation (feature `mocks`)
//! - [`registry`] - pin key → [`PinDescriptor`] lookup
//! - [`locate`] - discovery of `ocp.*`, `bone_capemgr.*`, `*_pinmux.*`
//! - [`pwm_types`] - frequency, duty and period newtypes
//! - [`config`] - kernel path constants and [`HwConfig`]
//!
//! # Features
//!
//! - `mocks`: expose [`mocks::MockSysfs`] to downstream test suites
//!
//! # Example
//!
//! ```no_run
//! use platform::{registry::PinRegistry, sysfs_local::LocalSysfs, locate};
//!
//! let sysfs = LocalSysfs::default();
//! let pins = PinRegistry::bundled().unwrap();
//! let pinmux = locate::find_pinmux(&sysfs, &pins.get("P9_14").unwrap().key);
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
// Pedantic lints suppressed for this hardware crate:
#![allow(clippy::doc_markdown)] // attribute and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod locate;
pub mod mocks;
pub mod pin;
pub mod pwm_types;
pub mod registry;
pub mod sysfs;
pub mod sysfs_local;

pub use config::HwConfig;
pub use pin::{Direction, Edge, PinDescriptor, PinState, PwmChannelInfo};
pub use pwm_types::{DutyRatio, FrequencyHz, OutOfRangeError, PeriodNs};
pub use registry::{PinRegistry, RegistryError};
pub use sysfs::{is_rejected_write, Sysfs, SysfsError};
pub use sysfs_local::LocalSysfs;
