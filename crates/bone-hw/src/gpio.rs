//! Digital I/O through the GPIO and LED classes.
//!
//! A pin's output file is resolved once and cached: the GPIO `value` file,
//! or the LED `brightness` file for the on-board user LEDs. The pin mode
//! controller seeds the cache when it muxes a pin to GPIO.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use platform::config::{GPIO_CLASS, LED_PREFIX};
use platform::{Direction, Edge, PinDescriptor, PinState, Sysfs};

use crate::attr;
use crate::error::{HwError, ModeResult};

/// `/sys/class/gpio/gpio<line>`.
pub fn line_dir(line: u32) -> PathBuf {
    Path::new(GPIO_CLASS).join(format!("gpio{line}"))
}

/// `/sys/class/gpio/gpio<line>/value`.
pub fn value_path(line: u32) -> PathBuf {
    line_dir(line).join("value")
}

/// `/sys/class/leds/beaglebone:green:<led>`.
pub fn led_dir(led: &str) -> PathBuf {
    PathBuf::from(format!("{LED_PREFIX}{led}"))
}

/// A GPIO line armed for edge detection.
///
/// Read the level with [`GpioController::read_watch`] after the kernel
/// signals `POLLPRI` on [`EdgeWatch::value_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeWatch {
    /// The line's `value` attribute.
    pub value_file: PathBuf,
    /// Edge that was armed.
    pub edge: Edge,
}

/// GPIO export, direction, level and edge control.
#[derive(Debug)]
pub struct GpioController<S> {
    sysfs: S,
    value_files: Mutex<BTreeMap<String, PathBuf>>,
}

fn gpio_line(pin: &PinDescriptor) -> ModeResult<u32> {
    pin.gpio.ok_or_else(|| HwError::NotGpioCapable(pin.key.clone()))
}

impl<S: Sysfs> GpioController<S> {
    /// Create a controller with no cached output files.
    pub fn new(sysfs: S) -> Self {
        Self {
            sysfs,
            value_files: Mutex::new(BTreeMap::new()),
        }
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<String, PathBuf>> {
        self.value_files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Output file recorded for `key`, if any.
    pub fn value_file(&self, key: &str) -> Option<PathBuf> {
        self.files().get(key).cloned()
    }

    pub(crate) fn record_value_file(&self, key: &str, path: PathBuf) {
        self.files().insert(key.to_owned(), path);
    }

    /// Export the pin's line if needed and set its direction.
    pub fn export(&self, pin: &PinDescriptor, direction: Direction) -> ModeResult<()> {
        let line = gpio_line(pin)?;
        if !self.sysfs.exists(&value_path(line)) {
            tracing::debug!(pin = %pin.key, line, "exporting gpio");
            attr::write(&self.sysfs, &Path::new(GPIO_CLASS).join("export"), &line.to_string())?;
        }
        attr::write(&self.sysfs, &line_dir(line).join("direction"), direction.as_sysfs())
    }

    /// Drive a pin high or low.
    ///
    /// User LEDs are driven through their `brightness` attribute. A missing
    /// output file is logged and the write still attempted, so the error
    /// returned names the file.
    pub fn write(&self, pin: &PinDescriptor, state: PinState) -> ModeResult<()> {
        let file = match self.value_file(&pin.key) {
            Some(file) => file,
            None => {
                let file = match &pin.led {
                    Some(led) => led_dir(led).join("brightness"),
                    None => value_path(gpio_line(pin)?),
                };
                if !self.sysfs.exists(&file) {
                    tracing::error!(pin = %pin.key, path = %file.display(), "unable to find gpio");
                }
                self.record_value_file(&pin.key, file.clone());
                file
            }
        };
        attr::write(&self.sysfs, &file, state.as_sysfs())
    }

    /// Current level of the pin's GPIO line.
    pub fn read(&self, pin: &PinDescriptor) -> ModeResult<PinState> {
        self.read_level(&value_path(gpio_line(pin)?))
    }

    fn read_level(&self, path: &Path) -> ModeResult<PinState> {
        let raw = attr::read(&self.sysfs, path).map_err(|err| {
            tracing::error!(%err, "digital read failed");
            err
        })?;
        PinState::from_sysfs(&raw).ok_or_else(|| HwError::parse(path, &raw))
    }

    /// Direction of an exported line; `None` if the line is not exported
    /// or reports something unexpected.
    pub fn read_direction(&self, line: u32) -> Option<Direction> {
        let path = line_dir(line).join("direction");
        if !self.sysfs.exists(&path) {
            return None;
        }
        Direction::from_sysfs(&attr::read_opt(&self.sysfs, &path)?)
    }

    /// Arm edge detection on the pin's line.
    pub fn set_edge(&self, pin: &PinDescriptor, edge: Edge) -> ModeResult<EdgeWatch> {
        let line = gpio_line(pin)?;
        attr::write(&self.sysfs, &line_dir(line).join("edge"), edge.as_sysfs())?;
        Ok(EdgeWatch {
            value_file: value_path(line),
            edge,
        })
    }

    /// Level of a watched line.
    pub fn read_watch(&self, watch: &EdgeWatch) -> ModeResult<PinState> {
        self.read_level(&watch.value_file)
    }

    /// Hand a user LED from its default trigger to manual control.
    pub fn set_led_pin_to_gpio(&self, pin: &PinDescriptor) -> ModeResult<()> {
        let led = pin
            .led
            .as_deref()
            .ok_or_else(|| HwError::LedNotFound(pin.key.clone()))?;
        let trigger = led_dir(led).join("trigger");
        if !self.sysfs.exists(&trigger) {
            tracing::error!(led, "unable to find LED");
            return Err(HwError::LedNotFound(led.to_owned()));
        }
        attr::write(&self.sysfs, &trigger, "gpio")
    }
}
