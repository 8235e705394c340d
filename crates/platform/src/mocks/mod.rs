//! Mock implementations for testing
//!
//! [`MockSysfs`] is an in-memory kernel attribute tree that records every
//! access and emulates the parts of the kernel's behaviour the controllers
//! depend on:
//!
//! - writing `N` to `/sys/class/pwm/export` creates `pwm<N>/{run,period_ns,duty_ns}`
//! - writing `N` to `/sys/class/gpio/export` creates `gpio<N>/{direction,value,edge}`
//! - exporting an already exported index fails with `EBUSY`
//! - `duty_ns > period_ns` and `period_ns < duty_ns` fail with `EINVAL`
//! - writing a missing attribute fails with `NotFound`
//!
//! Failures can be injected per path with an errno.

#![cfg(any(test, feature = "mocks"))]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::{GPIO_CLASS, PWM_CLASS};
use crate::sysfs::Sysfs;

/// Linux `EBUSY`.
pub const EBUSY: i32 = 16;
/// Linux `EINVAL`.
pub const EINVAL: i32 = 22;
/// Linux `EIO`.
pub const EIO: i32 = 5;

/// One recorded access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Successful or failed read of a path.
    Read(PathBuf),
    /// Attempted write of a path; value has surrounding whitespace trimmed.
    Write(PathBuf, String),
}

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    ops: Vec<Op>,
    write_failures: BTreeMap<PathBuf, i32>,
    read_failures: BTreeMap<PathBuf, i32>,
}

impl State {
    fn add_dir(&mut self, dir: &Path) {
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn add_file(&mut self, path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path.to_path_buf(), contents.to_owned());
    }

    fn attr_u64(&self, path: &Path) -> Option<u64> {
        self.files.get(path).and_then(|v| v.trim().parse().ok())
    }

    fn export(&mut self, class: &str, prefix: &str, value: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        let index: u32 = value
            .parse()
            .map_err(|_| io::Error::from_raw_os_error(EINVAL))?;
        let dir = Path::new(class).join(format!("{prefix}{index}"));
        if self.dirs.contains(&dir) {
            return Err(io::Error::from_raw_os_error(EBUSY));
        }
        for (name, initial) in attrs {
            self.add_file(&dir.join(name), initial);
        }
        Ok(())
    }

    /// Kernel-side validation of a PWM attribute write.
    fn check_pwm(&self, path: &Path, value: &str) -> io::Result<()> {
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return Ok(());
        };
        if dir.parent() != Some(Path::new(PWM_CLASS)) {
            return Ok(());
        }
        let einval = || io::Error::from_raw_os_error(EINVAL);
        match name.to_str() {
            Some("period_ns") => {
                let period: u64 = value.parse().map_err(|_| einval())?;
                let duty = self.attr_u64(&dir.join("duty_ns")).unwrap_or(0);
                if period < duty {
                    return Err(einval());
                }
            }
            Some("duty_ns") => {
                let duty: u64 = value.parse().map_err(|_| einval())?;
                let period = self.attr_u64(&dir.join("period_ns")).unwrap_or(0);
                if duty > period {
                    return Err(einval());
                }
            }
            Some("run") => {
                if value != "0" && value != "1" {
                    return Err(einval());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// In-memory kernel attribute tree.
#[derive(Debug, Default)]
pub struct MockSysfs {
    state: Mutex<State>,
}

impl MockSysfs {
    /// Create an empty tree with the PWM and GPIO class directories.
    pub fn new() -> Self {
        let mock = Self::default();
        {
            let mut state = mock.lock();
            state.add_file(&Path::new(PWM_CLASS).join("export"), "");
            state.add_file(&Path::new(GPIO_CLASS).join("export"), "");
        }
        mock
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add (or replace) an attribute file, creating parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &str) -> &Self {
        self.lock().add_file(path.as_ref(), contents);
        self
    }

    /// Add a directory and its ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) -> &Self {
        self.lock().add_dir(path.as_ref());
        self
    }

    /// Add `/sys/devices/ocp.3/<key>_pinmux.1/state` for each key.
    pub fn with_pinmux(&self, keys: &[&str]) -> &Self {
        for key in keys {
            self.add_file(format!("/sys/devices/ocp.3/{key}_pinmux.1/state"), "default");
        }
        self
    }

    /// Pre-export PWM channel `index` with the given period and duty.
    pub fn with_pwm_channel(&self, index: u32, period_ns: u64, duty_ns: u64) -> &Self {
        let dir = Path::new(PWM_CLASS).join(format!("pwm{index}"));
        self.add_file(dir.join("run"), "0");
        self.add_file(dir.join("period_ns"), &format!("{period_ns}\n"));
        self.add_file(dir.join("duty_ns"), &format!("{duty_ns}\n"));
        self
    }

    /// Make every write to `path` fail with `errno` until cleared.
    pub fn fail_writes(&self, path: impl AsRef<Path>, errno: i32) -> &Self {
        self.lock().write_failures.insert(path.as_ref().to_path_buf(), errno);
        self
    }

    /// Make every read of `path` fail with `errno` until cleared.
    pub fn fail_reads(&self, path: impl AsRef<Path>, errno: i32) -> &Self {
        self.lock().read_failures.insert(path.as_ref().to_path_buf(), errno);
        self
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.write_failures.clear();
        state.read_failures.clear();
    }

    /// Current contents of an attribute, trimmed.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock()
            .files
            .get(path.as_ref())
            .map(|v| v.trim().to_owned())
    }

    /// Every recorded access, oldest first.
    pub fn ops(&self) -> Vec<Op> {
        self.lock().ops.clone()
    }

    /// Every attempted write as `(path, trimmed value)`, oldest first.
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(path, value) => Some((path.clone(), value.clone())),
                Op::Read(_) => None,
            })
            .collect()
    }

    /// Values written to one path, oldest first.
    pub fn writes_to(&self, path: impl AsRef<Path>) -> Vec<String> {
        let path = path.as_ref();
        self.writes()
            .into_iter()
            .filter(|(p, _)| p == path)
            .map(|(_, v)| v)
            .collect()
    }

    /// Forget recorded accesses; the tree itself is kept.
    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }
}

impl Sysfs for MockSysfs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let mut state = self.lock();
        state.ops.push(Op::Read(path.to_path_buf()));
        if let Some(errno) = state.read_failures.get(path) {
            return Err(io::Error::from_raw_os_error(*errno));
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn write(&self, path: &Path, value: &str) -> io::Result<()> {
        let mut state = self.lock();
        let value = value.trim();
        state.ops.push(Op::Write(path.to_path_buf(), value.to_owned()));
        if let Some(errno) = state.write_failures.get(path) {
            return Err(io::Error::from_raw_os_error(*errno));
        }
        if !state.files.contains_key(path) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        if path == Path::new(PWM_CLASS).join("export") {
            state.export(PWM_CLASS, "pwm", value, &[("run", "0"), ("period_ns", "0"), ("duty_ns", "0")])?;
        } else if path == Path::new(GPIO_CLASS).join("export") {
            state.export(GPIO_CLASS, "gpio", value, &[("direction", "in"), ("value", "0"), ("edge", "none")])?;
        } else {
            state.check_pwm(path, value)?;
        }
        state.files.insert(path.to_path_buf(), value.to_owned());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        let state = self.lock();
        if !state.dirs.contains(dir) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        let names: BTreeSet<String> = state
            .files
            .keys()
            .chain(state.dirs.iter())
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        Ok(names.into_iter().collect())
    }
}
