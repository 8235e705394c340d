//! Real-filesystem `Sysfs` implementation.
//!
//! `LocalSysfs` implements [`Sysfs`] using `std::fs`. Kernel paths are
//! resolved relative to the `root` provided at construction, so `/` talks to
//! the live kernel and any other directory serves as a staged copy of the
//! tree (board bring-up scripts, tests).

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::sysfs::Sysfs;

/// A [`Sysfs`] implementation backed by `std::fs`.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use platform::sysfs::Sysfs;
/// use platform::sysfs_local::LocalSysfs;
///
/// let sysfs = LocalSysfs::new("/");
/// sysfs.write(Path::new("/sys/class/pwm/export"), "3").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct LocalSysfs {
    root: PathBuf,
}

impl LocalSysfs {
    /// Create a new accessor rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory kernel paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path.strip_prefix("/").unwrap_or(path))
    }
}

impl Default for LocalSysfs {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Sysfs for LocalSysfs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn write(&self, path: &Path, value: &str) -> io::Result<()> {
        // No `create`: a missing attribute must surface as NotFound.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.resolve(path))?;
        file.write_all(value.as_bytes())
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(self.resolve(dir))
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staged() -> (TempDir, LocalSysfs) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sys/class/pwm/pwm3")).unwrap();
        fs::write(tmp.path().join("sys/class/pwm/export"), "").unwrap();
        fs::write(tmp.path().join("sys/class/pwm/pwm3/period_ns"), "500000\n").unwrap();
        let sysfs = LocalSysfs::new(tmp.path());
        (tmp, sysfs)
    }

    #[test]
    fn absolute_kernel_paths_resolve_under_root() {
        let (_tmp, sysfs) = staged();
        let period = sysfs
            .read_to_string(Path::new("/sys/class/pwm/pwm3/period_ns"))
            .unwrap();
        assert_eq!(period.trim(), "500000");
    }

    #[test]
    fn write_replaces_contents() {
        let (tmp, sysfs) = staged();
        sysfs
            .write(Path::new("/sys/class/pwm/pwm3/period_ns"), "1000\n")
            .unwrap();
        let raw = fs::read_to_string(tmp.path().join("sys/class/pwm/pwm3/period_ns")).unwrap();
        assert_eq!(raw, "1000\n");
    }

    #[test]
    fn write_never_creates_attributes() {
        let (tmp, sysfs) = staged();
        let err = sysfs
            .write(Path::new("/sys/class/pwm/pwm3/duty_ns"), "0")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!tmp.path().join("sys/class/pwm/pwm3/duty_ns").exists());
    }

    #[test]
    fn exists_reports_directories() {
        let (_tmp, sysfs) = staged();
        assert!(sysfs.exists(Path::new("/sys/class/pwm/pwm3")));
        assert!(!sysfs.exists(Path::new("/sys/class/pwm/pwm4")));
    }

    #[test]
    fn list_dir_is_sorted_and_shallow() {
        let (_tmp, sysfs) = staged();
        let names = sysfs.list_dir(Path::new("/sys/class/pwm")).unwrap();
        assert_eq!(names, vec!["export".to_owned(), "pwm3".to_owned()]);
    }
}
