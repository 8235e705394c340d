//! Sysfs accessor abstraction
//!
//! Every hardware operation in this workspace is a read or write of a single
//! kernel attribute file. Implementations decide where those files live: the
//! real `/sys` tree ([`LocalSysfs`](crate::sysfs_local::LocalSysfs)) or an
//! in-memory emulation ([`MockSysfs`](crate::mocks::MockSysfs)).
//!
//! Paths handed to the trait are always the absolute kernel paths
//! (`/sys/class/pwm/export`); backends map them onto their own root.

use std::io;
use std::path::{Path, PathBuf};

/// Linux `EBUSY`.
const EBUSY: i32 = 16;
/// Linux `EINVAL`.
const EINVAL: i32 = 22;

/// Synchronous access to kernel attribute files.
///
/// Methods take `&self` so one accessor can be shared by every controller of
/// a board; backends needing mutation use interior mutability.
pub trait Sysfs {
    /// Read a whole attribute file as text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write `value` to an attribute file, replacing its contents.
    ///
    /// The file must already exist; attribute files are never created by
    /// userspace.
    fn write(&self, path: &Path, value: &str) -> io::Result<()>;

    /// Check if a file or directory exists.
    fn exists(&self, path: &Path) -> bool;

    /// List the entry names directly inside `dir`, sorted by name.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>>;
}

impl<S: Sysfs + ?Sized> Sysfs for &S {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }

    fn write(&self, path: &Path, value: &str) -> io::Result<()> {
        (**self).write(path, value)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        (**self).list_dir(dir)
    }
}

/// Whether a write failure is the kernel refusing the value, as opposed to
/// the attribute being unreachable.
///
/// PWM drivers answer an unacceptable `period_ns` with `EINVAL` (or `EBUSY`
/// while the channel is claimed). Anything else, `ENOENT` included, means the
/// channel itself is gone.
pub fn is_rejected_write(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(EINVAL | EBUSY)) || err.kind() == io::ErrorKind::InvalidInput
}

/// An I/O failure tagged with the attribute path it happened on.
#[derive(Debug, thiserror::Error)]
#[error("{}: {source}", .path.display())]
pub struct SysfsError {
    /// Attribute that failed.
    pub path: PathBuf,
    /// Underlying failure.
    #[source]
    pub source: io::Error,
}

impl SysfsError {
    /// Tag `source` with `path`.
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}
