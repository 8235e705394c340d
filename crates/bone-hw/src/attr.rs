//! Logged attribute access with path-tagged errors.

use std::io;
use std::path::Path;

use platform::Sysfs;

use crate::error::{HwError, ModeResult};

pub(crate) fn write<S: Sysfs + ?Sized>(sysfs: &S, path: &Path, value: &str) -> ModeResult<()> {
    tracing::debug!(path = %path.display(), value, "write");
    sysfs.write(path, value).map_err(|err| HwError::io(path, err))
}

pub(crate) fn read<S: Sysfs + ?Sized>(sysfs: &S, path: &Path) -> ModeResult<String> {
    sysfs.read_to_string(path).map_err(|err| HwError::io(path, err))
}

/// Read and trim; `None` on any failure. A missing attribute is expected
/// (unexported line, absent cape); anything else degrades with a warning.
pub(crate) fn read_opt<S: Sysfs + ?Sized>(sysfs: &S, path: &Path) -> Option<String> {
    match sysfs.read_to_string(path) {
        Ok(raw) => Some(raw.trim().to_owned()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "attribute missing");
            None
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "read failed");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::{MockSysfs, EIO};

    #[test]
    fn read_opt_trims_and_degrades() {
        let sysfs = MockSysfs::new();
        sysfs.add_file("/sys/class/gpio/gpio66/value", "1\n");
        let value = Path::new("/sys/class/gpio/gpio66/value");
        assert_eq!(read_opt(&sysfs, value).as_deref(), Some("1"));

        assert_eq!(read_opt(&sysfs, Path::new("/sys/class/gpio/gpio67/value")), None);

        sysfs.fail_reads(value, EIO);
        assert_eq!(read_opt(&sysfs, value), None);
        assert!(matches!(read(&sysfs, value), Err(HwError::Io(_))));
    }
}
