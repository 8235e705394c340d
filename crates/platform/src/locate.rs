//! Sysfs path discovery.
//!
//! Device-tree overlays instantiate directories whose names carry a kernel
//! assigned suffix (`ocp.3`, `bone_capemgr.9`, `P9_14_pinmux.27`). These
//! helpers find them by prefix.

use std::path::{Path, PathBuf};

use crate::config::DEVICES_DIR;
use crate::sysfs::Sysfs;

/// First entry of `dir` whose name starts with `prefix`.
///
/// Returns `None` when the directory is unreadable or nothing matches.
pub fn find_prefixed<S: Sysfs + ?Sized>(sysfs: &S, dir: &Path, prefix: &str) -> Option<PathBuf> {
    match sysfs.list_dir(dir) {
        Ok(names) => names
            .into_iter()
            .find(|name| name.starts_with(prefix))
            .map(|name| dir.join(name)),
        Err(err) => {
            tracing::debug!(dir = %dir.display(), %err, "cannot list directory");
            None
        }
    }
}

/// The on-chip peripheral bus directory, `/sys/devices/ocp.*`.
pub fn find_ocp<S: Sysfs + ?Sized>(sysfs: &S) -> Option<PathBuf> {
    find_prefixed(sysfs, Path::new(DEVICES_DIR), "ocp.")
}

/// The cape manager directory, `/sys/devices/bone_capemgr.*`.
pub fn find_capemgr<S: Sysfs + ?Sized>(sysfs: &S) -> Option<PathBuf> {
    find_prefixed(sysfs, Path::new(DEVICES_DIR), "bone_capemgr.")
}

/// The pinmux helper directory for `key`, `<ocp>/<key>_pinmux.*`.
pub fn find_pinmux<S: Sysfs + ?Sized>(sysfs: &S, key: &str) -> Option<PathBuf> {
    let ocp = find_ocp(sysfs)?;
    find_prefixed(sysfs, &ocp, &format!("{key}_pinmux."))
}
