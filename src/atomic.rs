//! Whole-directory replacement.
//!
//! New contents are built in a sibling `<name>_TMP` directory, then the original is removed and
//! the temporary renamed into place. Readers see either the old directory or the complete new
//! one, never a partially written one.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RelpathError, Result};

const TMP_SUFFIX: &str = "_TMP";

/// Removes the temporary directory on drop unless disarmed.
struct TempDirGuard {
    path: PathBuf,
    armed: bool,
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs::remove_dir_all(&self.path) {
                log::warn!("Failed to clean up {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Sibling temporary path used while replacing `path`.
pub fn temporary_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        RelpathError::Config(format!("cannot replace directory without a name: {}", path.display()))
    })?;
    let mut tmp_name = OsString::from(name);
    tmp_name.push(TMP_SUFFIX);
    Ok(path.with_file_name(tmp_name))
}

/// Replace the directory at `path` with the contents produced by `build`.
///
/// `build` receives an empty directory to fill. An existing temporary directory is a
/// [`RelpathError::ResourceConflict`]: it means an earlier run did not finish, and it is left
/// for the operator to inspect. If `build` fails the temporary is removed and `path` is
/// untouched. Once the old directory is being removed the temporary is kept on failure, since
/// it is then the only complete copy.
pub fn atomic_replace_directory<F>(path: &Path, build: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let tmp = temporary_path(path)?;
    if tmp.exists() {
        return Err(RelpathError::ResourceConflict(format!(
            "temporary directory {} already exists; remove it after checking the previous run",
            tmp.display()
        )));
    }

    fs::create_dir_all(&tmp)?;
    let mut guard = TempDirGuard {
        path: tmp.clone(),
        armed: true,
    };

    build(&tmp)?;

    guard.armed = false;
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    fs::rename(&tmp, path)?;

    log::debug!("Replaced {}", path.display());
    Ok(())
}
