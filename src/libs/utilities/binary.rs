// Helpers for downloaded executables.

use crate::log_debug;
use std::fs;
use std::io;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Makes a given file executable. On Unix-like systems, this is equivalent to `chmod 755 file`.
/// Files downloaded as bare binaries arrive without execute permission.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> io::Result<()> {
    log_debug!("[Utils] Making {} executable", path.display());
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

// On Windows executability comes from the extension, so only check the file is there.
#[cfg(not(unix))]
pub fn make_executable(path: &Path) -> io::Result<()> {
    fs::metadata(path).map(|_| ())
}

/// Removes a directory tree if it exists. Missing directories are not an error.
pub fn remove_dir_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
