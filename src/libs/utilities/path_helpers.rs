use crate::error::{ProtogError, Result};
use std::path::PathBuf;

/// Expands `~` and `$VARS` in a user-supplied path (config file values, `--includes-dir`).
pub fn expand_path(path: &str) -> Result<PathBuf> {
    shellexpand::full(path)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| ProtogError::Config(format!("cannot expand path {path:?}: {e}")))
}
