// Resolves where protog keeps its state on disk: the tool cache root and the default
// location for fetched proto includes.

use crate::error::{ProtogError, Result};
use crate::libs::utilities::path_helpers::expand_path;
use crate::log_debug;
use std::path::{Path, PathBuf};

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "PROTOG_CACHE_DIR";

const CACHE_DIR_NAME: &str = "org.curioswitch.protog";

/// Default includes directory for command line use, relative to the working directory.
pub const DEFAULT_CLI_INCLUDES_DIR: &str = "build/proto-includes";

/// Picks the cache root: an explicit override, then `$PROTOG_CACHE_DIR`, then the user cache
/// directory.
pub fn cache_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let from_env = std::env::var(CACHE_DIR_ENV).ok();
    resolve_cache_root(explicit, from_env.as_deref(), dirs::cache_dir())
}

fn resolve_cache_root(
    explicit: Option<&Path>,
    from_env: Option<&str>,
    user_cache: Option<PathBuf>,
) -> Result<PathBuf> {
    let root = if let Some(dir) = explicit {
        dir.to_path_buf()
    } else if let Some(dir) = from_env.filter(|d| !d.trim().is_empty()) {
        expand_path(dir)?
    } else {
        user_cache
            .map(|dir| dir.join(CACHE_DIR_NAME))
            .ok_or_else(|| {
                ProtogError::Config(format!(
                    "no user cache directory on this system, set {CACHE_DIR_ENV}"
                ))
            })?
    };
    log_debug!("[Paths] Cache root: {}", root.display());
    Ok(root)
}

/// Includes directory used when protog is embedded as a library and none is configured.
pub fn default_library_includes_dir(cache_root: &Path) -> PathBuf {
    cache_root.join("proto-includes")
}
