// `protog --print-cache-dir`: shows where provisioned tools are kept, e.g. for CI caching.

use crate::error::Result;
use crate::libs::paths::cache_root;
use std::path::Path;

/// Prints the cache root to stdout.
pub fn run(explicit: Option<&Path>) -> Result<()> {
    println!("{}", cache_root(explicit)?.display());
    Ok(())
}
