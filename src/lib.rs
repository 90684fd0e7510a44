//! protog runs protoc with the plugins a command line asks for, downloading protoc, the
//! plugins and the runtimes they need into a per-user cache on first use.
//!
//! ```no_run
//! use protog::schemas::config::{Config, Versions};
//!
//! let config = Config {
//!     versions: Versions::new().with("protoc", "21.5"),
//!     ..Config::default()
//! };
//! let args: Vec<String> = ["--go_out=gen/go", "protos/service.proto"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! protog::run(&args, config)?;
//! # Ok::<(), protog::error::ProtogError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod installers;
pub mod libs;
pub mod logger;
pub mod schemas;
pub mod tools;

use crate::commands::run::Invoker;
use crate::error::{ProtogError, Result};
use crate::libs::includes::RegexImportScanner;
use crate::libs::paths::{cache_root, default_library_includes_dir};
use crate::libs::utilities::platform::Platform;
use crate::libs::utilities::process::SystemRunner;
use crate::libs::utilities::transport::UreqTransport;
use crate::schemas::config::{Config, Versions};
use std::path::PathBuf;

/// Versions configured through `<TOOL>_VERSION` environment variables.
pub fn versions_from_env() -> Versions {
    Versions::from_env(&tools::configurable_names(), |var| std::env::var(var).ok())
}

/// Runs protoc with `args`, provisioning whatever they need.
///
/// Versions in `config` take precedence over `<TOOL>_VERSION` environment variables. Proto
/// includes default to `<cache root>/proto-includes`.
pub fn run(args: &[String], config: Config) -> Result<()> {
    let root = cache_root(config.cache_dir.as_deref())?;
    let includes_dir = config
        .includes_dir
        .unwrap_or_else(|| default_library_includes_dir(&root));
    let mut versions = versions_from_env();
    versions.merge(&config.versions);
    execute(args, root, includes_dir, &versions)
}

/// Runs protoc against the real network, filesystem and host platform.
pub fn execute(
    args: &[String],
    cache_root: PathBuf,
    includes_dir: PathBuf,
    versions: &Versions,
) -> Result<()> {
    let working_dir =
        std::env::current_dir().map_err(|e| ProtogError::io("determine working directory", e))?;
    let transport = UreqTransport::new();
    let scanner = RegexImportScanner::new();
    let invoker = Invoker {
        cache_root,
        includes_dir: working_dir.join(includes_dir),
        working_dir,
        versions,
        platform: Platform::host()?,
        transport: &transport,
        runner: &SystemRunner,
        scanner: &scanner,
    };
    invoker.invoke(args)
}
