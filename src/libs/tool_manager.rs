//! # Tool Manager
//!
//! The provisioning engine. [`ToolManager`] holds what stays fixed for one protog invocation
//! (cache root, configured versions, host platform, network and subprocess seams) and
//! dispatches each [`Acquisition`] to its installer. What the fetches produce is collected in
//! a [`Toolchain`] that the caller owns and threads through every call.
//!
//! ## Cache layout
//!
//! Every tool lives in `<root>/<name>/<version>`. The existence of that directory is the only
//! cache-hit signal. Installers never write to it directly: they populate a staging directory
//! next to it which is renamed into place once complete, so an interrupted fetch never leaves a
//! directory that looks finished.

use crate::error::{ProtogError, Result};
use crate::installers;
use crate::libs::utilities::platform::{Platform, merge_path};
use crate::libs::utilities::process::CommandRunner;
use crate::libs::utilities::transport::Transport;
use crate::libs::version_resolver;
use crate::schemas::config::Versions;
use crate::tools::{Acquisition, ToolId, Versioned};
use crate::{log_debug, log_info, log_warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// PATH entries and named executables accumulated by successive fetches.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    path: Vec<PathBuf>,
    executables: HashMap<String, PathBuf>,
}

impl Toolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `entries` in front of everything registered so far, keeping their relative order.
    /// An entry that was already present moves to the front.
    pub fn prepend(&mut self, entries: Vec<PathBuf>) {
        self.path.retain(|existing| !entries.contains(existing));
        self.path.splice(0..0, entries);
    }

    pub fn register(&mut self, name: &str, path: PathBuf) {
        self.executables.insert(name.to_string(), path);
    }

    pub fn executable(&self, name: &str) -> Option<&Path> {
        self.executables.get(name).map(PathBuf::as_path)
    }

    /// Like [`Toolchain::executable`], but a missing entry is an error attributed to `tool`.
    pub fn require(&self, tool: &str, name: &str) -> Result<&Path> {
        self.executable(name).ok_or_else(|| ProtogError::MissingExecutable {
            tool: tool.to_string(),
            executable: name.to_string(),
        })
    }

    /// PATH entries, highest priority first.
    pub fn path_entries(&self) -> &[PathBuf] {
        &self.path
    }

    pub fn merged_path(&self) -> Result<OsString> {
        merge_path(&self.path)
    }
}

pub struct ToolManager<'a> {
    root: PathBuf,
    versions: &'a Versions,
    platform: Platform,
    transport: &'a dyn Transport,
    runner: &'a dyn CommandRunner,
    // Runtimes are fetched once per dependent plugin; resolve their version only once.
    resolved: RefCell<HashMap<&'static str, String>>,
}

impl<'a> ToolManager<'a> {
    pub fn new(
        root: PathBuf,
        versions: &'a Versions,
        platform: Platform,
        transport: &'a dyn Transport,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            root,
            versions,
            platform,
            transport,
            runner,
            resolved: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner
    }

    /// `<root>/<name>/<version>`.
    pub fn cache_dir(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(name).join(version)
    }

    /// The version to provision for `tool`, honoring configuration first.
    pub fn resolve_version<T>(&self, tool: &T) -> Result<String>
    where
        T: Versioned + ?Sized,
    {
        if let Some(version) = self.resolved.borrow().get(tool.name()) {
            return Ok(version.clone());
        }
        let version = version_resolver::resolve(tool, self.versions.get(tool.name()), self.transport)?;
        self.resolved.borrow_mut().insert(tool.name(), version.clone());
        Ok(version)
    }

    /// Provisions one tool and registers its PATH entries and executables in `toolchain`.
    pub fn fetch(&self, acquisition: Acquisition, toolchain: &mut Toolchain) -> Result<()> {
        log_debug!("[ToolManager] Provisioning {:?}", acquisition);
        match acquisition {
            Acquisition::Binary(spec) => installers::url::fetch(self, spec, toolchain),
            Acquisition::NodePackage(package) => installers::npm::fetch(self, package, toolchain),
            Acquisition::GoModule(module) => installers::go::fetch(self, module, toolchain),
        }
    }

    pub fn fetch_tool(&self, tool: ToolId, toolchain: &mut Toolchain) -> Result<()> {
        self.fetch(tool.acquisition(), toolchain)
    }

    /// Makes sure `dir` exists, running `populate` on a fresh staging directory and renaming
    /// it into place if it does not.
    ///
    /// Returns `true` when `populate` ran. If another process promoted the same directory
    /// first, its copy is kept and ours is discarded.
    pub fn materialize<F>(&self, name: &str, dir: &Path, populate: F) -> Result<bool>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        if dir.exists() {
            log_debug!("[ToolManager] Cache hit for {} at {}", name, dir.display());
            return Ok(false);
        }

        let parent = dir.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)
            .map_err(|e| ProtogError::io(format!("create {}", parent.display()), e))?;
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(parent)
            .map_err(|e| ProtogError::io(format!("create staging directory in {}", parent.display()), e))?;

        populate(staging.path())?;

        match fs::rename(staging.path(), dir) {
            Ok(()) => {
                log_info!("[ToolManager] Installed {} into {}", name, dir.display());
                Ok(true)
            }
            Err(_) if dir.exists() => {
                log_warn!(
                    "[ToolManager] {} was installed concurrently into {}, discarding our copy",
                    name,
                    dir.display()
                );
                Ok(true)
            }
            Err(e) => Err(ProtogError::io(format!("move {} into {}", name, dir.display()), e)),
        }
    }
}
