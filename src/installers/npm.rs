// Package-manager installer: provisions Node.js, then runs
// `npm install --prefix <staging> <package>@<version>` with only the accumulated PATH so npm
// finds the node binary it was shipped with.

use crate::error::Result;
use crate::libs::tool_manager::{ToolManager, Toolchain};
use crate::libs::utilities::process::Invocation;
use crate::log_info;
use crate::tools::binaries::NodeJs;
use crate::tools::{Acquisition, NodePackage, Versioned};

pub fn fetch(manager: &ToolManager, package: &'static NodePackage, toolchain: &mut Toolchain) -> Result<()> {
    manager.fetch(Acquisition::Binary(&NodeJs), toolchain)?;

    let version = manager.resolve_version(package)?;
    let dir = manager.cache_dir(package.name(), &version);
    let npm = toolchain.require(package.name(), "npm")?.to_path_buf();
    let path = toolchain.merged_path()?;

    manager.materialize(package.name(), &dir, |staging| {
        log_info!("[{}] Installing {}@{} with npm", package.name(), package.package, version);
        let install = Invocation::new("install", &npm)
            .arg("install")
            .arg("--prefix")
            .arg(staging)
            .arg(format!("{}@{}", package.package, version))
            .env("PATH", path.clone());
        manager.runner().run(&install)
    })?;

    toolchain.prepend(package.path_entries(&dir));
    for (logical, path) in package.executables(&dir, manager.platform()) {
        toolchain.register(logical, path);
    }
    Ok(())
}
