//! # Resolved Tool Schema
//!
//! A [`ResolvedTool`] is what a descriptor projects to for one invocation on one host:
//! the concrete version, the platform tokens the tool's release naming uses, and the
//! cache directory whose existence marks a completed fetch. It is derived on every
//! run and never persisted.

use crate::libs::utilities::platform::Platform;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    /// Descriptor name; also the first path component under the cache root.
    pub name: String,
    /// Normalized version, e.g. `v3.20.1`.
    pub version: String,
    /// OS token as it appears in the tool's artifact names (`osx`, `linux`, `win`, ...).
    pub os: String,
    /// Architecture token as it appears in the tool's artifact names (`x86_64`, `aarch_64`, ...).
    pub arch: String,
    /// Archive extension token (`zip`, `tar.gz`).
    pub ext: String,
    /// `<root>/<name>/<version>`.
    pub cache_dir: PathBuf,
    pub platform: Platform,
}

impl ResolvedTool {
    /// The version without its tag prefix (`v3.20.1` -> `3.20.1`).
    pub fn bare_version(&self) -> &str {
        self.version.strip_prefix('v').unwrap_or(&self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::utilities::platform::{Arch, Os};

    #[test]
    fn bare_version_strips_tag_prefix() {
        let tool = ResolvedTool {
            name: "protoc".into(),
            version: "v3.20.1".into(),
            os: "linux".into(),
            arch: "x86_64".into(),
            ext: "zip".into(),
            cache_dir: PathBuf::from("/cache/protoc/v3.20.1"),
            platform: Platform::new(Os::Linux, Arch::X86_64),
        };
        assert_eq!(tool.bare_version(), "3.20.1");
    }
}
