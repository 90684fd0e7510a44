//! # Tool Descriptors
//!
//! Every tool protog can provision is described declaratively. A descriptor answers a few
//! questions about the tool (what is it called, where are its releases, how do its artifact
//! names spell the host platform, where do its executables land) and the provisioning engine in
//! [`crate::libs::tool_manager`] does the rest.
//!
//! Descriptors come in three families, one per acquisition strategy:
//!
//! * [`BinarySpec`] implementors, for tools with prebuilt release archives or bare binaries.
//! * [`NodePackage`], for plugins published to npm.
//! * [`GoModule`], for plugins built from source with `go install`.
//!
//! All of them implement [`Versioned`], which covers version lookup and normalization.

pub mod binaries;
pub mod go;
pub mod node;

use crate::error::Result;
use crate::libs::utilities::compression::ArchiveFormat;
use crate::libs::utilities::platform::{Arch, Platform};
use crate::libs::utilities::transport::Transport;
use crate::libs::version_resolver::with_v_prefix;
use crate::schemas::tools::ResolvedTool;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Identity and version policy shared by every descriptor.
pub trait Versioned {
    /// Unique key: cache directory name, configuration key and environment variable stem.
    fn name(&self) -> &'static str;

    /// Source repository (`github.com/<owner>/<repo>`), used for the generic latest-release
    /// lookup and in error messages.
    fn repo(&self) -> &'static str;

    /// Overrides the generic latest-release lookup. `None` means "use the generic lookup".
    fn latest_version(&self, _transport: &dyn Transport) -> Option<Result<String>> {
        None
    }

    /// Canonical spelling of a version, used for both the cache path and the URL.
    fn normalize_version(&self, version: &str) -> String {
        with_v_prefix(version)
    }
}

/// A tool fetched as a prebuilt archive or binary.
///
/// Only `url` is required; every other method has a host-native default.
pub trait BinarySpec: Versioned {
    /// OS token used in artifact names. `None` if the tool publishes nothing for this OS.
    fn os_token(&self, platform: Platform) -> Option<&'static str> {
        Some(platform.os.native_token())
    }

    /// Architecture token used in artifact names. `None` if the tool publishes nothing for
    /// this platform.
    fn arch_token(&self, platform: Platform) -> Option<&'static str> {
        Some(platform.arch.native_token())
    }

    fn archive_ext(&self, platform: Platform) -> &'static str {
        platform.os.default_archive_ext()
    }

    fn url(&self, tool: &ResolvedTool) -> String;

    /// How the downloaded artifact is turned into a directory.
    fn archive_format(&self, tool: &ResolvedTool) -> ArchiveFormat {
        ArchiveFormat::from_ext(&tool.ext)
            .unwrap_or_else(|| ArchiveFormat::Binary(tool.platform.exe(&tool.name)))
    }

    /// Fixup applied to the unpacked artifact in `dir` before it is promoted into the cache.
    fn post_download(&self, _tool: &ResolvedTool, _dir: &Path) -> io::Result<()> {
        Ok(())
    }

    /// Directories to put on PATH, highest priority first.
    fn path_entries(&self, tool: &ResolvedTool) -> Vec<PathBuf> {
        vec![tool.cache_dir.clone()]
    }

    /// Logical executable names resolved to absolute paths.
    fn executables(&self, _tool: &ResolvedTool) -> Vec<(&'static str, PathBuf)> {
        Vec::new()
    }

    /// Alternate acquisition used instead of this descriptor on `arch`.
    fn arch_fallback(&self, _arch: Arch) -> Option<Acquisition> {
        None
    }
}

/// A plugin installed from the npm registry into its own prefix.
#[derive(Debug)]
pub struct NodePackage {
    pub name: &'static str,
    /// npm package name, e.g. `@bufbuild/protoc-gen-es`.
    pub package: &'static str,
    pub repo: &'static str,
    /// When false the package's `.bin` directory is kept off PATH and the tool is only
    /// reachable through `executable`.
    pub on_path: bool,
    /// Logical executable name and the `.bin` shim it maps to.
    pub executable: Option<(&'static str, &'static str)>,
}

impl NodePackage {
    pub fn bin_dir(&self, dir: &Path) -> PathBuf {
        dir.join("node_modules").join(".bin")
    }

    pub fn path_entries(&self, dir: &Path) -> Vec<PathBuf> {
        if self.on_path {
            vec![self.bin_dir(dir)]
        } else {
            Vec::new()
        }
    }

    pub fn executables(&self, dir: &Path, platform: Platform) -> Vec<(&'static str, PathBuf)> {
        self.executable
            .iter()
            .map(|(logical, shim)| (*logical, self.bin_dir(dir).join(platform.cmd(shim))))
            .collect()
    }
}

impl Versioned for NodePackage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn repo(&self) -> &'static str {
        self.repo
    }

    // npm dist-tags (`next`, `beta`) are passed through as-is.
    fn normalize_version(&self, version: &str) -> String {
        if version.starts_with(|c: char| c.is_ascii_digit()) {
            with_v_prefix(version)
        } else {
            version.to_string()
        }
    }
}

/// A plugin built from source with `go install <module>@<version>`.
#[derive(Debug)]
pub struct GoModule {
    pub name: &'static str,
    pub repo: &'static str,
    /// Installable package path.
    pub module: &'static str,
    /// Versions are used without a `v` prefix.
    pub bare_version: bool,
    /// Version used when none is configured, skipping the release lookup.
    pub pinned: Option<&'static str>,
}

impl GoModule {
    pub fn bin_dir(&self, dir: &Path) -> PathBuf {
        dir.join("bin")
    }
}

impl Versioned for GoModule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn repo(&self) -> &'static str {
        self.repo
    }

    fn latest_version(&self, _transport: &dyn Transport) -> Option<Result<String>> {
        self.pinned.map(|v| Ok(v.to_string()))
    }

    fn normalize_version(&self, version: &str) -> String {
        if self.bare_version {
            version.trim().to_string()
        } else {
            with_v_prefix(version)
        }
    }
}

/// How a tool is materialized into its cache directory.
#[derive(Clone, Copy)]
pub enum Acquisition {
    Binary(&'static dyn BinarySpec),
    NodePackage(&'static NodePackage),
    GoModule(&'static GoModule),
}

impl fmt::Debug for Acquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Acquisition::Binary(_) => "Binary",
            Acquisition::NodePackage(_) => "NodePackage",
            Acquisition::GoModule(_) => "GoModule",
        };
        write!(f, "{kind}({})", self.name())
    }
}

impl Versioned for Acquisition {
    fn name(&self) -> &'static str {
        match self {
            Acquisition::Binary(b) => b.name(),
            Acquisition::NodePackage(n) => n.name(),
            Acquisition::GoModule(g) => g.name(),
        }
    }

    fn repo(&self) -> &'static str {
        match self {
            Acquisition::Binary(b) => b.repo(),
            Acquisition::NodePackage(n) => n.repo(),
            Acquisition::GoModule(g) => g.repo(),
        }
    }

    fn latest_version(&self, transport: &dyn Transport) -> Option<Result<String>> {
        match self {
            Acquisition::Binary(b) => b.latest_version(transport),
            Acquisition::NodePackage(n) => n.latest_version(transport),
            Acquisition::GoModule(g) => g.latest_version(transport),
        }
    }

    fn normalize_version(&self, version: &str) -> String {
        match self {
            Acquisition::Binary(b) => b.normalize_version(version),
            Acquisition::NodePackage(n) => n.normalize_version(version),
            Acquisition::GoModule(g) => g.normalize_version(version),
        }
    }
}

/// Tools that can be enabled by an invocation, in the order they are provisioned.
///
/// Later tools' PATH entries take precedence over earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolId {
    Protoc,
    ProtocGenGo,
    ProtocGenGoGrpc,
    ProtocGenGrpcJava,
    ProtocGenGrpc,
    ProtocGenGogoFast,
    ProtocGenDoc,
    ProtocGenDocs,
    ProtocGenConnectEs,
    ProtocGenEs,
    ProtocGenGrpcGateway,
    ProtocGenGrpcWeb,
    ProtocGenTs,
    TsProtocGen,
    ProtocGenGolangDeepCopy,
    ProtocGenJsonSchema,
    ProtocGenGolangJsonShim,
    ProtocGenConnectGo,
    ProtocGenValidate,
}

impl ToolId {
    pub const ALL: [ToolId; 19] = [
        ToolId::Protoc,
        ToolId::ProtocGenGo,
        ToolId::ProtocGenGoGrpc,
        ToolId::ProtocGenGrpcJava,
        ToolId::ProtocGenGrpc,
        ToolId::ProtocGenGogoFast,
        ToolId::ProtocGenDoc,
        ToolId::ProtocGenDocs,
        ToolId::ProtocGenConnectEs,
        ToolId::ProtocGenEs,
        ToolId::ProtocGenGrpcGateway,
        ToolId::ProtocGenGrpcWeb,
        ToolId::ProtocGenTs,
        ToolId::TsProtocGen,
        ToolId::ProtocGenGolangDeepCopy,
        ToolId::ProtocGenJsonSchema,
        ToolId::ProtocGenGolangJsonShim,
        ToolId::ProtocGenConnectGo,
        ToolId::ProtocGenValidate,
    ];

    pub fn acquisition(self) -> Acquisition {
        match self {
            ToolId::Protoc => Acquisition::Binary(&binaries::Protoc),
            ToolId::ProtocGenGo => Acquisition::Binary(&binaries::ProtocGenGo),
            ToolId::ProtocGenGoGrpc => Acquisition::Binary(&binaries::ProtocGenGoGrpc),
            ToolId::ProtocGenGrpcJava => Acquisition::Binary(&binaries::ProtocGenGrpcJava),
            ToolId::ProtocGenGrpc => Acquisition::Binary(&binaries::ProtocGenGrpc),
            ToolId::ProtocGenGogoFast => Acquisition::GoModule(&go::PROTOC_GEN_GOGOFAST),
            ToolId::ProtocGenDoc => Acquisition::Binary(&binaries::ProtocGenDoc),
            ToolId::ProtocGenDocs => Acquisition::GoModule(&go::PROTOC_GEN_DOCS),
            ToolId::ProtocGenConnectEs => Acquisition::NodePackage(&node::PROTOC_GEN_CONNECT_ES),
            ToolId::ProtocGenEs => Acquisition::NodePackage(&node::PROTOC_GEN_ES),
            ToolId::ProtocGenGrpcGateway => Acquisition::Binary(&binaries::ProtocGenGrpcGateway),
            ToolId::ProtocGenGrpcWeb => Acquisition::Binary(&binaries::ProtocGenGrpcWeb),
            ToolId::ProtocGenTs => Acquisition::NodePackage(&node::PROTOC_GEN_TS),
            ToolId::TsProtocGen => Acquisition::NodePackage(&node::TS_PROTOC_GEN),
            ToolId::ProtocGenGolangDeepCopy => {
                Acquisition::GoModule(&go::PROTOC_GEN_GOLANG_DEEPCOPY)
            }
            ToolId::ProtocGenJsonSchema => Acquisition::GoModule(&go::PROTOC_GEN_JSONSCHEMA),
            ToolId::ProtocGenGolangJsonShim => {
                Acquisition::GoModule(&go::PROTOC_GEN_GOLANG_JSONSHIM)
            }
            ToolId::ProtocGenConnectGo => Acquisition::GoModule(&go::PROTOC_GEN_CONNECT_GO),
            ToolId::ProtocGenValidate => Acquisition::GoModule(&go::PROTOC_GEN_VALIDATE),
        }
    }

    pub fn name(self) -> &'static str {
        self.acquisition().name()
    }
}

/// Every configurable name: the enabled-tool set plus the runtimes they depend on.
pub fn configurable_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = ToolId::ALL.iter().map(|t| t.name()).collect();
    names.push(binaries::NodeJs.name());
    names.push(binaries::Golang.name());
    names
}
