// Tools distributed as prebuilt release archives or bare binaries.
//
// Each descriptor only overrides what its release naming needs; see `BinarySpec` for defaults.

use super::{Acquisition, BinarySpec, Versioned, go};
use crate::error::{ProtogError, Result};
use crate::libs::utilities::binary::make_executable;
use crate::libs::utilities::compression::ArchiveFormat;
use crate::libs::utilities::platform::{Arch, Os, Platform};
use crate::libs::utilities::transport::Transport;
use crate::libs::version_resolver::with_v_prefix;
use crate::schemas::tools::ResolvedTool;
use std::io;
use std::path::{Path, PathBuf};

/// Single-file download stored as `<name>[.exe]` in the cache directory.
fn bare_binary(tool: &ResolvedTool) -> ArchiveFormat {
    ArchiveFormat::Binary(tool.platform.exe(&tool.name))
}

fn chmod_bare_binary(tool: &ResolvedTool, dir: &Path) -> io::Result<()> {
    make_executable(&dir.join(tool.platform.exe(&tool.name)))
}

fn windows_suffix(tool: &ResolvedTool) -> &'static str {
    match tool.platform.os {
        Os::Windows => ".exe",
        _ => "",
    }
}

/// The protocol buffer compiler.
pub struct Protoc;

impl Versioned for Protoc {
    fn name(&self) -> &'static str {
        "protoc"
    }

    fn repo(&self) -> &'static str {
        "github.com/protocolbuffers/protobuf"
    }
}

impl BinarySpec for Protoc {
    fn os_token(&self, platform: Platform) -> Option<&'static str> {
        Some(match platform.os {
            Os::MacOs => "osx",
            Os::Linux => "linux",
            Os::Windows => "win",
        })
    }

    fn arch_token(&self, platform: Platform) -> Option<&'static str> {
        match (platform.os, platform.arch) {
            (Os::Windows, Arch::Arm64) => None,
            (_, Arch::X86_64) => Some("x86_64"),
            (_, Arch::Arm64) => Some("aarch_64"),
        }
    }

    fn archive_ext(&self, _platform: Platform) -> &'static str {
        "zip"
    }

    fn url(&self, tool: &ResolvedTool) -> String {
        // Windows builds are named by pointer width instead of os-arch.
        let suffix = match tool.platform.os {
            Os::Windows => "win64".to_string(),
            _ => format!("{}-{}", tool.os, tool.arch),
        };
        format!(
            "https://github.com/protocolbuffers/protobuf/releases/download/{}/protoc-{}-{}.zip",
            tool.version,
            tool.bare_version(),
            suffix
        )
    }

    fn executables(&self, tool: &ResolvedTool) -> Vec<(&'static str, PathBuf)> {
        vec![(
            "protoc",
            tool.cache_dir.join("bin").join(tool.platform.exe("protoc")),
        )]
    }
}

pub struct ProtocGenGo;

impl Versioned for ProtocGenGo {
    fn name(&self) -> &'static str {
        "protoc-gen-go"
    }

    fn repo(&self) -> &'static str {
        "github.com/protocolbuffers/protobuf-go"
    }
}

impl BinarySpec for ProtocGenGo {
    fn url(&self, tool: &ResolvedTool) -> String {
        format!(
            "https://github.com/protocolbuffers/protobuf-go/releases/download/{v}/protoc-gen-go.{v}.{}.{}.{}",
            tool.os,
            tool.arch,
            tool.ext,
            v = tool.version
        )
    }
}

/// Only amd64 binaries are published; ARM64 hosts build from source instead.
pub struct ProtocGenGoGrpc;

impl Versioned for ProtocGenGoGrpc {
    fn name(&self) -> &'static str {
        "protoc-gen-go-grpc"
    }

    fn repo(&self) -> &'static str {
        "github.com/grpc/grpc-go"
    }

    // The repository's latest release is grpc-go itself, not the plugin.
    fn latest_version(&self, _transport: &dyn Transport) -> Option<Result<String>> {
        Some(Ok(go::PROTOC_GEN_GO_GRPC_VERSION.to_string()))
    }
}

impl BinarySpec for ProtocGenGoGrpc {
    fn arch_token(&self, _platform: Platform) -> Option<&'static str> {
        Some("amd64")
    }

    fn archive_ext(&self, _platform: Platform) -> &'static str {
        "tar.gz"
    }

    fn url(&self, tool: &ResolvedTool) -> String {
        format!(
            "https://github.com/grpc/grpc-go/releases/download/cmd%2Fprotoc-gen-go-grpc%2F{v}/protoc-gen-go-grpc.{v}.{}.{}.tar.gz",
            tool.os,
            tool.arch,
            v = tool.version
        )
    }

    fn arch_fallback(&self, arch: Arch) -> Option<Acquisition> {
        match arch {
            Arch::Arm64 => Some(Acquisition::GoModule(&go::PROTOC_GEN_GO_GRPC_SOURCE)),
            Arch::X86_64 => None,
        }
    }
}

/// Native gRPC plugins (C++, C#, Objective-C, Node, PHP, Python, Ruby) from a pinned
/// packages.grpc.io build. Only x64 builds exist.
pub struct ProtocGenGrpc;

const GRPC_BUILD: &str = "0aba64fa077ee9e9c2762b883e1c8935c2d0b0a4-d4c05fc7-3960-48e0-aec0-8dfaa8f5016a";

/// Logical names of the executables shipped in the gRPC plugin archive.
pub const GRPC_PLUGINS: [&str; 7] = [
    "grpc_cpp_plugin",
    "grpc_csharp_plugin",
    "grpc_objective_c_plugin",
    "grpc_node_plugin",
    "grpc_php_plugin",
    "grpc_python_plugin",
    "grpc_ruby_plugin",
];

impl Versioned for ProtocGenGrpc {
    fn name(&self) -> &'static str {
        "protoc-gen-grpc"
    }

    fn repo(&self) -> &'static str {
        "github.com/grpc/grpc"
    }

    fn latest_version(&self, _transport: &dyn Transport) -> Option<Result<String>> {
        Some(Ok(GRPC_BUILD.to_string()))
    }
}

impl BinarySpec for ProtocGenGrpc {
    fn os_token(&self, platform: Platform) -> Option<&'static str> {
        Some(match platform.os {
            Os::MacOs => "macos",
            Os::Linux => "linux",
            Os::Windows => "windows",
        })
    }

    fn arch_token(&self, _platform: Platform) -> Option<&'static str> {
        Some("x64")
    }

    fn url(&self, tool: &ResolvedTool) -> String {
        format!(
            "https://packages.grpc.io/archive/2022/07/{}/protoc/grpc-protoc_{}_{}-1.49.0-dev.{}",
            tool.bare_version(),
            tool.os,
            tool.arch,
            tool.ext
        )
    }

    fn executables(&self, tool: &ResolvedTool) -> Vec<(&'static str, PathBuf)> {
        GRPC_PLUGINS
            .iter()
            .map(|plugin| (*plugin, tool.cache_dir.join(tool.platform.exe(plugin))))
            .collect()
    }
}

pub struct ProtocGenGrpcGateway;

impl Versioned for ProtocGenGrpcGateway {
    fn name(&self) -> &'static str {
        "protoc-gen-grpc-gateway"
    }

    fn repo(&self) -> &'static str {
        "github.com/grpc-ecosystem/grpc-gateway"
    }
}

impl BinarySpec for ProtocGenGrpcGateway {
    fn arch_token(&self, platform: Platform) -> Option<&'static str> {
        Some(match platform.arch {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "arm64",
        })
    }

    fn url(&self, tool: &ResolvedTool) -> String {
        format!(
            "https://github.com/grpc-ecosystem/grpc-gateway/releases/download/{v}/protoc-gen-grpc-gateway-{v}-{}-{}{}",
            tool.os,
            tool.arch,
            windows_suffix(tool),
            v = tool.version
        )
    }

    fn archive_format(&self, tool: &ResolvedTool) -> ArchiveFormat {
        bare_binary(tool)
    }

    fn post_download(&self, tool: &ResolvedTool, dir: &Path) -> io::Result<()> {
        chmod_bare_binary(tool, dir)
    }
}

/// Published to Maven Central as a bare executable.
pub struct ProtocGenGrpcJava;

impl Versioned for ProtocGenGrpcJava {
    fn name(&self) -> &'static str {
        "protoc-gen-grpc-java"
    }

    fn repo(&self) -> &'static str {
        "github.com/grpc/grpc-java"
    }
}

impl BinarySpec for ProtocGenGrpcJava {
    fn os_token(&self, platform: Platform) -> Option<&'static str> {
        Some(match platform.os {
            Os::MacOs => "osx",
            Os::Linux => "linux",
            Os::Windows => "windows",
        })
    }

    fn arch_token(&self, platform: Platform) -> Option<&'static str> {
        Some(match platform.arch {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "aarch_64",
        })
    }

    fn url(&self, tool: &ResolvedTool) -> String {
        format!(
            "https://repo1.maven.org/maven2/io/grpc/protoc-gen-grpc-java/{v}/protoc-gen-grpc-java-{v}-{}-{}.exe",
            tool.os,
            tool.arch,
            v = tool.bare_version()
        )
    }

    fn archive_format(&self, tool: &ResolvedTool) -> ArchiveFormat {
        bare_binary(tool)
    }

    fn post_download(&self, tool: &ResolvedTool, dir: &Path) -> io::Result<()> {
        chmod_bare_binary(tool, dir)
    }
}

pub struct ProtocGenDoc;

impl Versioned for ProtocGenDoc {
    fn name(&self) -> &'static str {
        "protoc-gen-doc"
    }

    fn repo(&self) -> &'static str {
        "github.com/pseudomuto/protoc-gen-doc"
    }
}

impl BinarySpec for ProtocGenDoc {
    fn archive_ext(&self, _platform: Platform) -> &'static str {
        "tar.gz"
    }

    fn url(&self, tool: &ResolvedTool) -> String {
        format!(
            "https://github.com/pseudomuto/protoc-gen-doc/releases/download/{}/protoc-gen-doc_{}_{}_{}.{}",
            tool.version,
            tool.bare_version(),
            tool.os,
            tool.arch,
            tool.ext
        )
    }
}

pub struct ProtocGenGrpcWeb;

impl Versioned for ProtocGenGrpcWeb {
    fn name(&self) -> &'static str {
        "protoc-gen-grpc-web"
    }

    fn repo(&self) -> &'static str {
        "github.com/grpc/grpc-web"
    }
}

impl BinarySpec for ProtocGenGrpcWeb {
    fn arch_token(&self, platform: Platform) -> Option<&'static str> {
        Some(match platform.arch {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "aarch64",
        })
    }

    fn url(&self, tool: &ResolvedTool) -> String {
        match tool.platform.arch {
            Arch::X86_64 => format!(
                "https://github.com/grpc/grpc-web/releases/download/{v}/protoc-gen-grpc-web-{v}-{}-{}{}",
                tool.os,
                tool.arch,
                windows_suffix(tool),
                v = tool.bare_version()
            ),
            // Upstream ARM64 builds are only available as CI artifacts.
            Arch::Arm64 => format!(
                "https://github.com/curioswitch/scratch/releases/download/grpc-web-test/protoc-gen-grpc-web-20220613-{}-{}{}",
                tool.os,
                tool.arch,
                windows_suffix(tool)
            ),
        }
    }

    fn archive_format(&self, tool: &ResolvedTool) -> ArchiveFormat {
        bare_binary(tool)
    }

    fn post_download(&self, tool: &ResolvedTool, dir: &Path) -> io::Result<()> {
        chmod_bare_binary(tool, dir)
    }
}

/// Node.js runtime, provisioned before any npm-distributed plugin.
pub struct NodeJs;

impl NodeJs {
    fn home(tool: &ResolvedTool) -> PathBuf {
        tool.cache_dir
            .join(format!("node-{}-{}-{}", tool.version, tool.os, tool.arch))
    }
}

impl Versioned for NodeJs {
    fn name(&self) -> &'static str {
        "nodejs"
    }

    fn repo(&self) -> &'static str {
        "github.com/nodejs/node"
    }
}

impl BinarySpec for NodeJs {
    fn os_token(&self, platform: Platform) -> Option<&'static str> {
        Some(match platform.os {
            Os::MacOs => "darwin",
            Os::Linux => "linux",
            Os::Windows => "win",
        })
    }

    fn arch_token(&self, platform: Platform) -> Option<&'static str> {
        Some(match platform.arch {
            Arch::X86_64 => "x64",
            Arch::Arm64 => "arm64",
        })
    }

    fn url(&self, tool: &ResolvedTool) -> String {
        format!(
            "https://nodejs.org/dist/{v}/node-{v}-{}-{}.{}",
            tool.os,
            tool.arch,
            tool.ext,
            v = tool.version
        )
    }

    fn path_entries(&self, tool: &ResolvedTool) -> Vec<PathBuf> {
        match tool.platform.os {
            Os::Windows => vec![Self::home(tool)],
            _ => vec![Self::home(tool).join("bin")],
        }
    }

    fn executables(&self, tool: &ResolvedTool) -> Vec<(&'static str, PathBuf)> {
        let home = Self::home(tool);
        match tool.platform.os {
            Os::Windows => vec![
                ("node", home.join("node.exe")),
                ("npm", home.join("npm.cmd")),
            ],
            _ => vec![
                ("node", home.join("bin").join("node")),
                (
                    "npm",
                    home.join("lib")
                        .join("node_modules")
                        .join("npm")
                        .join("bin")
                        .join("npm-cli.js"),
                ),
            ],
        }
    }
}

/// Go toolchain, provisioned before any source-built plugin.
pub struct Golang;

const GO_VERSION_URL: &str = "https://go.dev/VERSION?m=text";

impl Versioned for Golang {
    fn name(&self) -> &'static str {
        "golang"
    }

    fn repo(&self) -> &'static str {
        "github.com/golang/go"
    }

    // Go is not released through GitHub; go.dev answers with e.g. "go1.19.3\ntime ...".
    fn latest_version(&self, transport: &dyn Transport) -> Option<Result<String>> {
        let resolved = transport
            .get_text(GO_VERSION_URL)
            .map_err(|e| ProtogError::VersionResolution {
                tool: self.name().to_string(),
                repo: GO_VERSION_URL.to_string(),
                reason: e.to_string(),
            })
            .and_then(|body| {
                body.lines()
                    .next()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| ProtogError::VersionResolution {
                        tool: self.name().to_string(),
                        repo: GO_VERSION_URL.to_string(),
                        reason: "empty response".to_string(),
                    })
            });
        Some(resolved)
    }

    fn normalize_version(&self, version: &str) -> String {
        let version = version.trim();
        with_v_prefix(version.strip_prefix("go").unwrap_or(version))
    }
}

impl BinarySpec for Golang {
    fn url(&self, tool: &ResolvedTool) -> String {
        format!(
            "https://go.dev/dl/go{}.{}-{}.{}",
            tool.bare_version(),
            tool.os,
            tool.arch,
            tool.ext
        )
    }

    fn path_entries(&self, tool: &ResolvedTool) -> Vec<PathBuf> {
        vec![tool.cache_dir.join("go").join("bin")]
    }

    fn executables(&self, tool: &ResolvedTool) -> Vec<(&'static str, PathBuf)> {
        vec![(
            "go",
            tool.cache_dir.join("go").join("bin").join(tool.platform.exe("go")),
        )]
    }
}
