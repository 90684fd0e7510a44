// Direct binary installer: downloads a release archive (or a bare executable) from the URL a
// descriptor synthesizes for the host platform and unpacks it into the tool's cache directory.
//
// Flow:
// 1. Delegate to the architecture fallback if the descriptor has one for this host.
// 2. Project the host platform into the tool's OS / arch / extension tokens.
// 3. Resolve the version and compute the cache directory.
// 4. On a cache miss, download, unpack and run the post-download fixup in a staging directory.
// 5. Register PATH entries and executables.

use crate::error::{ProtogError, Result};
use crate::libs::tool_manager::{ToolManager, Toolchain};
use crate::libs::utilities::compression::unpack;
use crate::schemas::tools::ResolvedTool;
use crate::tools::BinarySpec;
use crate::{log_debug, log_info};
use colored::Colorize;

pub fn fetch(
    manager: &ToolManager,
    spec: &'static dyn BinarySpec,
    toolchain: &mut Toolchain,
) -> Result<()> {
    let platform = manager.platform();
    let name = spec.name();

    if let Some(fallback) = spec.arch_fallback(platform.arch) {
        log_info!(
            "[{}] No prebuilt binary for {}, using {:?}",
            name,
            platform,
            fallback
        );
        return manager.fetch(fallback, toolchain);
    }

    let unsupported = || ProtogError::UnsupportedPlatform {
        os: platform.os.native_token().to_string(),
        arch: platform.arch.native_token().to_string(),
        tool: Some(name.to_string()),
    };
    let os = spec.os_token(platform).ok_or_else(unsupported)?;
    let arch = spec.arch_token(platform).ok_or_else(unsupported)?;

    let version = manager.resolve_version(spec)?;
    let tool = ResolvedTool {
        name: name.to_string(),
        cache_dir: manager.cache_dir(name, &version),
        version,
        os: os.to_string(),
        arch: arch.to_string(),
        ext: spec.archive_ext(platform).to_string(),
        platform,
    };
    log_debug!("[{}] Resolved {:?}", name, tool);

    manager.materialize(name, &tool.cache_dir, |staging| {
        let url = spec.url(&tool);
        log_info!("[{}] Fetching {} from {}", name, tool.version.green(), url.cyan());

        let download_dir = tempfile::Builder::new()
            .prefix("protog-download-")
            .tempdir()
            .map_err(|e| ProtogError::io("create download directory", e))?;
        let artifact = download_dir.path().join("artifact");
        manager
            .transport()
            .download(&url, &artifact)
            .map_err(|e| ProtogError::Download {
                tool: name.to_string(),
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let format = spec.archive_format(&tool);
        unpack(&artifact, staging, &format).map_err(|source| ProtogError::Unpack {
            tool: name.to_string(),
            url: url.clone(),
            source,
        })?;

        spec.post_download(&tool, staging)
            .map_err(|source| ProtogError::PostDownload {
                tool: name.to_string(),
                dir: tool.cache_dir.clone(),
                source,
            })
    })?;

    toolchain.prepend(spec.path_entries(&tool));
    for (logical, path) in spec.executables(&tool) {
        toolchain.register(logical, path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::ProtogError;
    use crate::libs::tool_manager::{ToolManager, Toolchain};
    use crate::libs::utilities::fakes::{RecordingRunner, RecordingTransport};
    use crate::libs::utilities::platform::{Arch, Os, Platform};
    use crate::schemas::config::Versions;
    use crate::tools::ToolId;
    use std::io::Write;
    use std::path::PathBuf;

    /// A zip laid out like a protoc release.
    fn protoc_zip() -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            let options = zip::write::FileOptions::default().unix_permissions(0o755);
            zip.start_file("bin/protoc", options).unwrap();
            zip.write_all(b"#!/bin/sh\n").unwrap();
            zip.start_file("include/google/protobuf/empty.proto", options).unwrap();
            zip.write_all(b"syntax = \"proto3\";\n").unwrap();
            zip.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn second_fetch_is_a_cache_hit() {
        let tmp = tempfile::tempdir().unwrap();
        let versions = Versions::new().with("protoc", "3.20.1");
        let transport = RecordingTransport::serving("unused", protoc_zip());
        let runner = RecordingRunner::default();
        let platform = Platform::new(Os::Linux, Arch::X86_64);
        let manager = ToolManager::new(tmp.path().to_path_buf(), &versions, platform, &transport, &runner);

        let mut first = Toolchain::new();
        manager.fetch_tool(ToolId::Protoc, &mut first).unwrap();
        let mut second = Toolchain::new();
        manager.fetch_tool(ToolId::Protoc, &mut second).unwrap();

        assert_eq!(transport.download_count(), 1);
        assert_eq!(
            transport.downloads.borrow()[0],
            "https://github.com/protocolbuffers/protobuf/releases/download/v3.20.1/protoc-3.20.1-linux-x86_64.zip"
        );
        let protoc = tmp.path().join("protoc/v3.20.1/bin/protoc");
        assert!(protoc.exists());
        assert_eq!(first.executable("protoc"), Some(protoc.as_path()));
        assert_eq!(second.executable("protoc"), Some(protoc.as_path()));
        assert_eq!(second.path_entries(), [tmp.path().join("protoc/v3.20.1")]);
    }

    #[cfg(unix)]
    #[test]
    fn bare_binaries_are_made_executable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let versions = Versions::new().with("protoc-gen-grpc-java", "1.49.0");
        let transport = RecordingTransport::new("unused");
        let runner = RecordingRunner::default();
        let platform = Platform::new(Os::Linux, Arch::Arm64);
        let manager = ToolManager::new(tmp.path().to_path_buf(), &versions, platform, &transport, &runner);

        let mut toolchain = Toolchain::new();
        manager.fetch_tool(ToolId::ProtocGenGrpcJava, &mut toolchain).unwrap();

        let binary = tmp.path().join("protoc-gen-grpc-java/v1.49.0/protoc-gen-grpc-java");
        let mode = std::fs::metadata(&binary).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
        assert_eq!(toolchain.path_entries(), [binary.parent().unwrap().to_path_buf()]);
    }

    #[test]
    fn unsupported_platform_fails_before_network() {
        let tmp = tempfile::tempdir().unwrap();
        let versions = Versions::new();
        let transport = RecordingTransport::new("v21.5");
        let runner = RecordingRunner::default();
        let platform = Platform::new(Os::Windows, Arch::Arm64);
        let manager = ToolManager::new(tmp.path().to_path_buf(), &versions, platform, &transport, &runner);

        let err = manager.fetch_tool(ToolId::Protoc, &mut Toolchain::new()).unwrap_err();
        assert!(matches!(err, ProtogError::UnsupportedPlatform { tool: Some(ref t), .. } if t == "protoc"));
        assert_eq!(transport.request_count(), 0);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn corrupt_archive_is_an_unpack_error_and_not_cached() {
        let tmp = tempfile::tempdir().unwrap();
        let versions = Versions::new().with("protoc", "3.20.1");
        let transport = RecordingTransport::serving("unused", b"not a zip".to_vec());
        let runner = RecordingRunner::default();
        let platform = Platform::new(Os::Linux, Arch::X86_64);
        let manager = ToolManager::new(tmp.path().to_path_buf(), &versions, platform, &transport, &runner);

        let err = manager.fetch_tool(ToolId::Protoc, &mut Toolchain::new()).unwrap_err();
        assert!(matches!(err, ProtogError::Unpack { .. }));
        assert!(!PathBuf::from(tmp.path()).join("protoc/v3.20.1").exists());
    }
}
