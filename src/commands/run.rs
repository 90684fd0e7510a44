//! # Invocation Assembler
//!
//! Turns a protoc command line into a protoc run:
//!
//! 1. Scan the arguments for enabled output targets and input files, and create the targets'
//!    output directories.
//! 2. Provision protoc and every enabled tool in declared order, accumulating PATH entries.
//! 3. Inject `--plugin` flags for plugins protoc cannot find by name.
//! 4. Fetch third-party proto includes and add them and the working directory to the
//!    import path.
//! 5. Run protoc with the accumulated PATH as its only environment and the caller's stdio.

use crate::cli::targets::scan;
use crate::error::{ProtogError, Result};
use crate::libs::includes::{ImportScanner, IncludeResolver};
use crate::libs::tool_manager::{ToolManager, Toolchain};
use crate::libs::utilities::platform::Platform;
use crate::libs::utilities::process::{CommandRunner, Invocation};
use crate::libs::utilities::transport::Transport;
use crate::schemas::config::Versions;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// Everything a protoc run depends on besides its arguments.
pub struct Invoker<'a> {
    pub cache_root: PathBuf,
    pub includes_dir: PathBuf,
    /// Directory relative paths in the arguments are resolved against.
    pub working_dir: PathBuf,
    pub versions: &'a Versions,
    pub platform: Platform,
    pub transport: &'a dyn Transport,
    pub runner: &'a dyn CommandRunner,
    pub scanner: &'a dyn ImportScanner,
}

impl Invoker<'_> {
    /// Provisions everything `args` needs and builds the protoc invocation without running it.
    pub fn assemble(&self, args: &[String]) -> Result<Invocation> {
        let scanned = scan(args);
        log_debug!("[Run] Enabled tools: {:?}", scanned.tools);

        for dir in &scanned.out_dirs {
            let dir = self.working_dir.join(dir);
            fs::create_dir_all(&dir)
                .map_err(|e| ProtogError::io(format!("create output directory {}", dir.display()), e))?;
        }

        let manager = ToolManager::new(
            self.cache_root.clone(),
            self.versions,
            self.platform,
            self.transport,
            self.runner,
        );
        let mut toolchain = Toolchain::new();
        for tool in &scanned.tools {
            manager.fetch_tool(*tool, &mut toolchain)?;
        }

        let mut protoc_args: Vec<OsString> = args.iter().map(OsString::from).collect();
        // protoc only finds plugins on PATH under `protoc-gen-<target>`.
        for wiring in &scanned.plugins {
            let executable = toolchain.require(wiring.plugin, wiring.executable)?;
            let mut flag = OsString::from(format!("--plugin={}=", wiring.plugin));
            flag.push(executable);
            protoc_args.push(flag);
        }

        let protos: Vec<PathBuf> = scanned
            .protos
            .iter()
            .map(|proto| self.working_dir.join(proto))
            .collect();
        let resolver = IncludeResolver::new(self.includes_dir.clone(), self.transport, self.scanner);
        let fetched = resolver.fetch_includes(&protos)?;
        if fetched > 0 {
            log_info!("[Run] Fetched {} include tree(s) into {}", fetched, self.includes_dir.display());
        }
        for dir in [&self.includes_dir, &self.working_dir] {
            let mut flag = OsString::from("--proto_path=");
            flag.push(dir);
            protoc_args.push(flag);
        }

        let protoc = toolchain.require("protoc", "protoc")?;
        Ok(Invocation::new("run", protoc)
            .args(protoc_args)
            .env("PATH", toolchain.merged_path()?))
    }

    /// Provisions and runs protoc. A non-zero protoc exit is returned as
    /// [`ProtogError::Subprocess`] carrying protoc's exit code.
    pub fn invoke(&self, args: &[String]) -> Result<()> {
        let invocation = self.assemble(args)?;
        log_info!("[Run] Running {}", invocation.program.display().to_string().cyan());
        self.runner.run(&invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::includes::RegexImportScanner;
    use crate::libs::utilities::fakes::{RecordingRunner, RecordingTransport};
    use crate::libs::utilities::platform::{Arch, Os};
    use std::path::Path;

    /// Pre-populates the cache so no tool needs downloading.
    fn warm_cache(root: &Path) {
        for dir in [
            "protoc/v3.20.1/bin",
            "protoc-gen-go/v1.28.1",
            "protoc-gen-go-grpc/v1.2.0",
            "protoc-gen-grpc/v0aba64fa077ee9e9c2762b883e1c8935c2d0b0a4-d4c05fc7-3960-48e0-aec0-8dfaa8f5016a",
        ] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    fn versions() -> Versions {
        Versions::new()
            .with("protoc", "3.20.1")
            .with("protoc-gen-go", "1.28.1")
    }

    fn strings(inv: &Invocation) -> Vec<String> {
        inv.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn assembles_protoc_command() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("cache");
        let work = tmp.path().join("work");
        warm_cache(&cache);
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join("a.proto"), "syntax = \"proto3\";\n").unwrap();

        let versions = versions();
        let transport = RecordingTransport::new("unused");
        let runner = RecordingRunner::default();
        let scanner = RegexImportScanner::new();
        let invoker = Invoker {
            cache_root: cache.clone(),
            includes_dir: work.join("build/proto-includes"),
            working_dir: work.clone(),
            versions: &versions,
            platform: Platform::new(Os::Linux, Arch::X86_64),
            transport: &transport,
            runner: &runner,
            scanner: &scanner,
        };

        let args: Vec<String> = ["--go_out=paths=source_relative:gen/go", "--go-grpc_out=gen/go", "a.proto"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        invoker.invoke(&args).unwrap();

        assert_eq!(transport.request_count(), 0);
        assert_eq!(runner.call_count(), 1);
        let call = runner.calls.borrow()[0].clone();
        assert_eq!(call.program, cache.join("protoc/v3.20.1/bin/protoc"));
        assert_eq!(
            strings(&call),
            vec![
                "--go_out=paths=source_relative:gen/go".to_string(),
                "--go-grpc_out=gen/go".to_string(),
                "a.proto".to_string(),
                format!("--proto_path={}", work.join("build/proto-includes").display()),
                format!("--proto_path={}", work.display()),
            ]
        );
        assert!(work.join("gen/go").is_dir());
        // Targets absent from the arguments get no directory.
        assert!(!work.join("gen/java").exists());
        let created: Vec<_> = fs::read_dir(work.join("gen")).unwrap().collect();
        assert_eq!(created.len(), 1);

        // Later-declared tools come first on PATH.
        let path: Vec<PathBuf> = std::env::split_paths(call.env_value("PATH").unwrap()).collect();
        assert_eq!(
            path,
            vec![
                cache.join("protoc-gen-go-grpc/v1.2.0"),
                cache.join("protoc-gen-go/v1.28.1"),
                cache.join("protoc/v3.20.1"),
            ]
        );
        assert_eq!(call.env.len(), 1);
    }

    #[test]
    fn plugin_flag_is_injected_once_per_target() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("cache");
        warm_cache(&cache);
        let versions = versions();
        let transport = RecordingTransport::new("unused");
        let runner = RecordingRunner::default();
        let scanner = RegexImportScanner::new();
        let invoker = Invoker {
            cache_root: cache.clone(),
            includes_dir: tmp.path().join("includes"),
            working_dir: tmp.path().to_path_buf(),
            versions: &versions,
            platform: Platform::new(Os::Linux, Arch::X86_64),
            transport: &transport,
            runner: &runner,
            scanner: &scanner,
        };

        let args: Vec<String> = ["--grpc_cpp_out=gen", "--grpc_cpp_out", "gen2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let invocation = invoker.assemble(&args).unwrap();

        let grpc_dir = cache.join("protoc-gen-grpc/v0aba64fa077ee9e9c2762b883e1c8935c2d0b0a4-d4c05fc7-3960-48e0-aec0-8dfaa8f5016a");
        let plugin_flags: Vec<String> = strings(&invocation)
            .into_iter()
            .filter(|a| a.starts_with("--plugin="))
            .collect();
        assert_eq!(
            plugin_flags,
            vec![format!("--plugin=protoc-gen-grpc_cpp={}", grpc_dir.join("grpc_cpp_plugin").display())]
        );
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn archive_outputs_create_only_their_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("cache");
        warm_cache(&cache);
        let versions = versions();
        let transport = RecordingTransport::new("unused");
        let runner = RecordingRunner::default();
        let scanner = RegexImportScanner::new();
        let invoker = Invoker {
            cache_root: cache,
            includes_dir: tmp.path().join("includes"),
            working_dir: tmp.path().to_path_buf(),
            versions: &versions,
            platform: Platform::new(Os::Linux, Arch::X86_64),
            transport: &transport,
            runner: &runner,
            scanner: &scanner,
        };

        let args: Vec<String> = ["--java_out=gen/java/api.jar", "--python_out=gen/py.zip"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        invoker.assemble(&args).unwrap();

        assert!(tmp.path().join("gen/java").is_dir());
        assert!(!tmp.path().join("gen/java/api.jar").exists());
        assert!(!tmp.path().join("gen/py.zip").exists());
    }

    #[test]
    fn protoc_failure_keeps_exit_code() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("cache");
        warm_cache(&cache);
        let versions = versions();
        let transport = RecordingTransport::new("unused");
        let runner = RecordingRunner::with_effect(|inv| {
            Err(ProtogError::Subprocess {
                stage: inv.stage.clone(),
                program: "protoc".into(),
                code: Some(2),
            })
        });
        let scanner = RegexImportScanner::new();
        let invoker = Invoker {
            cache_root: cache,
            includes_dir: tmp.path().join("includes"),
            working_dir: tmp.path().to_path_buf(),
            versions: &versions,
            platform: Platform::new(Os::Linux, Arch::X86_64),
            transport: &transport,
            runner: &runner,
            scanner: &scanner,
        };

        let err = invoker.invoke(&["--cpp_out=gen".to_string()]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
