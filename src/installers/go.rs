// Source-build installer: provisions the Go toolchain, then builds the plugin with
// `go install <module>@<version>` using the staging directory as GOPATH. Build and module
// caches are scoped to that directory and removed before it is promoted, leaving only `bin/`.

use crate::error::{ProtogError, Result};
use crate::libs::tool_manager::{ToolManager, Toolchain};
use crate::libs::utilities::binary::remove_dir_if_present;
use crate::libs::utilities::process::Invocation;
use crate::log_info;
use crate::tools::binaries::Golang;
use crate::tools::{Acquisition, GoModule, Versioned};
use std::ffi::OsString;
use std::path::Path;

const BUILD_CACHE: &str = ".gocache";

/// Environment for `go` subprocesses building into `gopath`. Nothing is inherited from the
/// caller, so results do not depend on the user's Go setup.
fn build_env(gopath: &Path, path: &OsString) -> Vec<(String, OsString)> {
    vec![
        ("GOPATH".to_string(), gopath.as_os_str().to_owned()),
        ("GOCACHE".to_string(), gopath.join(BUILD_CACHE).into_os_string()),
        ("CGO_ENABLED".to_string(), OsString::from("0")),
        ("GOTOOLCHAIN".to_string(), OsString::from("local")),
        // Lets the module cache be deleted afterwards.
        ("GOFLAGS".to_string(), OsString::from("-modcacherw")),
        ("PATH".to_string(), path.clone()),
    ]
}

fn go_command(stage: &str, go: &Path, env: &[(String, OsString)]) -> Invocation {
    env.iter()
        .fold(Invocation::new(stage, go), |inv, (k, v)| inv.env(k.as_str(), v.clone()))
}

pub fn fetch(manager: &ToolManager, module: &'static GoModule, toolchain: &mut Toolchain) -> Result<()> {
    manager.fetch(Acquisition::Binary(&Golang), toolchain)?;

    let version = manager.resolve_version(module)?;
    let dir = manager.cache_dir(module.name(), &version);
    let go = toolchain.require(module.name(), "go")?.to_path_buf();
    let path = toolchain.merged_path()?;

    manager.materialize(module.name(), &dir, |staging| {
        log_info!("[{}] Building {}@{} from source", module.name(), module.module, version);
        let env = build_env(staging, &path);

        let install = go_command("install", &go, &env)
            .arg("install")
            .arg(format!("{}@{}", module.module, version));
        manager.runner().run(&install)?;

        let clean = go_command("clean", &go, &env).args(["clean", "-modcache"]);
        manager.runner().run(&clean)?;

        remove_dir_if_present(&staging.join(BUILD_CACHE))
            .map_err(|source| ProtogError::PostDownload {
                tool: module.name().to_string(),
                dir: dir.clone(),
                source,
            })
    })?;

    toolchain.prepend(vec![module.bin_dir(&dir)]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::libs::tool_manager::{ToolManager, Toolchain};
    use crate::libs::utilities::fakes::{RecordingRunner, RecordingTransport};
    use crate::libs::utilities::platform::{Arch, Os, Platform};
    use crate::schemas::config::Versions;
    use crate::tools::ToolId;
    use std::ffi::OsString;
    use std::fs;
    use std::path::PathBuf;

    fn with_go(tmp: &std::path::Path) {
        fs::create_dir_all(tmp.join("golang/v1.19.3/go/bin")).unwrap();
    }

    /// Simulates `go install` writing a binary and a build cache into GOPATH.
    fn fake_go() -> RecordingRunner {
        RecordingRunner::with_effect(|inv| {
            if inv.args.first().map(|a| a == "install").unwrap_or(false) {
                let gopath = PathBuf::from(inv.env_value("GOPATH").unwrap());
                fs::create_dir_all(gopath.join("bin")).unwrap();
                fs::create_dir_all(gopath.join(".gocache/00")).unwrap();
                fs::write(gopath.join("bin/protoc-gen-validate"), b"bin").unwrap();
            }
            Ok(())
        })
    }

    #[test]
    fn builds_with_isolated_environment() {
        let tmp = tempfile::tempdir().unwrap();
        with_go(tmp.path());
        let versions = Versions::new()
            .with("golang", "1.19.3")
            .with("protoc-gen-validate", "0.6.7");
        let transport = RecordingTransport::new("unused");
        let runner = fake_go();
        let platform = Platform::new(Os::Linux, Arch::X86_64);
        let manager = ToolManager::new(tmp.path().to_path_buf(), &versions, platform, &transport, &runner);

        let mut toolchain = Toolchain::new();
        manager.fetch_tool(ToolId::ProtocGenValidate, &mut toolchain).unwrap();

        assert_eq!(
            runner.arg_lists(),
            vec![
                vec!["install".to_string(), "github.com/envoyproxy/protoc-gen-validate@v0.6.7".to_string()],
                vec!["clean".to_string(), "-modcache".to_string()],
            ]
        );
        let install = runner.calls.borrow()[0].clone();
        assert_eq!(install.program, tmp.path().join("golang/v1.19.3/go/bin/go"));
        assert_eq!(install.env_value("CGO_ENABLED"), Some(&OsString::from("0")));
        assert_eq!(install.env_value("GOTOOLCHAIN"), Some(&OsString::from("local")));
        assert!(install.env_value("HOME").is_none());

        let dir = tmp.path().join("protoc-gen-validate/v0.6.7");
        assert!(dir.join("bin/protoc-gen-validate").exists());
        assert!(!dir.join(".gocache").exists());
        assert_eq!(toolchain.path_entries()[0], dir.join("bin"));
    }

    #[test]
    fn arm_hosts_build_go_grpc_from_source() {
        let tmp = tempfile::tempdir().unwrap();
        with_go(tmp.path());
        let versions = Versions::new().with("golang", "1.19.3");
        let transport = RecordingTransport::new("unused");
        let runner = RecordingRunner::default();
        let platform = Platform::new(Os::MacOs, Arch::Arm64);
        let manager = ToolManager::new(tmp.path().to_path_buf(), &versions, platform, &transport, &runner);

        manager
            .fetch_tool(ToolId::ProtocGenGoGrpc, &mut Toolchain::new())
            .unwrap();

        assert_eq!(transport.download_count(), 0);
        assert_eq!(
            runner.arg_lists()[0][1],
            "google.golang.org/grpc/cmd/protoc-gen-go-grpc@v1.2.0"
        );
        assert!(tmp.path().join("protoc-gen-go-grpc/v1.2.0").exists());
    }

    #[test]
    fn failed_build_is_not_cached() {
        let tmp = tempfile::tempdir().unwrap();
        with_go(tmp.path());
        let versions = Versions::new()
            .with("golang", "1.19.3")
            .with("protoc-gen-jsonschema", "1.3.0");
        let transport = RecordingTransport::new("unused");
        let runner = RecordingRunner::with_effect(|inv| {
            Err(crate::error::ProtogError::Subprocess {
                stage: inv.stage.clone(),
                program: "go".into(),
                code: Some(1),
            })
        });
        let platform = Platform::new(Os::Linux, Arch::X86_64);
        let manager = ToolManager::new(tmp.path().to_path_buf(), &versions, platform, &transport, &runner);

        let err = manager
            .fetch_tool(ToolId::ProtocGenJsonSchema, &mut Toolchain::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "install go: exited with status 1");
        assert!(!tmp.path().join("protoc-gen-jsonschema/1.3.0").exists());
    }
}
