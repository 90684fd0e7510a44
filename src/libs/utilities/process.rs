// Subprocess execution. Installers (npm, go) and protoc itself all go through
// `CommandRunner` so the assembled command lines can be inspected in tests.

use crate::error::{ProtogError, Result};
use crate::log_debug;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A fully assembled subprocess call.
///
/// `env` is the complete environment of the child: nothing is inherited from the
/// parent process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Short stage label used in errors ("install", "run", ...).
    pub stage: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(String, OsString)>,
}

impl Invocation {
    pub fn new(stage: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            stage: stage.into(),
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Value of an environment variable set on this invocation.
    pub fn env_value(&self, key: &str) -> Option<&OsString> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

pub trait CommandRunner {
    /// Runs the invocation to completion with the caller's stdin/stdout/stderr attached.
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        let program = invocation.program.display().to_string();
        log_debug!(
            "[Process] {} {}",
            program,
            invocation
                .args
                .iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .env_clear()
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ProtogError::Spawn {
                stage: invocation.stage.clone(),
                program: program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ProtogError::Subprocess {
                stage: invocation.stage.clone(),
                program,
                code: status.code(),
            })
        }
    }
}
