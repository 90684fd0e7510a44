//! Error taxonomy for tool provisioning and invocation.
//!
//! Every variant names the tool (or program) involved and the stage that failed,
//! so a single line of output is enough to tell what went wrong and where.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProtogError>;

#[derive(Debug, Error)]
pub enum ProtogError {
    /// The host OS/CPU pair is outside the supported {macOS, Linux, Windows} x {x86-64, ARM64} set,
    /// or a tool publishes nothing for the classified platform.
    #[error("unsupported platform {os}/{arch}{}", .tool.as_ref().map(|t| format!(" for {t}")).unwrap_or_default())]
    UnsupportedPlatform {
        os: String,
        arch: String,
        tool: Option<String>,
    },

    /// Looking up the version to use failed (network error or malformed response).
    #[error("resolve {tool}: could not determine version from {repo}: {reason}")]
    VersionResolution {
        tool: String,
        repo: String,
        reason: String,
    },

    /// The artifact could not be downloaded.
    #[error("fetch {tool}: downloading {url} failed: {reason}")]
    Download {
        tool: String,
        url: String,
        reason: String,
    },

    /// The artifact was downloaded but could not be unpacked.
    #[error("unpack {tool}: extracting {url} failed: {source}")]
    Unpack {
        tool: String,
        url: String,
        #[source]
        source: io::Error,
    },

    /// The post-download fixup (permission bits, cleanup) failed.
    #[error("fixup {tool}: post-download step in {} failed: {source}", .dir.display())]
    PostDownload {
        tool: String,
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A subprocess (installer or protoc) exited unsuccessfully.
    #[error("{stage} {program}: exited with {}", .code.map(|c| format!("status {c}")).unwrap_or_else(|| "a signal".to_string()))]
    Subprocess {
        stage: String,
        program: String,
        code: Option<i32>,
    },

    /// A subprocess could not be launched at all.
    #[error("{stage} {program}: could not launch: {source}")]
    Spawn {
        stage: String,
        program: String,
        #[source]
        source: io::Error,
    },

    /// A tool needed by a later stage was not registered by the fetch that should have provided it.
    #[error("{tool}: executable {executable} was not registered")]
    MissingExecutable { tool: String, executable: String },

    /// Fetching or scanning proto imports failed.
    #[error("includes {prefix}: {reason}")]
    Includes { prefix: String, reason: String },

    /// Invalid configuration file or value.
    #[error("config: {0}")]
    Config(String),

    /// Filesystem error outside of the more specific stages above.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ProtogError {
    /// Wraps an [`io::Error`] with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Exit status to propagate from the binary. Subprocess failures keep the child's code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Subprocess { code: Some(c), .. } => *c,
            _ => 1,
        }
    }
}
