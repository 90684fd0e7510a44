// Platform classification: maps the host's raw OS / CPU identifiers into the small closed
// set every tool descriptor projects from. Anything outside that set is a hard error;
// tools that only publish for one architecture handle that through their own fallback.

use crate::error::{ProtogError, Result};
use crate::log_debug;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// Supported operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    MacOs,
    Linux,
    Windows,
}

/// Supported CPU architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Arm64,
}

/// A classified host: one OS and one architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Os {
    /// Host-native token, in the `darwin`/`linux`/`windows` spelling most release
    /// artifacts use. Used when a descriptor does not project its own OS token.
    pub fn native_token(self) -> &'static str {
        match self {
            Os::MacOs => "darwin",
            Os::Linux => "linux",
            Os::Windows => "windows",
        }
    }

    /// Default archive extension when a descriptor does not pick one.
    pub fn default_archive_ext(self) -> &'static str {
        match self {
            Os::MacOs | Os::Linux => "tar.gz",
            Os::Windows => "zip",
        }
    }
}

impl Arch {
    /// Host-native token (`amd64`/`arm64`), used when a descriptor does not project its own.
    pub fn native_token(self) -> &'static str {
        match self {
            Arch::X86_64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.native_token(), self.arch.native_token())
    }
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Classifies raw OS / architecture identifiers.
    ///
    /// Accepts the spellings reported by Rust (`std::env::consts`) as well as the
    /// common aliases (`darwin`, `amd64`, `aarch64`). Fails with
    /// [`ProtogError::UnsupportedPlatform`] for anything else.
    pub fn classify(os: &str, arch: &str) -> Result<Self> {
        let unsupported = || ProtogError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
            tool: None,
        };

        let os_kind = match os.to_lowercase().as_str() {
            "macos" | "darwin" => Os::MacOs,
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            _ => return Err(unsupported()),
        };
        let arch_kind = match arch.to_lowercase().as_str() {
            "x86_64" | "amd64" => Arch::X86_64,
            "aarch64" | "arm64" => Arch::Arm64,
            _ => return Err(unsupported()),
        };

        log_debug!("[Platform] Classified {}/{} as {:?}/{:?}", os, arch, os_kind, arch_kind);
        Ok(Self::new(os_kind, arch_kind))
    }

    /// Classifies the platform this binary was built for.
    pub fn host() -> Result<Self> {
        Self::classify(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Appends `.exe` on Windows.
    pub fn exe(&self, name: &str) -> String {
        match self.os {
            Os::Windows => format!("{name}.exe"),
            _ => name.to_string(),
        }
    }

    /// Appends `.cmd` on Windows (npm shims).
    pub fn cmd(&self, name: &str) -> String {
        match self.os {
            Os::Windows => format!("{name}.cmd"),
            _ => name.to_string(),
        }
    }
}

/// Joins PATH entries with the host separator, first entry taking precedence.
pub fn merge_path(entries: &[PathBuf]) -> Result<OsString> {
    std::env::join_paths(entries).map_err(|e| {
        ProtogError::io(
            "merge PATH",
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        )
    })
}
