//! # Proto Includes
//!
//! protoc fails on imports it cannot find, and many popular imports (googleapis, gogoproto,
//! validate rules, Kubernetes types) are not bundled with it. Before running protoc, every input
//! `.proto` file is scanned for imports; an import under a known prefix causes the matching
//! source subtree to be downloaded from GitHub into the includes directory, which is then passed
//! to protoc with `--proto_path`.
//!
//! Scanning is a pattern match rather than a parse, since the files being scanned reference
//! imports that do not exist yet. A subtree is fetched only if its destination directory is
//! missing; there is no version pinning beyond the branch named in [`INCLUDE_SPECS`].

use crate::error::{ProtogError, Result};
use crate::libs::utilities::compression::{ArchiveFormat, unpack};
use crate::libs::utilities::transport::Transport;
use crate::{log_debug, log_info, log_warn};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// A proto import prefix and the GitHub source it is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeSpec {
    pub prefix: &'static str,
    /// `github.com/<owner>/<repo>`.
    pub repo: &'static str,
    /// Branch to download.
    pub git_ref: &'static str,
    /// Subdirectory of the repository to keep. Empty keeps the whole repository.
    pub repo_dir: &'static str,
    /// Destination relative to the includes directory.
    pub dir: &'static str,
}

impl IncludeSpec {
    pub fn archive_url(&self) -> String {
        format!("https://{}/archive/refs/heads/{}.zip", self.repo, self.git_ref)
    }

    /// Path of the kept subtree inside the extracted archive.
    pub fn archive_subtree(&self) -> PathBuf {
        let repo_name = self.repo.rsplit('/').next().unwrap_or(self.repo);
        let top = PathBuf::from(format!("{}-{}", repo_name, self.git_ref));
        if self.repo_dir.is_empty() {
            top
        } else {
            top.join(self.repo_dir)
        }
    }
}

pub static INCLUDE_SPECS: [IncludeSpec; 6] = [
    IncludeSpec {
        prefix: "google/api/",
        repo: "github.com/googleapis/googleapis",
        git_ref: "master",
        repo_dir: "google",
        dir: "google",
    },
    IncludeSpec {
        prefix: "google/rpc/",
        repo: "github.com/googleapis/googleapis",
        git_ref: "master",
        repo_dir: "google",
        dir: "google",
    },
    IncludeSpec {
        prefix: "gogoproto/",
        repo: "github.com/gogo/protobuf",
        git_ref: "master",
        repo_dir: "gogoproto",
        dir: "gogoproto",
    },
    IncludeSpec {
        prefix: "k8s.io/api/",
        repo: "github.com/kubernetes/api",
        git_ref: "master",
        repo_dir: "",
        dir: "k8s.io/api",
    },
    IncludeSpec {
        prefix: "k8s.io/apimachinery/",
        repo: "github.com/kubernetes/apimachinery",
        git_ref: "master",
        repo_dir: "",
        dir: "k8s.io/apimachinery",
    },
    IncludeSpec {
        prefix: "validate/",
        repo: "github.com/envoyproxy/protoc-gen-validate",
        git_ref: "main",
        repo_dir: "validate",
        dir: "validate",
    },
];

/// The include mapping with the longest prefix of `import`, if any.
pub fn match_import<'s>(specs: &'s [IncludeSpec], import: &str) -> Option<&'s IncludeSpec> {
    specs
        .iter()
        .filter(|spec| import.starts_with(spec.prefix))
        .max_by_key(|spec| spec.prefix.len())
}

/// Extracts imported paths from the text of a `.proto` file.
pub trait ImportScanner {
    fn imports(&self, source: &str) -> Vec<String>;
}

/// Matches `import "x";`, `import public "x";` and `import weak "x";` anywhere in the text.
pub struct RegexImportScanner {
    pattern: Regex,
}

impl Default for RegexImportScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexImportScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r#"import\s+(?:public\s+|weak\s+)?"([^"]+)"\s*;"#).expect("valid regex"),
        }
    }
}

impl ImportScanner for RegexImportScanner {
    fn imports(&self, source: &str) -> Vec<String> {
        self.pattern
            .captures_iter(source)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

pub struct IncludeResolver<'a> {
    dir: PathBuf,
    transport: &'a dyn Transport,
    scanner: &'a dyn ImportScanner,
    specs: &'a [IncludeSpec],
}

impl<'a> IncludeResolver<'a> {
    pub fn new(dir: PathBuf, transport: &'a dyn Transport, scanner: &'a dyn ImportScanner) -> Self {
        Self {
            dir,
            transport,
            scanner,
            specs: &INCLUDE_SPECS,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fetches every missing include referenced by `protos`. Returns how many subtrees were
    /// downloaded.
    pub fn fetch_includes(&self, protos: &[PathBuf]) -> Result<usize> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ProtogError::io(format!("create {}", self.dir.display()), e))?;

        let mut fetched = 0;
        for proto in protos {
            let source = fs::read_to_string(proto)
                .map_err(|e| ProtogError::io(format!("read {}", proto.display()), e))?;
            for import in self.scanner.imports(&source) {
                let Some(spec) = match_import(self.specs, &import) else {
                    continue;
                };
                if self.fetch_spec(spec)? {
                    fetched += 1;
                }
            }
        }
        Ok(fetched)
    }

    /// Downloads the subtree for `spec` unless its destination exists. Returns whether a
    /// download happened.
    pub fn fetch_spec(&self, spec: &IncludeSpec) -> Result<bool> {
        let dest = self.dir.join(spec.dir);
        if dest.exists() {
            log_debug!("[Includes] {} already present at {}", spec.prefix, dest.display());
            return Ok(false);
        }

        let url = spec.archive_url();
        log_info!("[Includes] Fetching {} from {}", spec.prefix, url);
        let failure = |reason: String| ProtogError::Includes {
            prefix: spec.prefix.to_string(),
            reason,
        };

        let download_dir = tempfile::Builder::new()
            .prefix("protog-includes-")
            .tempdir()
            .map_err(|e| ProtogError::io("create download directory", e))?;
        let archive = download_dir.path().join("source.zip");
        self.transport
            .download(&url, &archive)
            .map_err(|e| failure(format!("downloading {url} failed: {e}")))?;

        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.dir)
            .map_err(|e| ProtogError::io(format!("create staging directory in {}", self.dir.display()), e))?;
        unpack(&archive, staging.path(), &ArchiveFormat::Zip)
            .map_err(|e| failure(format!("extracting {url} failed: {e}")))?;

        let subtree = staging.path().join(spec.archive_subtree());
        if !subtree.is_dir() {
            return Err(failure(format!(
                "{} not found in {url}",
                spec.archive_subtree().display()
            )));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ProtogError::io(format!("create {}", parent.display()), e))?;
        }
        match fs::rename(&subtree, &dest) {
            Ok(()) => Ok(true),
            Err(_) if dest.exists() => {
                log_warn!("[Includes] {} was fetched concurrently, discarding our copy", spec.prefix);
                Ok(true)
            }
            Err(e) => Err(ProtogError::io(format!("move {} into {}", spec.prefix, dest.display()), e)),
        }
    }
}
