// Decides which version of a tool to provision.
//
// Precedence: an explicitly configured version, then the descriptor's own override
// (pinned builds, non-GitHub release feeds), then the latest GitHub release.

use crate::error::{ProtogError, Result};
use crate::libs::utilities::transport::Transport;
use crate::tools::Versioned;
use crate::{log_debug, log_info};

/// Adds the `v` tag prefix to a version if it does not already carry one.
pub fn with_v_prefix(version: &str) -> String {
    let version = version.trim();
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

/// Resolves and normalizes the version of `tool`. `explicit` may be empty.
pub fn resolve<T>(tool: &T, explicit: &str, transport: &dyn Transport) -> Result<String>
where
    T: Versioned + ?Sized,
{
    let explicit = explicit.trim();
    let raw = if !explicit.is_empty() {
        log_debug!("[Version] {} pinned to {} by configuration", tool.name(), explicit);
        explicit.to_string()
    } else if let Some(overridden) = tool.latest_version(transport) {
        overridden?
    } else {
        let latest = latest_github_release(tool.name(), tool.repo(), transport)?;
        log_info!("[Version] Latest release of {} is {}", tool.name(), latest);
        latest
    };
    Ok(tool.normalize_version(&raw))
}

/// Reads the tag of the latest release from the redirect GitHub answers
/// `https://<repo>/releases/latest` with.
pub fn latest_github_release(name: &str, repo: &str, transport: &dyn Transport) -> Result<String> {
    let url = format!("https://{repo}/releases/latest");
    let failure = |reason: String| ProtogError::VersionResolution {
        tool: name.to_string(),
        repo: repo.to_string(),
        reason,
    };

    let response = transport
        .get_without_redirect(&url)
        .map_err(|e| failure(e.to_string()))?;
    if !response.is_redirect() {
        return Err(failure(format!("expected a redirect, got HTTP {}", response.status)));
    }

    let location = response
        .location
        .ok_or_else(|| failure("redirect without a Location header".to_string()))?;
    let tag = location.trim_end().rsplit('/').next().unwrap_or_default();
    if tag.is_empty() {
        return Err(failure(format!("invalid location: {location}")));
    }
    Ok(tag.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::utilities::transport::{RedirectResponse, TransportError};
    use crate::tools::binaries::{Golang, Protoc};
    use crate::tools::{ToolId, go, node};
    use std::cell::RefCell;
    use std::path::Path;

    /// Serves canned responses and records the URLs it was asked for.
    #[derive(Default)]
    struct CannedTransport {
        redirect: Option<RedirectResponse>,
        text: Option<String>,
        requests: RefCell<Vec<String>>,
    }

    impl Transport for CannedTransport {
        fn get_without_redirect(&self, url: &str) -> std::result::Result<RedirectResponse, TransportError> {
            self.requests.borrow_mut().push(url.to_string());
            self.redirect.clone().ok_or_else(|| TransportError("offline".into()))
        }

        fn get_text(&self, url: &str) -> std::result::Result<String, TransportError> {
            self.requests.borrow_mut().push(url.to_string());
            self.text.clone().ok_or_else(|| TransportError("offline".into()))
        }

        fn download(&self, _url: &str, _dest: &Path) -> std::result::Result<(), TransportError> {
            Err(TransportError("offline".into()))
        }
    }

    fn redirecting_to(location: &str) -> CannedTransport {
        CannedTransport {
            redirect: Some(RedirectResponse {
                status: 302,
                location: Some(location.to_string()),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn v_prefix_is_added_once() {
        assert_eq!(with_v_prefix("3.20.1"), "v3.20.1");
        assert_eq!(with_v_prefix(" v3.20.1 "), "v3.20.1");
    }

    #[test]
    fn explicit_version_skips_network() {
        let transport = CannedTransport::default();
        assert_eq!(resolve(&Protoc, " 3.20.1 ", &transport).unwrap(), "v3.20.1");
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn latest_release_comes_from_redirect() {
        let transport =
            redirecting_to("https://github.com/protocolbuffers/protobuf/releases/tag/v21.5");
        assert_eq!(resolve(&Protoc, "", &transport).unwrap(), "v21.5");
        assert_eq!(
            transport.requests.borrow().as_slice(),
            ["https://github.com/protocolbuffers/protobuf/releases/latest"]
        );
    }

    #[test]
    fn non_redirect_is_an_error() {
        let transport = CannedTransport {
            redirect: Some(RedirectResponse { status: 200, location: None }),
            ..Default::default()
        };
        let err = resolve(&Protoc, "", &transport).unwrap_err();
        assert!(matches!(err, ProtogError::VersionResolution { .. }));
        assert!(err.to_string().contains("github.com/protocolbuffers/protobuf"));
    }

    #[test]
    fn empty_location_segment_is_an_error() {
        let transport = redirecting_to("https://github.com/protocolbuffers/protobuf/releases/tag/");
        assert!(resolve(&Protoc, "", &transport).is_err());
    }

    #[test]
    fn transport_failure_is_a_resolution_error() {
        let err = resolve(&Protoc, "", &CannedTransport::default()).unwrap_err();
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn pinned_versions_skip_network() {
        let transport = CannedTransport::default();
        assert_eq!(
            resolve(&ToolId::ProtocGenGoGrpc.acquisition(), "", &transport).unwrap(),
            "v1.2.0"
        );
        assert_eq!(resolve(&go::PROTOC_GEN_DOCS, "", &transport).unwrap(), "1.14.2");
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn golang_reads_version_feed() {
        let transport = CannedTransport {
            text: Some("go1.19.3\ntime 2022-11-01T16:46:26Z\n".into()),
            ..Default::default()
        };
        assert_eq!(resolve(&Golang, "", &transport).unwrap(), "v1.19.3");
        assert_eq!(transport.requests.borrow().as_slice(), ["https://go.dev/VERSION?m=text"]);
    }

    #[test]
    fn node_dist_tags_pass_through() {
        let transport = CannedTransport::default();
        assert_eq!(resolve(&node::PROTOC_GEN_TS, "next", &transport).unwrap(), "next");
    }
}
