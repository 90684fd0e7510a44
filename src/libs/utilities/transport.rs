// HTTP access for release lookups and artifact downloads.
//
// Everything network-bound goes through the `Transport` trait so provisioning logic can be
// exercised without a network. `UreqTransport` is the real, blocking implementation.

use crate::log_debug;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

const USER_AGENT: &str = concat!("protog/", env!("CARGO_PKG_VERSION"));

/// Failure talking to a remote host. Callers attach tool / URL context.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Outcome of a request made without following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    pub status: u16,
    pub location: Option<String>,
}

impl RedirectResponse {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

pub trait Transport {
    /// Issues a GET without following redirects and reports the status and `Location` header.
    fn get_without_redirect(&self, url: &str) -> Result<RedirectResponse, TransportError>;

    /// Fetches a small text document.
    fn get_text(&self, url: &str) -> Result<String, TransportError>;

    /// Streams the body of `url` into the file at `dest`, creating or truncating it.
    fn download(&self, url: &str, dest: &Path) -> Result<(), TransportError>;
}

/// Blocking transport built on `ureq`.
pub struct UreqTransport {
    agent: ureq::Agent,
    no_redirect: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
            no_redirect: ureq::AgentBuilder::new()
                .user_agent(USER_AGENT)
                .redirects(0)
                .build(),
        }
    }
}

fn call(agent: &ureq::Agent, url: &str) -> Result<ureq::Response, TransportError> {
    match agent.get(url).call() {
        Ok(resp) => Ok(resp),
        Err(ureq::Error::Status(code, resp)) => Err(TransportError(format!(
            "HTTP {} {}",
            code,
            resp.status_text()
        ))),
        Err(ureq::Error::Transport(t)) => Err(TransportError(t.to_string())),
    }
}

impl Transport for UreqTransport {
    fn get_without_redirect(&self, url: &str) -> Result<RedirectResponse, TransportError> {
        log_debug!("[HTTP] GET {} (redirects disabled)", url);
        let resp = call(&self.no_redirect, url)?;
        Ok(RedirectResponse {
            status: resp.status(),
            location: resp.header("Location").map(str::to_string),
        })
    }

    fn get_text(&self, url: &str) -> Result<String, TransportError> {
        log_debug!("[HTTP] GET {}", url);
        call(&self.agent, url)?
            .into_string()
            .map_err(|e| TransportError(e.to_string()))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), TransportError> {
        log_debug!("[HTTP] Downloading {} to {}", url, dest.display());
        let resp = call(&self.agent, url)?;
        let total = resp
            .header("Content-Length")
            .and_then(|len| len.parse::<u64>().ok());

        let mut file = File::create(dest).map_err(|e| TransportError(e.to_string()))?;
        let progress = progress_bar(url, total);
        let mut reader = progress.wrap_read(resp.into_reader());
        let copied = io::copy(&mut reader, &mut file);
        progress.finish_and_clear();
        copied.map_err(|e| TransportError(e.to_string()))?;
        Ok(())
    }
}

/// Byte progress bar on stderr. indicatif hides it when stderr is not a terminal.
fn progress_bar(url: &str, total: Option<u64>) -> ProgressBar {
    let name = url
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .split('?')
        .next()
        .unwrap_or(url)
        .to_string();
    match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::with_template(
                    "{msg} [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec})",
                )
                .map(|s| s.progress_chars("=> "))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message(name);
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_message(name);
            spinner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_detection() {
        let found = RedirectResponse {
            status: 302,
            location: Some("x".into()),
        };
        let ok = RedirectResponse {
            status: 200,
            location: None,
        };
        assert!(found.is_redirect());
        assert!(!ok.is_redirect());
    }
}
