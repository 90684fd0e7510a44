// In-memory stand-ins for the network and subprocess seams, shared by unit tests.

use crate::error::Result;
use crate::libs::utilities::process::{CommandRunner, Invocation};
use crate::libs::utilities::transport::{RedirectResponse, Transport, TransportError};
use std::cell::RefCell;
use std::fs;
use std::path::Path;

/// Answers every release lookup with `tag`, serves `body` for every download and
/// records each URL it is asked for.
pub struct RecordingTransport {
    pub tag: String,
    pub body: Vec<u8>,
    pub lookups: RefCell<Vec<String>>,
    pub downloads: RefCell<Vec<String>>,
}

impl RecordingTransport {
    pub fn new(tag: &str) -> Self {
        Self::serving(tag, b"#!/bin/sh\n".to_vec())
    }

    pub fn serving(tag: &str, body: Vec<u8>) -> Self {
        Self {
            tag: tag.to_string(),
            body,
            lookups: RefCell::new(Vec::new()),
            downloads: RefCell::new(Vec::new()),
        }
    }

    pub fn download_count(&self) -> usize {
        self.downloads.borrow().len()
    }

    pub fn request_count(&self) -> usize {
        self.lookups.borrow().len() + self.download_count()
    }
}

impl Transport for RecordingTransport {
    fn get_without_redirect(&self, url: &str) -> std::result::Result<RedirectResponse, TransportError> {
        self.lookups.borrow_mut().push(url.to_string());
        Ok(RedirectResponse {
            status: 302,
            location: Some(format!("{}/../tag/{}", url, self.tag)),
        })
    }

    fn get_text(&self, url: &str) -> std::result::Result<String, TransportError> {
        self.lookups.borrow_mut().push(url.to_string());
        Ok(format!("go{}\n", self.tag.trim_start_matches('v')))
    }

    fn download(&self, url: &str, dest: &Path) -> std::result::Result<(), TransportError> {
        self.downloads.borrow_mut().push(url.to_string());
        fs::write(dest, &self.body).map_err(|e| TransportError(e.to_string()))
    }
}

type Effect = Box<dyn Fn(&Invocation) -> Result<()>>;

/// Records invocations instead of running them. An optional effect simulates what the
/// real program would leave on disk.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: RefCell<Vec<Invocation>>,
    effect: Option<Effect>,
}

impl RecordingRunner {
    pub fn with_effect(effect: impl Fn(&Invocation) -> Result<()> + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            effect: Some(Box::new(effect)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Arguments of every recorded call, lossily converted for easy assertions.
    pub fn arg_lists(&self) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .map(|inv| inv.args.iter().map(|a| a.to_string_lossy().into_owned()).collect())
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.calls.borrow_mut().push(invocation.clone());
        match &self.effect {
            Some(effect) => effect(invocation),
            None => Ok(()),
        }
    }
}
