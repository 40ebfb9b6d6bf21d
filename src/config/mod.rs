//! Desired-state configuration for the watchdog
//!
//! The supervisor reads its desired state from a JSON record: an ordered
//! list of processes to keep alive plus one foreground process name. The
//! file-backed source detects rewrites by content fingerprint, so an edit
//! lands within one poll interval regardless of filesystem timestamp
//! resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One process the supervisor is responsible for.
///
/// `name` is the unique key used for liveness checks and restarts; `args`
/// is an opaque launch-argument string handed verbatim to the process
/// control port. Specs are never mutated, only replaced wholesale when the
/// configuration reloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    #[serde(default)]
    pub args: String,
}

/// One atomic snapshot of what the supervisor should maintain.
///
/// `foreground` may be empty, which disables foreground enforcement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    #[serde(default)]
    pub processes: Vec<ProcessSpec>,
    #[serde(default)]
    pub foreground: String,
}

/// Capability interface over a desired-state source.
///
/// Production uses [`FileConfigSource`]; tests supply an in-memory
/// implementation that flips its changed flag deterministically.
pub trait ConfigSource {
    /// Return the current desired-state snapshot.
    fn current_state(&self) -> DesiredState;

    /// Check whether the underlying source changed since the last read.
    /// On `true` the change has been absorbed and `current_state` reflects
    /// the new snapshot.
    fn reload_if_changed(&mut self) -> bool;
}

/// Desired state backed by a JSON file.
///
/// A missing or unreadable file yields an empty desired state, never an
/// error: the supervisor keeps polling and picks the file up when it
/// appears. Change detection hashes the file contents, so a rewrite with
/// identical bytes reports no change and a rapid rewrite is never missed.
pub struct FileConfigSource {
    path: PathBuf,
    state: DesiredState,
    fingerprint: Option<[u8; 32]>,
}

impl FileConfigSource {
    /// Load the source, tolerating a missing or malformed file.
    pub fn load(path: &Path) -> Self {
        let mut source = Self {
            path: path.to_path_buf(),
            state: DesiredState::default(),
            fingerprint: None,
        };
        source.reload_if_changed();
        if source.fingerprint.is_none() {
            tracing::warn!(
                path = %path.display(),
                "config missing or unreadable; supervising nothing until it appears"
            );
        }
        source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn current_state(&self) -> DesiredState {
        self.state.clone()
    }

    fn reload_if_changed(&mut self) -> bool {
        let bytes = std::fs::read(&self.path).ok();
        let fingerprint: Option<[u8; 32]> = bytes.as_deref().map(|b| Sha256::digest(b).into());

        if fingerprint == self.fingerprint {
            return false;
        }

        self.state = match bytes {
            Some(bytes) => parse_state(&self.path, &bytes),
            None => {
                tracing::warn!(
                    path = %self.path.display(),
                    "config no longer readable, dropping to empty desired state"
                );
                DesiredState::default()
            }
        };
        self.fingerprint = fingerprint;
        true
    }
}

fn parse_state(path: &Path, bytes: &[u8]) -> DesiredState {
    match serde_json::from_slice(bytes) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                %err,
                "config malformed, using empty desired state"
            );
            DesiredState::default()
        }
    }
}
