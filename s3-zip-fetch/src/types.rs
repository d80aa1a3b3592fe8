/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind};

/// The concurrency settings to use for a batch of downloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConcurrencySetting {
    /// Run every download in the batch at the same time.
    #[default]
    Auto,

    /// Explicitly configured number of downloads allowed in flight at once.
    ///
    /// A value of zero is treated as one.
    Explicit(usize),
}

/// An object in the store, as seen by a listing or a size probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    key: String,
    size_bytes: Option<u64>,
}

impl RemoteObject {
    /// Create a new object with an unknown size
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size_bytes: None,
        }
    }

    /// The object key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The object size in bytes, if it has been probed
    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    pub(crate) fn set_size_bytes(&mut self, size: u64) {
        self.size_bytes = Some(size);
    }
}

/// Lifecycle of a single download within a batch.
///
/// States only move forward: `Pending -> Probing -> Downloading -> Completed`, with `Failed`
/// reachable from any non-terminal state. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Created, waiting to start
    Pending,
    /// Asking the store for the object size
    Probing,
    /// Streaming the object body to disk
    Downloading,
    /// Body fully written
    Completed,
    /// Stopped with an error of the given kind
    Failed(ErrorKind),
}

impl TaskState {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed(_))
    }

    pub(crate) fn can_transition_to(&self, next: &TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, next),
            (Pending, Probing)
                | (Probing, Downloading)
                | (Downloading, Completed)
                | (Pending | Probing | Downloading, Failed(_))
        )
    }
}

/// Detailed information about a failed download
#[derive(Debug)]
pub struct FailedDownload {
    pub(crate) key: String,
    pub(crate) destination: PathBuf,
    pub(crate) error: Error,
}

impl FailedDownload {
    /// The key of the object that failed to download
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The local path the object was being written to
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The error encountered downloading the object
    pub fn error(&self) -> &Error {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(TaskState::Pending.can_transition_to(&TaskState::Probing));
        assert!(TaskState::Probing.can_transition_to(&TaskState::Downloading));
        assert!(TaskState::Downloading.can_transition_to(&TaskState::Completed));
        assert!(TaskState::Probing.can_transition_to(&TaskState::Failed(ErrorKind::ProbeFailed)));
    }

    #[test]
    fn test_no_backward_or_terminal_transitions() {
        assert!(!TaskState::Downloading.can_transition_to(&TaskState::Probing));
        assert!(!TaskState::Probing.can_transition_to(&TaskState::Pending));
        assert!(!TaskState::Pending.can_transition_to(&TaskState::Completed));
        assert!(!TaskState::Completed.can_transition_to(&TaskState::Failed(ErrorKind::IOError)));
        assert!(!TaskState::Failed(ErrorKind::StreamFailed).can_transition_to(&TaskState::Completed));
        assert!(!TaskState::Completed.can_transition_to(&TaskState::Completed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed(ErrorKind::NotFound).is_terminal());
        assert!(!TaskState::Downloading.is_terminal());
    }
}
