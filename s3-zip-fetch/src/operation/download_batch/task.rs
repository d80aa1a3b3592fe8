/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::{self, Error};
use crate::types::{RemoteObject, TaskState};

use super::TaskOutcome;

/// Size and byte count of one download, readable after its task is gone.
#[derive(Debug, Default)]
pub(super) struct TaskTally {
    size_bytes: OnceLock<u64>,
    bytes_transferred: AtomicU64,
}

impl TaskTally {
    pub(super) fn size_bytes(&self) -> Option<u64> {
        self.size_bytes.get().copied()
    }

    pub(super) fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred.load(Ordering::Acquire)
    }
}

/// Book-keeping for one download as it moves through its states.
#[derive(Debug)]
pub(super) struct DownloadTask {
    object: RemoteObject,
    destination: PathBuf,
    tally: Arc<TaskTally>,
    state: TaskState,
}

impl DownloadTask {
    pub(super) fn new(key: String, destination: PathBuf, tally: Arc<TaskTally>) -> Self {
        Self {
            object: RemoteObject::new(key),
            destination,
            tally,
            state: TaskState::Pending,
        }
    }

    pub(super) fn key(&self) -> &str {
        self.object.key()
    }

    pub(super) fn set_destination(&mut self, destination: PathBuf) {
        self.destination = destination;
    }

    pub(super) fn set_size(&mut self, size: u64) {
        self.object.set_size_bytes(size);
        // probed once per task
        let _ = self.tally.size_bytes.set(size);
    }

    pub(super) fn advance(&mut self, bytes: u64) {
        self.tally.bytes_transferred.fetch_add(bytes, Ordering::AcqRel);
    }

    /// Move to `next`, rejecting anything the lifecycle does not allow.
    pub(super) fn transition(&mut self, next: TaskState) -> Result<(), Error> {
        if !self.state.can_transition_to(&next) {
            return Err(error::runtime_error(format!(
                "illegal state transition for '{}': {:?} -> {:?}",
                self.key(),
                self.state,
                next
            )));
        }
        tracing::trace!(key = self.key(), from = ?self.state, to = ?next, "task state change");
        self.state = next;
        Ok(())
    }

    /// Record `err` as the reason this task stopped.
    pub(super) fn fail(&mut self, err: &Error) {
        let next = TaskState::Failed(err.kind().clone());
        if let Err(illegal) = self.transition(next) {
            tracing::warn!("{illegal:?}");
        }
    }

    pub(super) fn into_outcome(self) -> TaskOutcome {
        TaskOutcome {
            size_bytes: self.object.size_bytes(),
            key: self.object.key().to_owned(),
            destination: self.destination,
            bytes_transferred: self.tally.bytes_transferred(),
            state: self.state,
        }
    }
}
