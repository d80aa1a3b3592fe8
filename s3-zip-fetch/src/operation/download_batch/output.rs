/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};

use crate::types::{FailedDownload, TaskState};

/// Final state of one download in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub(crate) key: String,
    pub(crate) destination: PathBuf,
    pub(crate) size_bytes: Option<u64>,
    pub(crate) bytes_transferred: u64,
    pub(crate) state: TaskState,
}

impl TaskOutcome {
    /// The key of the object
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The local file the object was written to
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The probed size of the object, `None` if the probe never succeeded
    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    /// Bytes written to disk, including those of a partial file left by a failure
    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    /// Terminal state of the download
    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// Whether the object was fully written
    pub fn is_completed(&self) -> bool {
        self.state == TaskState::Completed
    }
}

/// Output type for downloading a batch of objects
#[non_exhaustive]
#[derive(Debug)]
pub struct DownloadBatchOutput {
    /// One outcome per distinct key, in batch order
    pub outcomes: Vec<TaskOutcome>,

    /// A list of failed object transfers
    pub failed_transfers: Option<Vec<FailedDownload>>,
}

impl DownloadBatchOutput {
    /// Creates a new builder-style object to manufacture [`DownloadBatchOutput`](crate::operation::download_batch::DownloadBatchOutput).
    pub fn builder() -> DownloadBatchOutputBuilder {
        DownloadBatchOutputBuilder::default()
    }

    /// One outcome per distinct key, in batch order
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    /// The outcome for `key`, if it was part of the batch
    pub fn outcome(&self, key: &str) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| o.key == key)
    }

    /// The number of objects that were successfully downloaded
    pub fn objects_downloaded(&self) -> u64 {
        self.outcomes.iter().filter(|o| o.is_completed()).count() as u64
    }

    /// A slice of failed object transfers
    ///
    /// If no value was sent for this field, a default will be set. If you want to determine if no value was
    /// set, use `.failed_transfers.is_none()`
    pub fn failed_transfers(&self) -> &[FailedDownload] {
        self.failed_transfers.as_deref().unwrap_or_default()
    }

    /// Whether any download in the batch failed
    pub fn has_failures(&self) -> bool {
        !self.failed_transfers().is_empty()
    }

    /// The number of bytes of completed downloads
    pub fn total_bytes_transferred(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| o.is_completed())
            .map(|o| o.bytes_transferred)
            .sum()
    }
}

/// A builder for [`DownloadBatchOutput`](crate::operation::download_batch::DownloadBatchOutput).
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct DownloadBatchOutputBuilder {
    pub(crate) outcomes: Vec<TaskOutcome>,
    pub(crate) failed_transfers: Option<Vec<FailedDownload>>,
}

impl DownloadBatchOutputBuilder {
    /// Append the outcome of a download
    pub fn outcome(mut self, input: TaskOutcome) -> Self {
        self.outcomes.push(input);
        self
    }

    /// The outcomes appended so far
    pub fn get_outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    /// Append a failed transfer.
    ///
    /// To override the contents of this collection use
    /// [`set_failed_transfers`](Self::set_failed_transfers)
    pub fn failed_transfers(mut self, input: FailedDownload) -> Self {
        self.failed_transfers
            .get_or_insert_with(Vec::new)
            .push(input);
        self
    }

    /// A list of failed object transfers
    pub fn set_failed_transfers(mut self, input: Option<Vec<FailedDownload>>) -> Self {
        self.failed_transfers = input;
        self
    }

    /// A list of failed object transfers
    pub fn get_failed_transfers(&self) -> &Option<Vec<FailedDownload>> {
        &self.failed_transfers
    }

    /// Consume the builder and return the output
    pub fn build(self) -> DownloadBatchOutput {
        DownloadBatchOutput {
            outcomes: self.outcomes,
            failed_transfers: self.failed_transfers,
        }
    }
}
