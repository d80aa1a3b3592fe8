/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use tokio::task;

use crate::error::{self, ErrorKind};
use crate::types::{FailedDownload, TaskState};

use super::worker::{self, TaskReport};
use super::{DownloadBatchContext, DownloadBatchOutput, TaskOutcome};

/// Handle for `DownloadBatch` transfer operation
#[derive(Debug)]
#[non_exhaustive]
pub struct DownloadBatchHandle {
    /// One child task per distinct key
    pub(super) tasks: task::JoinSet<TaskReport>,
    /// Distinct keys in batch order, indexed the same as the reports
    pub(super) keys: Vec<String>,
    /// The context used to drive the batch to completion
    pub(super) ctx: DownloadBatchContext,
}

impl DownloadBatchHandle {
    /// Consume the handle and wait for every download to finish or fail.
    ///
    /// A failed download never fails the batch, it is reported in
    /// [`failed_transfers`](DownloadBatchOutput::failed_transfers) instead.
    #[tracing::instrument(skip_all, level = "debug", name = "download-batch-join")]
    pub async fn join(mut self) -> Result<DownloadBatchOutput, crate::error::Error> {
        let mut reports: Vec<Option<TaskReport>> = self.keys.iter().map(|_| None).collect();

        // join all tasks
        while let Some(join_result) = self.tasks.join_next().await {
            match join_result {
                Ok(report) => {
                    let index = report.index;
                    reports[index] = Some(report);
                }
                Err(err) => tracing::error!("download task did not run to completion: {err}"),
            }
        }

        let mut output = DownloadBatchOutput::builder();
        for (index, report) in reports.into_iter().enumerate() {
            let report = report.unwrap_or_else(|| self.lost_task(index));
            if let Some(error) = report.error {
                output = output.failed_transfers(FailedDownload {
                    key: report.outcome.key.clone(),
                    destination: report.outcome.destination.clone(),
                    error,
                });
            }
            output = output.outcome(report.outcome);
        }

        Ok(output.build())
    }

    /// Abort every download that has not finished yet.
    ///
    /// Aborted downloads are reported as failed by [`join`](Self::join), with the bytes they
    /// wrote before stopping.
    pub fn abort(&mut self) {
        self.tasks.abort_all();
    }

    /// Report for a task that panicked or was aborted before handing back its own
    fn lost_task(&self, index: usize) -> TaskReport {
        let key = self.keys[index].clone();
        let tally = self.ctx.state().tallies.get(index);
        let root = &self.ctx.state().destination;
        let destination = worker::local_key_path(root, &key).unwrap_or_else(|_| root.clone());
        let error = error::runtime_error(format!("download of '{key}' was cancelled or panicked"));

        TaskReport {
            index,
            outcome: TaskOutcome {
                key,
                destination,
                size_bytes: tally.and_then(|t| t.size_bytes()),
                bytes_transferred: tally.map_or(0, |t| t.bytes_transferred()),
                state: TaskState::Failed(ErrorKind::RuntimeError),
            },
            error: Some(error),
        }
    }
}
