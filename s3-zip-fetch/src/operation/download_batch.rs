/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Operation builders
pub mod builders;

mod input;
/// Input type for downloading a batch of objects
pub use input::{DownloadBatchInput, DownloadBatchInputBuilder};
mod output;
/// Output type for downloading a batch of objects
pub use output::{DownloadBatchOutput, DownloadBatchOutputBuilder, TaskOutcome};

mod handle;
pub use handle::DownloadBatchHandle;

mod task;
use task::TaskTally;
mod worker;

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{self, Error};
use crate::progress::{NoProgress, ProgressSink};

use super::TransferContext;

/// Operation struct for downloading a batch of objects concurrently
#[derive(Clone, Default, Debug)]
pub(crate) struct DownloadBatch;

impl DownloadBatch {
    /// Execute a single `DownloadBatch` transfer operation
    pub(crate) async fn orchestrate(
        handle: Arc<crate::client::Handle>,
        input: DownloadBatchInput,
    ) -> Result<DownloadBatchHandle, Error> {
        let destination = input
            .destination
            .ok_or_else(|| error::invalid_input("a destination directory is required"))?;
        prepare_destination(&destination).await?;

        let keys = dedupe(input.keys);
        let claimed_by = claim_destinations(&destination, &keys);
        let permits = handle
            .max_in_flight()
            .map(|limit| Arc::new(Semaphore::new(limit)));
        let progress = input
            .progress
            .unwrap_or_else(|| Arc::new(NoProgress) as Arc<dyn ProgressSink>);

        tracing::debug!(
            tasks = keys.len(),
            destination = %destination.display(),
            "starting download batch"
        );

        let state = DownloadBatchState {
            destination,
            progress,
            permits,
            tallies: keys.iter().map(|_| Arc::default()).collect(),
        };
        let ctx = DownloadBatchContext::new(handle, state);

        let mut tasks = JoinSet::new();
        for ((index, key), owner) in keys.iter().enumerate().zip(claimed_by) {
            tasks.spawn(worker::download_object(
                ctx.clone(),
                index,
                key.clone(),
                owner,
            ));
        }

        Ok(DownloadBatchHandle { tasks, keys, ctx })
    }
}

/// Shared state for every download in a batch
#[derive(Debug)]
pub(crate) struct DownloadBatchState {
    destination: PathBuf,
    progress: Arc<dyn ProgressSink>,
    permits: Option<Arc<Semaphore>>,
    /// Indexed like the batch keys
    tallies: Vec<Arc<TaskTally>>,
}

type DownloadBatchContext = TransferContext<DownloadBatchState>;

/// Create the destination directory unless it already exists.
///
/// Done once per batch, before any task runs, so tasks never race on it.
async fn prepare_destination(dir: &Path) -> Result<(), Error> {
    match fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(error::invalid_input(format!(
            "destination is not a directory: {}",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).await?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Drop repeated keys, keeping the first occurrence of each.
fn dedupe(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.into_iter()
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// For each key, the earlier key that already writes to the same local file.
///
/// Keys with different prefixes can share a file name. Only the first of them gets the file,
/// the rest fail on their own. Keys without a usable file name are left for the worker to reject.
fn claim_destinations(root: &Path, keys: &[String]) -> Vec<Option<String>> {
    let mut owners: HashMap<PathBuf, &str> = HashMap::with_capacity(keys.len());
    keys.iter()
        .map(|key| {
            let path = worker::local_key_path(root, key).ok()?;
            match owners.get(&path) {
                Some(owner) => Some((*owner).to_owned()),
                None => {
                    owners.insert(path, key);
                    None
                }
            }
        })
        .collect()
}
