/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use aws_sdk_s3::error::DisplayErrorContext;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{self, Error, ErrorKind};
use crate::progress::TaskProgress;
use crate::store::ObjectBody;
use crate::types::TaskState;

use super::task::DownloadTask;
use super::{DownloadBatchContext, TaskOutcome};

/// What a finished download task hands back to the batch
#[derive(Debug)]
pub(super) struct TaskReport {
    pub(super) index: usize,
    pub(super) outcome: TaskOutcome,
    pub(super) error: Option<Error>,
}

// worker to download a single object of the batch, never fails the batch
#[tracing::instrument(skip_all, level = "debug", name = "download-object", fields(key = %key))]
pub(super) async fn download_object(
    ctx: DownloadBatchContext,
    index: usize,
    key: String,
    claimed_by: Option<String>,
) -> TaskReport {
    let mut progress = ProgressGuard::new(ctx.state().progress.task_started(&key));
    let tally = ctx.state().tallies.get(index).cloned().unwrap_or_default();
    let mut task = DownloadTask::new(key, ctx.state().destination.clone(), tally);

    let downloaded =
        download_single_obj(&ctx, &mut task, claimed_by.as_deref(), progress.get()).await;
    let result = downloaded.and_then(|()| task.transition(TaskState::Completed));

    let error = match result {
        Ok(()) => {
            progress.finish();
            tracing::debug!("worker finished downloading key {:?}", task.key());
            None
        }
        Err(err) => {
            task.fail(&err);
            progress.fail(&err);
            tracing::warn!(
                "worker failed to download key {:?}: {}",
                task.key(),
                DisplayErrorContext(&err)
            );
            Some(err)
        }
    };

    TaskReport {
        index,
        outcome: task.into_outcome(),
        error,
    }
}

/// Fails the progress of a download whose task is dropped before it reports.
///
/// Covers aborted and panicked tasks, which never reach `finish` or `fail` themselves.
struct ProgressGuard {
    progress: Box<dyn TaskProgress>,
    reported: bool,
}

impl ProgressGuard {
    fn new(progress: Box<dyn TaskProgress>) -> Self {
        Self {
            progress,
            reported: false,
        }
    }

    fn get(&mut self) -> &mut dyn TaskProgress {
        self.progress.as_mut()
    }

    fn finish(&mut self) {
        self.reported = true;
        self.progress.finish();
    }

    fn fail(&mut self, err: &Error) {
        self.reported = true;
        self.progress.fail(err);
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        if !self.reported {
            let err = error::runtime_error("download was cancelled before it finished");
            self.progress.fail(&err);
        }
    }
}

async fn download_single_obj(
    ctx: &DownloadBatchContext,
    task: &mut DownloadTask,
    claimed_by: Option<&str>,
    progress: &mut dyn TaskProgress,
) -> Result<(), Error> {
    let key_path = local_key_path(&ctx.state().destination, task.key())?;
    task.set_destination(key_path.clone());

    // one writer per local file
    if let Some(owner) = claimed_by {
        return Err(error::invalid_input(format!(
            "destination '{}' is already claimed by '{owner}'",
            key_path.display()
        )));
    }

    // held until this download finishes or fails
    let _permit = match &ctx.state().permits {
        Some(permits) => Some(
            permits
                .clone()
                .acquire_owned()
                .await
                .map_err(error::runtime_error)?,
        ),
        None => None,
    };

    task.transition(TaskState::Probing)?;
    let size = ctx
        .store()
        .head_size(task.key())
        .await
        .map_err(error::from_kind(ErrorKind::ProbeFailed))?;
    task.set_size(size);
    progress.set_total(size);

    let mut dest = fs::File::create(&key_path)
        .await
        .map_err(error::from_kind(ErrorKind::StreamFailed))?;

    task.transition(TaskState::Downloading)?;
    let mut body = ctx
        .store()
        .get_stream(task.key())
        .await
        .map_err(error::from_kind(ErrorKind::StreamFailed))?;

    let mut buf = vec![0u8; ctx.handle().config.chunk_size()];
    let copied = copy_body(&mut body, &mut dest, &mut buf, task, progress).await;
    // whatever was written stays on disk, even when the body failed part way
    let flushed = dest.flush().await;

    copied
        .and(flushed)
        .map_err(error::from_kind(ErrorKind::StreamFailed))
}

async fn copy_body(
    body: &mut ObjectBody,
    dest: &mut fs::File,
    buf: &mut [u8],
    task: &mut DownloadTask,
    progress: &mut dyn TaskProgress,
) -> Result<(), io::Error> {
    loop {
        let n = body.read(buf).await?;
        if n == 0 {
            return Ok(());
        }
        dest.write_all(&buf[..n]).await?;
        task.advance(n as u64);
        progress.advance(n as u64);
    }
}

/// Derive the local path for a given key: the part after the last `/`, inside `root_dir`.
///
/// # Examples
///
/// ```ignore
/// let actual = local_key_path(Path::new("downloads"), "releases/2024/app.zip")?;
/// assert_eq!(Path::new("downloads/app.zip"), actual);
/// ```
pub(super) fn local_key_path(root_dir: &Path, key: &str) -> Result<PathBuf, Error> {
    let name = key.rsplit('/').next().unwrap_or(key);

    // the name must be a single, normal path component
    if name.is_empty() || Path::new(name).file_name() != Some(OsStr::new(name)) {
        return Err(error::invalid_input(format!(
            "Unable to download key: '{key}', it does not end in a file name"
        )));
    }

    Ok(root_dir.join(name))
}
