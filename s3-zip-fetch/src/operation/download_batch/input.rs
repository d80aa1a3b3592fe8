/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_smithy_types::error::operation::BuildError;

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::progress::ProgressSink;

/// Input type for downloading a batch of objects
#[non_exhaustive]
#[derive(Clone)]
pub struct DownloadBatchInput {
    /// The keys of the objects to download, in batch order.
    pub keys: Vec<String>,

    /// The destination directory to which files should be downloaded
    pub destination: Option<PathBuf>,

    /// Where per-download progress is reported
    pub progress: Option<Arc<dyn ProgressSink>>,
}

impl DownloadBatchInput {
    /// Creates a new builder-style object to manufacture [`DownloadBatchInput`](crate::operation::download_batch::DownloadBatchInput).
    pub fn builder() -> DownloadBatchInputBuilder {
        DownloadBatchInputBuilder::default()
    }

    /// The keys of the objects to download
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The destination directory to which files should be downloaded
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Where per-download progress is reported
    pub fn progress(&self) -> Option<&Arc<dyn ProgressSink>> {
        self.progress.as_ref()
    }
}

impl fmt::Debug for DownloadBatchInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = f.debug_struct("DownloadBatchInput");
        formatter.field("keys", &self.keys);
        formatter.field("destination", &self.destination);
        formatter.field("progress", &self.progress.is_some());
        formatter.finish()
    }
}

/// A builder for [`DownloadBatchInput`](crate::operation::download_batch::DownloadBatchInput).
#[non_exhaustive]
#[derive(Clone, Default)]
pub struct DownloadBatchInputBuilder {
    pub(crate) keys: Vec<String>,
    pub(crate) destination: Option<PathBuf>,
    pub(crate) progress: Option<Arc<dyn ProgressSink>>,
}

impl DownloadBatchInputBuilder {
    /// Append a key to download.
    ///
    /// To override the contents of this collection use [`set_keys`](Self::set_keys)
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.keys.push(input.into());
        self
    }

    /// Append several keys to download.
    pub fn keys<I, S>(mut self, input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.extend(input.into_iter().map(Into::into));
        self
    }

    /// Replace the keys to download
    pub fn set_keys(mut self, input: Vec<String>) -> Self {
        self.keys = input;
        self
    }

    /// The keys to download
    pub fn get_keys(&self) -> &[String] {
        &self.keys
    }

    /// Set the destination directory to which files should be downloaded
    ///
    /// NOTE: A destination directory is required. It is created if it does not exist.
    pub fn destination(mut self, input: impl Into<PathBuf>) -> Self {
        self.destination = Some(input.into());
        self
    }

    /// Set the destination directory to which files should be downloaded
    ///
    /// NOTE: A destination directory is required. It is created if it does not exist.
    pub fn set_destination(mut self, input: Option<PathBuf>) -> Self {
        self.destination = input;
        self
    }

    /// The destination directory to which files should be downloaded
    pub fn get_destination(&self) -> &Option<PathBuf> {
        &self.destination
    }

    /// Report per-download progress to `input`
    pub fn progress(mut self, input: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(input));
        self
    }

    /// Report per-download progress to `input`, or discard it when `None`
    pub fn set_progress(mut self, input: Option<Arc<dyn ProgressSink>>) -> Self {
        self.progress = input;
        self
    }

    /// Consumes the builder and constructs a [`DownloadBatchInput`](crate::operation::download_batch::DownloadBatchInput).
    pub fn build(self) -> Result<DownloadBatchInput, BuildError> {
        if self.destination.is_none() {
            return Err(BuildError::missing_field(
                "destination",
                "A destination directory is required",
            ));
        }

        Ok(DownloadBatchInput {
            keys: self.keys,
            destination: self.destination,
            progress: self.progress,
        })
    }
}

impl fmt::Debug for DownloadBatchInputBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = f.debug_struct("DownloadBatchInputBuilder");
        formatter.field("keys", &self.keys);
        formatter.field("destination", &self.destination);
        formatter.field("progress", &self.progress.is_some());
        formatter.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::DownloadBatchInput;
    use crate::progress::NoProgress;

    #[test]
    fn test_destination_required() {
        let err = DownloadBatchInput::builder()
            .key("a.zip")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_keys_appended_in_order() {
        let input = DownloadBatchInput::builder()
            .key("a.zip")
            .keys(["b.zip", "c.zip"])
            .destination("downloads")
            .progress(NoProgress)
            .build()
            .unwrap();
        assert_eq!(&["a.zip", "b.zip", "c.zip"], input.keys());
        assert!(input.progress().is_some());
        assert_eq!(Some(std::path::Path::new("downloads")), input.destination());
    }
}
