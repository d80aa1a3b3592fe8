/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::{path::PathBuf, sync::Arc};

use crate::error::Error;
use crate::progress::ProgressSink;

use super::{DownloadBatchHandle, DownloadBatchInputBuilder};

/// Fluent builder for constructing a batch download transfer
#[derive(Debug)]
pub struct DownloadBatchFluentBuilder {
    handle: Arc<crate::client::Handle>,
    inner: DownloadBatchInputBuilder,
}

impl DownloadBatchFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            inner: ::std::default::Default::default(),
        }
    }

    /// Start every download in the batch.
    ///
    /// Fails without starting anything if the destination is missing or is not a directory.
    /// Failures of individual downloads are reported by [`DownloadBatchHandle::join`].
    pub async fn send(self) -> Result<DownloadBatchHandle, Error> {
        let input = self.inner.build()?;
        crate::operation::download_batch::DownloadBatch::orchestrate(self.handle, input).await
    }

    /// Append a key to download.
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.inner = self.inner.key(input);
        self
    }

    /// Append several keys to download.
    pub fn keys<I, S>(mut self, input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner = self.inner.keys(input);
        self
    }

    /// The keys to download
    pub fn get_keys(&self) -> &[String] {
        self.inner.get_keys()
    }

    /// Set the destination directory to which files should be downloaded
    pub fn destination(mut self, input: impl Into<PathBuf>) -> Self {
        self.inner = self.inner.destination(input);
        self
    }

    /// Set the destination directory to which files should be downloaded
    pub fn set_destination(mut self, input: Option<PathBuf>) -> Self {
        self.inner = self.inner.set_destination(input);
        self
    }

    /// The destination directory to which files should be downloaded
    pub fn get_destination(&self) -> &Option<PathBuf> {
        self.inner.get_destination()
    }

    /// Report per-download progress to `input`
    pub fn progress(mut self, input: impl ProgressSink + 'static) -> Self {
        self.inner = self.inner.progress(input);
        self
    }

    /// Report per-download progress to `input`, or discard it when `None`
    pub fn set_progress(mut self, input: Option<Arc<dyn ProgressSink>>) -> Self {
        self.inner = self.inner.set_progress(input);
        self
    }
}

impl crate::operation::download_batch::input::DownloadBatchInputBuilder {
    /// Initiate a batch download with this input using the given client.
    pub async fn send_with(self, client: &crate::Client) -> Result<DownloadBatchHandle, Error> {
        let mut fluent_builder = client.download_batch();
        fluent_builder.inner = self;
        fluent_builder.send().await
    }
}
