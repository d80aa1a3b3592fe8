/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::cmp;
use std::fmt;
use std::sync::Arc;

use aws_smithy_types::error::operation::BuildError;

use crate::store::ObjectStore;
use crate::types::ConcurrencySetting;
use crate::DEFAULT_CHUNK_SIZE;

mod env;
pub use env::StoreSettings;

/// Configuration for a [`Client`](crate::client::Client)
#[derive(Clone)]
pub struct Config {
    chunk_size: usize,
    concurrency: ConcurrencySetting,
    store: Arc<dyn ObjectStore>,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the size of each read issued against an object body
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the concurrency setting to use for a batch of downloads.
    pub fn concurrency(&self) -> &ConcurrencySetting {
        &self.concurrency
    }

    /// The object store every operation is sent to.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("chunk_size", &self.chunk_size)
            .field("concurrency", &self.concurrency)
            .field("store", &self.store)
            .finish()
    }
}

/// Fluent style builder for [Config]
#[derive(Clone, Default)]
pub struct Builder {
    chunk_size: Option<usize>,
    concurrency: ConcurrencySetting,
    store: Option<Arc<dyn ObjectStore>>,
}

impl Builder {
    /// Size of each read issued against an object body.
    ///
    /// Values below one byte are rounded up. Default is 8 KiB.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(cmp::max(chunk_size, 1));
        self
    }

    /// Set the number of downloads allowed in flight at once.
    ///
    /// Default is [ConcurrencySetting::Auto].
    pub fn concurrency(mut self, concurrency: ConcurrencySetting) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the object store to use.
    ///
    /// NOTE: A store is required.
    pub fn store(self, store: impl ObjectStore + 'static) -> Self {
        self.set_store(Some(Arc::new(store)))
    }

    /// Set an already shared object store to use.
    pub fn set_store(mut self, store: Option<Arc<dyn ObjectStore>>) -> Self {
        self.store = store;
        self
    }

    /// Consumes the builder and constructs a [`Config`](crate::config::Config)
    pub fn build(self) -> Result<Config, BuildError> {
        let store = self
            .store
            .ok_or_else(|| BuildError::missing_field("store", "An object store is required"))?;

        Ok(Config {
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            concurrency: self.concurrency,
            store,
        })
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("chunk_size", &self.chunk_size)
            .field("concurrency", &self.concurrency)
            .field("store", &self.store.is_some())
            .finish()
    }
}
