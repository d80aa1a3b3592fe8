/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Object store adapter.
//!
//! The [`ObjectStore`] trait is the only surface the rest of the crate needs from a store: a
//! size probe, a body stream, and a single-page key listing. A store is constructed once and
//! shared by reference across every concurrent download, so implementations must be safe for
//! concurrent use.

use std::fmt::Debug;
use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::Error;

mod s3;
pub use s3::S3Store;

/// In-memory store for tests
#[cfg(any(test, feature = "test-util"))]
pub mod in_memory;

/// The body of an object, read incrementally.
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// A bucket in an S3-compatible object store.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Probe the size of an object in bytes without fetching its body.
    ///
    /// Fails with [`NotFound`] or [`AuthFailed`].
    ///
    /// [`NotFound`]: crate::error::ErrorKind::NotFound
    /// [`AuthFailed`]: crate::error::ErrorKind::AuthFailed
    async fn head_size(&self, key: &str) -> Result<u64, Error>;

    /// Open a stream over the body of an object.
    ///
    /// Fails with [`NotFound`], [`AuthFailed`] or [`NetworkError`].
    ///
    /// [`NotFound`]: crate::error::ErrorKind::NotFound
    /// [`AuthFailed`]: crate::error::ErrorKind::AuthFailed
    /// [`NetworkError`]: crate::error::ErrorKind::NetworkError
    async fn get_stream(&self, key: &str) -> Result<ObjectBody, Error>;

    /// List the keys in the bucket, in the order the store returns them.
    ///
    /// Only a single page is requested.
    async fn list_keys(&self) -> Result<Vec<String>, Error>;
}
