/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::cmp;
use std::sync::Arc;

use crate::error::Error;
use crate::listing::filter_zip_objects;
use crate::types::ConcurrencySetting;
use crate::Config;

/// Client for listing and downloading archives from a single bucket.
///
/// Cloning is cheap, all clones share the same store.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) handle: Arc<Handle>,
}

/// Whatever is needed to carry out operations, e.g. config, store
#[derive(Debug)]
pub(crate) struct Handle {
    pub(crate) config: crate::Config,
}

impl Handle {
    /// Maximum number of downloads in flight at once, `None` when unbounded.
    pub(crate) fn max_in_flight(&self) -> Option<usize> {
        match self.config.concurrency() {
            ConcurrencySetting::Auto => None,
            ConcurrencySetting::Explicit(limit) => Some(cmp::max(*limit, 1)),
        }
    }
}

impl Client {
    /// Creates a new client from a config.
    pub fn new(config: Config) -> Client {
        let handle = Arc::new(Handle { config });
        Client { handle }
    }

    /// Returns the client's configuration
    pub fn config(&self) -> &Config {
        &self.handle.config
    }

    /// List the `.zip` keys in the bucket, in store order.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// async fn print_archives(client: &s3_zip_fetch::Client) -> Result<(), s3_zip_fetch::error::Error> {
    ///     for (i, key) in client.list_zip_objects().await?.iter().enumerate() {
    ///         println!("{}: {key}", i + 1);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn list_zip_objects(&self) -> Result<Vec<String>, Error> {
        let keys = self.handle.config.store().list_keys().await?;
        let total = keys.len();
        let zips = filter_zip_objects(keys);
        tracing::debug!(total, matching = zips.len(), "listed bucket");
        Ok(zips)
    }

    /// Download several objects concurrently into a local directory.
    ///
    /// Constructs a fluent builder for the
    /// [`DownloadBatch`](crate::operation::download_batch::builders::DownloadBatchFluentBuilder) operation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::PathBuf;
    /// use s3_zip_fetch::error::Error;
    ///
    /// async fn download(client: &s3_zip_fetch::Client, dest: PathBuf) -> Result<(), Error> {
    ///     let handle = client
    ///         .download_batch()
    ///         .key("release-1.zip")
    ///         .key("release-2.zip")
    ///         .destination(dest)
    ///         .send()
    ///         .await?;
    ///
    ///     // wait for every download to finish or fail
    ///     let output = handle.join().await?;
    ///     for failed in output.failed_transfers() {
    ///         eprintln!("{} failed: {}", failed.key(), failed.error());
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn download_batch(
        &self,
    ) -> crate::operation::download_batch::builders::DownloadBatchFluentBuilder {
        crate::operation::download_batch::builders::DownloadBatchFluentBuilder::new(
            self.handle.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::in_memory::InMemoryStore;

    fn client(store: InMemoryStore, concurrency: ConcurrencySetting) -> Client {
        let config = Config::builder()
            .store(store)
            .concurrency(concurrency)
            .build()
            .unwrap();
        Client::new(config)
    }

    #[tokio::test]
    async fn test_list_zip_objects() {
        let store = InMemoryStore::new()
            .with_object("b.zip", "b")
            .with_object("notes.txt", "n")
            .with_object("a.zip", "a");
        let client = client(store, ConcurrencySetting::Auto);

        assert_eq!(vec!["b.zip", "a.zip"], client.list_zip_objects().await.unwrap());
    }

    #[tokio::test]
    async fn test_list_zip_objects_empty() {
        let client = client(InMemoryStore::new(), ConcurrencySetting::Auto);
        assert!(client.list_zip_objects().await.unwrap().is_empty());
    }

    #[test]
    fn test_max_in_flight() {
        let auto = client(InMemoryStore::new(), ConcurrencySetting::Auto);
        assert_eq!(None, auto.handle.max_in_flight());

        let zero = client(InMemoryStore::new(), ConcurrencySetting::Explicit(0));
        assert_eq!(Some(1), zero.handle.max_in_flight());

        let four = client(InMemoryStore::new(), ConcurrencySetting::Explicit(4));
        assert_eq!(Some(4), four.handle.max_in_flight());
    }

    #[tokio::test]
    async fn test_list_failure_propagates() {
        let store = InMemoryStore::new().with_list_failure(ErrorKind::AuthFailed);
        let client = client(store, ConcurrencySetting::Auto);

        let err = client.list_zip_objects().await.unwrap_err();
        assert_eq!(&ErrorKind::AuthFailed, err.kind());
    }
}
