/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */

//! List and download `.zip` archives from an S3-compatible bucket.
//!
//! The crate is split into a thin object store adapter ([`store`]), a listing filter
//! ([`listing`]), a selection resolver ([`selection`]) and a download orchestrator reachable
//! through [`Client::download_batch`].
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> Result<(), s3_zip_fetch::error::Error> {
//! use s3_zip_fetch::config::StoreSettings;
//! use s3_zip_fetch::store::S3Store;
//!
//! let settings = StoreSettings::from_env()?;
//! let store = S3Store::from_settings(&settings)?;
//! let config = s3_zip_fetch::Config::builder().store(store).build()?;
//! let client = s3_zip_fetch::Client::new(config);
//!
//! let keys = client.list_zip_objects().await?;
//! let handle = client
//!     .download_batch()
//!     .keys(keys)
//!     .destination(settings.download_dir())
//!     .send()
//!     .await?;
//!
//! let output = handle.join().await?;
//! println!("downloaded {} files", output.objects_downloaded());
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Features
//!
//! - `test-util`: Enables the in-memory object store used by tests. DO NOT ENABLE IN PRODUCTION.

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

/// Size of each read issued against an object body.
pub(crate) const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Error types emitted by `s3-zip-fetch`
pub mod error;

/// Common types used by `s3-zip-fetch`
pub mod types;

/// Client and environment configuration
pub mod config;

/// Object store adapter
pub mod store;

/// Filtering of bucket listings
pub mod listing;

/// Resolution of user selections against a listing
pub mod selection;

/// Progress reporting for downloads
pub mod progress;

/// Download client
pub mod client;

/// Client operations
pub mod operation;

pub use self::client::Client;
pub use self::config::Config;
