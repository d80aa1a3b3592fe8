/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::StoreSettings;
use crate::error::{self, Error};

use super::{ObjectBody, ObjectStore};

const MAX_ATTEMPTS: u32 = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_POOL_CONNECTIONS: usize = 50;
const CREDENTIALS_PROVIDER_NAME: &str = "s3-zip-fetch-env";

/// [`ObjectStore`] backed by an `aws-sdk-s3` client bound to a single bucket.
///
/// At most 50 requests are open at once by default. An open object body counts against the
/// limit until it is dropped.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    connections: Arc<Semaphore>,
}

impl S3Store {
    /// Wrap an existing S3 client
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            connections: Arc::new(Semaphore::new(MAX_POOL_CONNECTIONS)),
        }
    }

    /// Limit the number of requests open at once, `0` is treated as `1`.
    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.connections = Arc::new(Semaphore::new(max_connections.max(1)));
        self
    }

    async fn connection(&self) -> Result<OwnedSemaphorePermit, Error> {
        self.connections
            .clone()
            .acquire_owned()
            .await
            .map_err(error::runtime_error)
    }

    /// Build a client for the configured endpoint, region and static credentials.
    ///
    /// Returns an error of kind [`CredentialsUnavailable`](crate::error::ErrorKind::CredentialsUnavailable)
    /// when either half of the credentials is missing.
    pub fn from_settings(settings: &StoreSettings) -> Result<Self, Error> {
        let (access_key_id, secret_access_key) = settings
            .credentials()
            .ok_or_else(error::credentials_unavailable)?;

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(settings.region().to_owned()))
            .endpoint_url(settings.endpoint_url())
            .retry_config(RetryConfig::standard().with_max_attempts(MAX_ATTEMPTS))
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(CONNECT_TIMEOUT)
                    .build(),
            )
            .build();

        tracing::debug!(
            endpoint = settings.endpoint_url(),
            region = settings.region(),
            bucket = settings.bucket(),
            "created S3 client"
        );

        Ok(Self::new(
            aws_sdk_s3::Client::from_conf(config),
            settings.bucket(),
        ))
    }

    /// The bucket every request is sent to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The underlying S3 client
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn head_size(&self, key: &str) -> Result<u64, Error> {
        let _connection = self.connection().await?;
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().map(|e| e.is_not_found()) == Some(true) {
                    error::not_found(err)
                } else {
                    Error::from(err)
                }
            })?;

        let size = output
            .content_length()
            .ok_or_else(|| format!("no content length returned for key '{key}'"))
            .and_then(|len| {
                u64::try_from(len).map_err(|_| format!("invalid content length {len} for key '{key}'"))
            })
            .map_err(error::from_kind(error::ErrorKind::ServiceError))?;

        Ok(size)
    }

    async fn get_stream(&self, key: &str) -> Result<ObjectBody, Error> {
        let connection = self.connection().await?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().map(|e| e.is_no_such_key()) == Some(true) {
                    error::not_found(err)
                } else {
                    Error::from(err)
                }
            })?;

        Ok(Box::pin(PooledBody {
            body: Box::pin(output.body.into_async_read()),
            _connection: connection,
        }))
    }

    async fn list_keys(&self) -> Result<Vec<String>, Error> {
        let _connection = self.connection().await?;
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await?;

        if output.is_truncated() == Some(true) {
            tracing::warn!(
                bucket = %self.bucket,
                "listing was truncated, only the first page of keys is used"
            );
        }

        let keys = output
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(str::to_owned))
            .collect();

        Ok(keys)
    }
}

/// An object body that keeps its connection slot until dropped
struct PooledBody {
    body: ObjectBody,
    _connection: OwnedSemaphorePermit,
}

impl AsyncRead for PooledBody {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.body.as_mut().poll_read(cx, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
    use aws_sdk_s3::operation::head_object::{HeadObjectError, HeadObjectOutput};
    use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::error::{NoSuchKey, NotFound};
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use tokio::io::AsyncReadExt;

    fn settings(vars: &[(&str, &str)]) -> StoreSettings {
        StoreSettings::from_vars(|name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn test_credentials_unavailable() {
        let settings = settings(&[("AWS_BUCKET_NAME", "releases")]);
        let err = S3Store::from_settings(&settings).unwrap_err();
        assert_eq!(&ErrorKind::CredentialsUnavailable, err.kind());
    }

    #[test]
    fn test_from_settings() {
        let settings = settings(&[
            ("AWS_BUCKET_NAME", "releases"),
            ("AWS_ACCESS_KEY_ID", "id"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]);
        let store = S3Store::from_settings(&settings).unwrap();
        assert_eq!("releases", store.bucket());
        assert_eq!(
            Some("eu-central-2"),
            store.client().config().region().map(|r| r.as_ref())
        );
    }

    #[tokio::test]
    async fn test_head_size() {
        let rule = mock!(aws_sdk_s3::Client::head_object)
            .match_requests(|r| r.bucket() == Some("releases") && r.key() == Some("a.zip"))
            .then_output(|| HeadObjectOutput::builder().content_length(1234).build());
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&rule]);
        let store = S3Store::new(client, "releases");

        assert_eq!(1234, store.head_size("a.zip").await.unwrap());
    }

    #[tokio::test]
    async fn test_head_size_not_found() {
        let rule = mock!(aws_sdk_s3::Client::head_object)
            .then_error(|| HeadObjectError::NotFound(NotFound::builder().build()));
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&rule]);
        let store = S3Store::new(client, "releases");

        let err = store.head_size("missing.zip").await.unwrap_err();
        assert_eq!(&ErrorKind::NotFound, err.kind());
    }

    #[tokio::test]
    async fn test_head_size_without_content_length() {
        let rule = mock!(aws_sdk_s3::Client::head_object)
            .then_output(|| HeadObjectOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&rule]);
        let store = S3Store::new(client, "releases");

        let err = store.head_size("a.zip").await.unwrap_err();
        assert_eq!(&ErrorKind::ServiceError, err.kind());
    }

    #[tokio::test]
    async fn test_get_stream() {
        let rule = mock!(aws_sdk_s3::Client::get_object)
            .match_requests(|r| r.key() == Some("a.zip"))
            .then_output(|| {
                GetObjectOutput::builder()
                    .body(ByteStream::from_static(b"zip contents"))
                    .content_length(12)
                    .build()
            });
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&rule]);
        let store = S3Store::new(client, "releases");

        let mut body = store.get_stream("a.zip").await.unwrap();
        let mut data = Vec::new();
        body.read_to_end(&mut data).await.unwrap();
        assert_eq!(b"zip contents".as_slice(), data.as_slice());
    }

    #[tokio::test]
    async fn test_open_body_holds_a_connection() {
        let get = mock!(aws_sdk_s3::Client::get_object).then_output(|| {
            GetObjectOutput::builder()
                .body(ByteStream::from_static(b"zip"))
                .build()
        });
        let head = mock!(aws_sdk_s3::Client::head_object)
            .then_output(|| HeadObjectOutput::builder().content_length(3).build());
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&get, &head]);
        let store = S3Store::new(client, "releases").with_max_connections(1);

        let body = store.get_stream("a.zip").await.unwrap();
        assert_eq!(0, store.connections.available_permits());

        // the probe waits for the only connection
        let blocked = tokio::time::timeout(Duration::from_millis(50), store.head_size("a.zip"));
        assert!(blocked.await.is_err());

        drop(body);
        assert_eq!(1, store.connections.available_permits());
        assert_eq!(3, store.head_size("a.zip").await.unwrap());
    }

    #[test]
    fn test_default_connection_limit() {
        let settings = settings(&[
            ("AWS_BUCKET_NAME", "releases"),
            ("AWS_ACCESS_KEY_ID", "id"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]);
        let store = S3Store::from_settings(&settings).unwrap();
        assert_eq!(MAX_POOL_CONNECTIONS, store.connections.available_permits());
    }

    #[tokio::test]
    async fn test_get_stream_no_such_key() {
        let rule = mock!(aws_sdk_s3::Client::get_object)
            .then_error(|| GetObjectError::NoSuchKey(NoSuchKey::builder().build()));
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&rule]);
        let store = S3Store::new(client, "releases");

        let err = store.get_stream("missing.zip").await.err().unwrap();
        assert_eq!(&ErrorKind::NotFound, err.kind());
    }

    #[tokio::test]
    async fn test_list_keys_preserves_store_order() {
        let rule = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|r| r.bucket() == Some("releases"))
            .then_output(|| {
                ListObjectsV2Output::builder()
                    .contents(aws_sdk_s3::types::Object::builder().key("b.zip").build())
                    .contents(aws_sdk_s3::types::Object::builder().key("a.txt").build())
                    .contents(aws_sdk_s3::types::Object::builder().key("a.zip").build())
                    .build()
            });
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&rule]);
        let store = S3Store::new(client, "releases");

        let keys = store.list_keys().await.unwrap();
        assert_eq!(vec!["b.zip", "a.txt", "a.zip"], keys);
    }

    #[tokio::test]
    async fn test_list_keys_empty_bucket() {
        let rule = mock!(aws_sdk_s3::Client::list_objects_v2)
            .then_output(|| ListObjectsV2Output::builder().build());
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&rule]);
        let store = S3Store::new(client, "releases");

        assert!(store.list_keys().await.unwrap().is_empty());
    }
}
