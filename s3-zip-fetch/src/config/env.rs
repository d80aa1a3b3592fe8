/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{self, Error};

const DEFAULT_ENDPOINT_URL: &str = "https://s3.eu-central-2.wasabisys.com";
const DEFAULT_REGION: &str = "eu-central-2";
const DEFAULT_DOWNLOAD_DIR: &str = ".";

/// Connection and destination settings read from the process environment.
///
/// | Variable                | Required | Default                                 |
/// |-------------------------|----------|-----------------------------------------|
/// | `AWS_BUCKET_NAME`       | yes      |                                         |
/// | `DOWNLOAD_DIR`          | no       | `.`                                     |
/// | `AWS_ENDPOINT_URL`      | no       | `https://s3.eu-central-2.wasabisys.com` |
/// | `AWS_DEFAULT_REGION`    | no       | `eu-central-2`                          |
/// | `AWS_ACCESS_KEY_ID`     | no       |                                         |
/// | `AWS_SECRET_ACCESS_KEY` | no       |                                         |
///
/// Empty values are treated the same as unset ones.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreSettings {
    bucket: String,
    download_dir: PathBuf,
    endpoint_url: String,
    region: String,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
}

impl StoreSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bucket = var("AWS_BUCKET_NAME").ok_or_else(|| {
            error::invalid_input("AWS_BUCKET_NAME must be set to the bucket to list")
        })?;

        Ok(Self {
            bucket,
            download_dir: var("DOWNLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_DIR.to_owned())
                .into(),
            endpoint_url: var("AWS_ENDPOINT_URL").unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_owned()),
            region: var("AWS_DEFAULT_REGION").unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            access_key_id: var("AWS_ACCESS_KEY_ID"),
            secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
        })
    }

    /// The bucket to list and download from
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The local directory downloads are written to
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Override the local directory downloads are written to
    pub fn set_download_dir(&mut self, dir: impl Into<PathBuf>) {
        self.download_dir = dir.into();
    }

    /// The store endpoint
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// The store region
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The access key id and secret, if both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("bucket", &self.bucket)
            .field("download_dir", &self.download_dir)
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<StoreSettings, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StoreSettings::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[("AWS_BUCKET_NAME", "releases")]).unwrap();
        assert_eq!("releases", settings.bucket());
        assert_eq!(Path::new("."), settings.download_dir());
        assert_eq!(DEFAULT_ENDPOINT_URL, settings.endpoint_url());
        assert_eq!(DEFAULT_REGION, settings.region());
        assert_eq!(None, settings.credentials());
    }

    #[test]
    fn test_missing_bucket() {
        let err = settings(&[("DOWNLOAD_DIR", "/tmp")]).unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }

    #[test]
    fn test_empty_credentials_are_absent() {
        let settings = settings(&[
            ("AWS_BUCKET_NAME", "releases"),
            ("AWS_ACCESS_KEY_ID", ""),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ])
        .unwrap();
        assert_eq!(None, settings.credentials());
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("AWS_BUCKET_NAME", "releases"),
            ("DOWNLOAD_DIR", "/tmp/zips"),
            ("AWS_ENDPOINT_URL", "http://localhost:9000"),
            ("AWS_DEFAULT_REGION", "us-east-1"),
            ("AWS_ACCESS_KEY_ID", "id"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ])
        .unwrap();
        assert_eq!(Path::new("/tmp/zips"), settings.download_dir());
        assert_eq!("http://localhost:9000", settings.endpoint_url());
        assert_eq!("us-east-1", settings.region());
        assert_eq!(Some(("id", "secret")), settings.credentials());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let settings = settings(&[
            ("AWS_BUCKET_NAME", "releases"),
            ("AWS_ACCESS_KEY_ID", "id"),
            ("AWS_SECRET_ACCESS_KEY", "hunter2"),
        ])
        .unwrap();
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
