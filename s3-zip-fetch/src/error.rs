/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// NOTE: Use [`aws_sdk_s3::error::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

/// General categories of errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Operation input validation issues, including unparseable selections
    InputInvalid,

    /// I/O errors
    IOError,

    /// Some kind of internal runtime issue (e.g. task failure, illegal state transition)
    RuntimeError,

    /// Resource not found (e.g. bucket, key, requested file missing from the listing)
    NotFound,

    /// The store rejected the request credentials
    AuthFailed,

    /// The request never produced a usable response (connect, timeout, broken body)
    NetworkError,

    /// The store returned an error that does not fit any other category
    ServiceError,

    /// No credentials were configured for the store
    CredentialsUnavailable,

    /// Probing the size of an object failed
    ProbeFailed,

    /// Streaming the body of an object to disk failed
    StreamFailed,
}

impl Error {
    /// Creates a new [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Whether this error signals that no store credentials were configured.
    pub fn is_credentials_unavailable(&self) -> bool {
        self.kind == ErrorKind::CredentialsUnavailable
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InputInvalid => write!(f, "invalid input"),
            ErrorKind::IOError => write!(f, "I/O error"),
            ErrorKind::RuntimeError => write!(f, "runtime error"),
            ErrorKind::NotFound => write!(f, "resource not found"),
            ErrorKind::AuthFailed => write!(f, "access denied"),
            ErrorKind::NetworkError => write!(f, "network error"),
            ErrorKind::ServiceError => write!(f, "service error"),
            ErrorKind::CredentialsUnavailable => write!(f, "credentials unavailable"),
            ErrorKind::ProbeFailed => write!(f, "failed to probe object size"),
            ErrorKind::StreamFailed => write!(f, "failed to stream object"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::new(ErrorKind::RuntimeError, value)
    }
}

impl From<aws_smithy_types::error::operation::BuildError> for Error {
    fn from(value: aws_smithy_types::error::operation::BuildError) -> Self {
        Self::new(ErrorKind::InputInvalid, value)
    }
}

impl<E> From<SdkError<E, HttpResponse>> for Error
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
{
    fn from(value: SdkError<E, HttpResponse>) -> Self {
        let kind = sdk_error_kind(&value);
        Error::new(kind, value)
    }
}

fn sdk_error_kind<E>(err: &SdkError<E, HttpResponse>) -> ErrorKind
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) | SdkError::ResponseError(_) => {
            return ErrorKind::NetworkError
        }
        SdkError::ConstructionFailure(_) => return ErrorKind::InputInvalid,
        _ => {}
    }

    match err.code() {
        Some("NotFound" | "NoSuchKey" | "NoSuchBucket") => return ErrorKind::NotFound,
        Some("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "Forbidden") => {
            return ErrorKind::AuthFailed
        }
        _ => {}
    }

    // HEAD responses carry no body, the status code is all there is to go on
    match err.raw_response().map(|resp| resp.status().as_u16()) {
        Some(404) => ErrorKind::NotFound,
        Some(401 | 403) => ErrorKind::AuthFailed,
        _ => ErrorKind::ServiceError,
    }
}

pub(crate) fn invalid_input<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, err)
}

pub(crate) fn not_found<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::NotFound, err)
}

pub(crate) fn runtime_error<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::RuntimeError, err)
}

pub(crate) fn from_kind<E>(kind: ErrorKind) -> impl FnOnce(E) -> Error
where
    E: Into<BoxError>,
{
    |err| Error::new(kind, err)
}

static CREDENTIALS_UNAVAILABLE: &str = "AWS credentials not provided";

pub(crate) fn credentials_unavailable() -> Error {
    Error::new(ErrorKind::CredentialsUnavailable, CREDENTIALS_UNAVAILABLE)
}
