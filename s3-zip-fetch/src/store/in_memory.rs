/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! In-memory implementation of the ObjectStore trait.

use std::cmp;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::Notify;

use crate::error::{self, Error, ErrorKind};
use crate::store::{ObjectBody, ObjectStore};

#[derive(Debug, Clone)]
struct InMemoryObject {
    data: Bytes,
    probe_error: Option<ErrorKind>,
    fail_after: Option<usize>,
    stall_after: Option<usize>,
    gate: Option<Arc<Notify>>,
}

impl InMemoryObject {
    fn new(data: Bytes) -> Self {
        Self {
            data,
            probe_error: None,
            fail_after: None,
            stall_after: None,
            gate: None,
        }
    }
}

/// An in-memory [`ObjectStore`] with scripted failures.
///
/// Objects are listed in insertion order. Every request is counted so tests can assert that
/// no download was attempted.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: Vec<(String, InMemoryObject)>,
    list_error: Option<ErrorKind>,
    head_requests: AtomicUsize,
    get_requests: AtomicUsize,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object with the given contents
    pub fn with_object(self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.with(key, InMemoryObject::new(data.into()))
    }

    /// Add an object whose size probe fails with `kind`
    pub fn with_probe_failure(self, key: impl Into<String>, kind: ErrorKind) -> Self {
        let mut obj = InMemoryObject::new(Bytes::new());
        obj.probe_error = Some(kind);
        self.with(key, obj)
    }

    /// Add an object whose body stream errors once `fail_after` bytes have been read
    pub fn with_stream_failure(
        self,
        key: impl Into<String>,
        data: impl Into<Bytes>,
        fail_after: usize,
    ) -> Self {
        let mut obj = InMemoryObject::new(data.into());
        obj.fail_after = Some(fail_after);
        self.with(key, obj)
    }

    /// Add an object whose body stream never yields more than `stall_after` bytes
    pub fn with_stalled_stream(
        self,
        key: impl Into<String>,
        data: impl Into<Bytes>,
        stall_after: usize,
    ) -> Self {
        let mut obj = InMemoryObject::new(data.into());
        obj.stall_after = Some(stall_after);
        self.with(key, obj)
    }

    /// Add an object whose body stream does not open until `gate` is notified
    pub fn with_gated_object(
        self,
        key: impl Into<String>,
        data: impl Into<Bytes>,
        gate: Arc<Notify>,
    ) -> Self {
        let mut obj = InMemoryObject::new(data.into());
        obj.gate = Some(gate);
        self.with(key, obj)
    }

    /// Make listing the store fail with `kind`
    pub fn with_list_failure(mut self, kind: ErrorKind) -> Self {
        self.list_error = Some(kind);
        self
    }

    fn with(mut self, key: impl Into<String>, obj: InMemoryObject) -> Self {
        self.objects.push((key.into(), obj));
        self
    }

    fn object(&self, key: &str) -> Result<&InMemoryObject, Error> {
        self.objects
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, obj)| obj)
            .ok_or_else(|| error::not_found(format!("no such key: '{key}'")))
    }

    /// Number of size probes received
    pub fn head_requests(&self) -> usize {
        self.head_requests.load(Ordering::SeqCst)
    }

    /// Number of body streams requested
    pub fn get_requests(&self) -> usize {
        self.get_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn head_size(&self, key: &str) -> Result<u64, Error> {
        self.head_requests.fetch_add(1, Ordering::SeqCst);
        let obj = self.object(key)?;
        if let Some(kind) = &obj.probe_error {
            return Err(Error::new(kind.clone(), format!("probe of '{key}' rejected")));
        }
        Ok(obj.data.len() as u64)
    }

    async fn get_stream(&self, key: &str) -> Result<ObjectBody, Error> {
        self.get_requests.fetch_add(1, Ordering::SeqCst);
        let obj = self.object(key)?.clone();
        if let Some(gate) = &obj.gate {
            gate.notified().await;
        }
        Ok(Box::pin(ObjectReader {
            data: obj.data,
            pos: 0,
            fail_after: obj.fail_after,
            stall_after: obj.stall_after,
        }))
    }

    async fn list_keys(&self) -> Result<Vec<String>, Error> {
        if let Some(kind) = &self.list_error {
            return Err(Error::new(kind.clone(), "listing rejected"));
        }
        Ok(self.objects.iter().map(|(k, _)| k.clone()).collect())
    }
}

/// Serves `data` and then either ends the stream or, when `fail_after` is set, fails once that
/// many bytes have been handed out. With `stall_after` set it stops making progress instead.
#[derive(Debug)]
struct ObjectReader {
    data: Bytes,
    pos: usize,
    fail_after: Option<usize>,
    stall_after: Option<usize>,
}

impl AsyncRead for ObjectReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let limit = self
            .fail_after
            .map_or(self.data.len(), |n| cmp::min(n, self.data.len()));

        if self.stall_after.is_some_and(|n| self.pos >= n) {
            return Poll::Pending;
        }

        if self.pos >= limit {
            if self.fail_after.is_some() {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )));
            }
            return Poll::Ready(Ok(()));
        }

        let limit = self.stall_after.map_or(limit, |n| cmp::min(n, limit));
        let n = cmp::min(buf.remaining(), limit - self.pos);
        let start = self.pos;
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}
