/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt::Debug;

use crate::error::Error;

/// Receives progress for every download in a batch.
///
/// One [`TaskProgress`] is requested per download, from inside that download's task. Calls for
/// different downloads may arrive concurrently.
pub trait ProgressSink: Send + Sync + Debug {
    /// A download for `key` is starting
    fn task_started(&self, key: &str) -> Box<dyn TaskProgress>;
}

/// Progress of a single download.
///
/// `set_total` is always called before the first `advance`. Exactly one of `finish` or `fail`
/// is called last, `fail` also when the download is aborted or panics.
pub trait TaskProgress: Send {
    /// The probed size of the object
    fn set_total(&mut self, total_bytes: u64);

    /// `bytes` more bytes were written to disk
    fn advance(&mut self, bytes: u64);

    /// The download completed
    fn finish(&mut self);

    /// The download stopped with `error`
    fn fail(&mut self, error: &Error);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn task_started(&self, _key: &str) -> Box<dyn TaskProgress> {
        Box::new(NoProgress)
    }
}

impl TaskProgress for NoProgress {
    fn set_total(&mut self, _total_bytes: u64) {}
    fn advance(&mut self, _bytes: u64) {}
    fn finish(&mut self) {}
    fn fail(&mut self, _error: &Error) {}
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::{Arc, Mutex};

    use super::{ProgressSink, TaskProgress};
    use crate::error::{Error, ErrorKind};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Event {
        Started,
        Total(u64),
        Advance(u64),
        Finished,
        Failed(ErrorKind),
    }

    /// Records every event per key, in arrival order.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingSink {
        events: Arc<Mutex<Vec<(String, Event)>>>,
    }

    impl RecordingSink {
        pub(crate) fn events_for(&self, key: &str) -> Vec<Event> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, e)| e.clone())
                .collect()
        }

        pub(crate) fn is_finished(&self, key: &str) -> bool {
            self.events_for(key).contains(&Event::Finished)
        }
    }

    impl ProgressSink for RecordingSink {
        fn task_started(&self, key: &str) -> Box<dyn TaskProgress> {
            let task = RecordingTask {
                key: key.to_owned(),
                events: self.events.clone(),
            };
            task.record(Event::Started);
            Box::new(task)
        }
    }

    struct RecordingTask {
        key: String,
        events: Arc<Mutex<Vec<(String, Event)>>>,
    }

    impl RecordingTask {
        fn record(&self, event: Event) {
            self.events.lock().unwrap().push((self.key.clone(), event));
        }
    }

    impl TaskProgress for RecordingTask {
        fn set_total(&mut self, total_bytes: u64) {
            self.record(Event::Total(total_bytes));
        }

        fn advance(&mut self, bytes: u64) {
            self.record(Event::Advance(bytes));
        }

        fn finish(&mut self) {
            self.record(Event::Finished);
        }

        fn fail(&mut self, error: &Error) {
            self.record(Event::Failed(error.kind().clone()));
        }
    }
}
