//! Test support.
//!
//! [`CaptureSink`] records every entry delivered to it, so tests can
//! assert on what a task actually logged - including the merged namespace
//! and context pairs - without scraping terminal output.

use std::sync::{Arc, Mutex};

use crate::entry::Entry;
use crate::sink::Sink;
use crate::task::Task;

/// A cloneable in-memory sink.
///
/// Clones share the same store: keep one handle for assertions and turn
/// another into the [`Sink`] passed to [`perform`](crate::perform()).
///
/// # Examples
///
/// ```
/// use watershed::testing::CaptureSink;
/// use watershed::{log, perform, Task};
///
/// # tokio_test::block_on(async {
/// let capture = CaptureSink::new();
/// let task: Task<(), String> = log::info("job", "started", &[]);
///
/// perform(vec![capture.sink()], task).await.unwrap();
///
/// assert_eq!(capture.entries().len(), 1);
/// assert_eq!(capture.entries()[0].message, "started");
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl CaptureSink {
    /// An empty capture store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`Sink`] that records into this store.
    pub fn sink(&self) -> Sink {
        let store = self.entries.clone();
        Sink::custom(
            move || Task::succeed(store),
            |store: &Arc<Mutex<Vec<Entry>>>, entry| {
                if let Ok(mut entries) = store.lock() {
                    entries.push(entry);
                }
                Task::succeed(())
            },
            |_store| Task::succeed(()),
        )
    }

    /// Everything delivered so far, in delivery order.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Number of entries delivered so far.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether nothing has been delivered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
