//! Sink configuration and the erased backend it opens into.
//!
//! A [`Sink`] is configuration only: nothing is opened until the driver
//! starts. Opening yields a backend (write/close over the sink's resource)
//! plus a spawned worker that drains the sink's bounded queue; see
//! [`worker`] for the consumption protocol.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::entry::Entry;
use crate::key::Key;
use crate::task::{BoxFuture, Task};

mod custom;
mod file;
mod terminal;
pub(crate) mod worker;

use custom::CustomBackend;
use file::FileBackend;
use terminal::TerminalBackend;
use worker::Worker;

/// Failure while opening a sink or inside a user-supplied sink task.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink's file could not be opened.
    #[error("failed to open {path:?}: {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A user-supplied sink task failed.
    #[error("{0}")]
    Sink(String),
}

impl SinkError {
    /// A sink error carrying a plain message, for custom sink tasks.
    pub fn message(message: impl Into<String>) -> Self {
        SinkError::Sink(message.into())
    }
}

/// Open/write/close over an opaque resource, object-safe for the worker.
///
/// Write failures never surface: a sink that misbehaves loses its own
/// entries, nothing else.
#[async_trait]
pub(crate) trait Backend: Send {
    async fn write(&mut self, entry: Entry);
    async fn close(self: Box<Self>);
}

struct DiscardBackend;

#[async_trait]
impl Backend for DiscardBackend {
    async fn write(&mut self, _entry: Entry) {}
    async fn close(self: Box<Self>) {}
}

type CustomOpen =
    Box<dyn FnOnce() -> BoxFuture<'static, Result<Box<dyn Backend>, SinkError>> + Send>;

enum SinkKind {
    Discard,
    Terminal,
    File(PathBuf),
    Custom(CustomOpen),
}

/// Configuration for one log destination.
///
/// Constructed with [`Sink::none`], [`Sink::terminal`], [`Sink::file`] or
/// [`Sink::custom`], optionally refined with [`Sink::with_drop_counter`],
/// then handed to [`perform`](crate::perform()).
///
/// # Examples
///
/// ```
/// use std::sync::atomic::AtomicU64;
/// use std::sync::Arc;
/// use watershed::Sink;
///
/// let dropped = Arc::new(AtomicU64::new(0));
/// let sink = Sink::terminal().with_drop_counter(dropped.clone());
/// ```
pub struct Sink {
    kind: SinkKind,
    dropped: Arc<AtomicU64>,
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            SinkKind::Discard => "None",
            SinkKind::Terminal => "Terminal",
            SinkKind::File(_) => "File",
            SinkKind::Custom(_) => "Custom",
        };
        f.debug_struct("Sink").field("kind", &kind).finish()
    }
}

impl Sink {
    /// A sink that discards every entry.
    pub fn none() -> Self {
        Sink {
            kind: SinkKind::Discard,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A sink that renders entries to stdout with a severity-coloured
    /// header.
    pub fn terminal() -> Self {
        Sink {
            kind: SinkKind::Terminal,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A sink that appends one serialised JSON line per entry to the file
    /// at `path`, creating it if needed.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Sink {
            kind: SinkKind::File(path.into()),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A sink defined by user-supplied open/write/close tasks over a
    /// resource of type `R`.
    ///
    /// `open` runs once at driver start against a detached key; its failure
    /// is fatal and aborts the driver. `write` runs per entry with its
    /// result discarded, so a failing write loses that entry and nothing
    /// more. `close` runs once after the sink's queue has drained.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use watershed::{Entry, Sink, Task};
    ///
    /// let seen: Arc<Mutex<Vec<Entry>>> = Arc::new(Mutex::new(Vec::new()));
    /// let store = seen.clone();
    /// let sink = Sink::custom(
    ///     move || Task::succeed(store),
    ///     |store: &Arc<Mutex<Vec<Entry>>>, entry| {
    ///         if let Ok(mut entries) = store.lock() {
    ///             entries.push(entry);
    ///         }
    ///         Task::succeed(())
    ///     },
    ///     |_store| Task::succeed(()),
    /// );
    /// ```
    pub fn custom<R, O, W, C>(open: O, write: W, close: C) -> Self
    where
        R: Send + Sync + 'static,
        O: FnOnce() -> Task<R, SinkError> + Send + 'static,
        W: Fn(&R, Entry) -> Task<(), SinkError> + Send + Sync + 'static,
        C: FnOnce(R) -> Task<(), SinkError> + Send + 'static,
    {
        let open: CustomOpen = Box::new(move || {
            Box::pin(async move {
                let key = Key::detached();
                let resource = open().run(&key).await?;
                let backend: Box<dyn Backend> =
                    Box::new(CustomBackend::new(resource, write, close));
                Ok(backend)
            })
        });
        Sink {
            kind: SinkKind::Custom(open),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Observe this sink's dropped entries through a shared counter.
    ///
    /// The runtime increments the counter every time the sink's queue is
    /// full at enqueue time and the entry is discarded.
    pub fn with_drop_counter(mut self, counter: Arc<AtomicU64>) -> Self {
        self.dropped = counter;
        self
    }

    /// Open the resource and spawn the worker that consumes its queue.
    pub(crate) async fn open(self) -> Result<Worker, SinkError> {
        let backend: Box<dyn Backend> = match self.kind {
            SinkKind::Discard => Box::new(DiscardBackend),
            SinkKind::Terminal => Box::new(TerminalBackend),
            SinkKind::File(path) => Box::new(FileBackend::open(&path).await?),
            SinkKind::Custom(open) => open().await?,
        };
        Ok(worker::spawn(backend, self.dropped))
    }
}
