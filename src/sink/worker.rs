//! Per-sink bounded queue and consumer task.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::entry::Entry;
use crate::key::QueueHandle;
use crate::sink::Backend;

/// Capacity of each sink's queue. Enqueue past this drops the entry.
pub(crate) const QUEUE_CAPACITY: usize = 4096;

#[derive(Debug)]
pub(crate) enum SinkMessage {
    Entry(Entry),
    Done,
}

/// A spawned consumer bound to one sink's queue.
///
/// The worker owns the backend: it writes entries in FIFO order, isolating
/// write failures and panics per entry, and closes the backend exactly once
/// after `Done` (or after every sender is gone).
#[derive(Debug)]
pub(crate) struct Worker {
    sender: mpsc::Sender<SinkMessage>,
    dropped: Arc<AtomicU64>,
    consumer: JoinHandle<()>,
}

pub(crate) fn spawn(mut backend: Box<dyn Backend>, dropped: Arc<AtomicU64>) -> Worker {
    let (sender, mut receiver) = mpsc::channel(QUEUE_CAPACITY);
    let consumer = tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            match message {
                SinkMessage::Entry(entry) => {
                    let _ = AssertUnwindSafe(backend.write(entry)).catch_unwind().await;
                }
                SinkMessage::Done => break,
            }
        }
        backend.close().await;
    });
    Worker {
        sender,
        dropped,
        consumer,
    }
}

impl Worker {
    /// A producer handle for the root key.
    pub(crate) fn queue(&self) -> QueueHandle {
        QueueHandle::new(self.sender.clone(), self.dropped.clone())
    }

    /// Shut the worker down: enqueue the sentinel (waiting for space if the
    /// queue is full) and block until the backlog is written and the
    /// backend closed.
    pub(crate) async fn quit(self) {
        let _ = self.sender.send(SinkMessage::Done).await;
        let _ = self.consumer.await;
    }
}
