//! The ambient key threaded through every task invocation.
//!
//! A [`Key`] bundles the current namespace, the accumulated context pairs,
//! the process identity captured at driver start, and one queue handle per
//! configured sink. Keys are immutable: scoping builds an extended copy for
//! the inner computation and the outer key is untouched, so sibling scopes
//! never observe each other's extensions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::entry::Entry;
use crate::sink::worker::SinkMessage;

/// Handle to one sink's bounded queue.
///
/// Enqueueing never blocks: a full queue drops the entry and bumps the
/// sink's drop counter.
#[derive(Debug, Clone)]
pub(crate) struct QueueHandle {
    sender: mpsc::Sender<SinkMessage>,
    dropped: Arc<AtomicU64>,
}

impl QueueHandle {
    pub(crate) fn new(sender: mpsc::Sender<SinkMessage>, dropped: Arc<AtomicU64>) -> Self {
        QueueHandle { sender, dropped }
    }

    /// Non-blocking enqueue. Drops the entry when the queue is full; a
    /// closed queue (worker already gone during shutdown) is ignored.
    pub(crate) fn offer(&self, entry: Entry) {
        match self.sender.try_send(SinkMessage::Entry(entry)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}

/// The immutable ambient carrier handed to every task.
///
/// A key is created by the driver, extended by [`Task::context`] for the
/// dynamic extent of an inner task, and destroyed when the outer task
/// returns. The queue handles are fixed for the lifetime of one driver
/// invocation, so every key derived from the same run fans out to the same
/// sinks.
///
/// [`Task::context`]: crate::Task::context
///
/// # Examples
///
/// ```
/// use watershed::Key;
///
/// let key = Key::detached();
/// assert_eq!(key.namespace(), "");
/// assert!(key.context().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Key {
    namespace: String,
    context: Vec<(String, String)>,
    host: String,
    pid: u32,
    queues: Vec<QueueHandle>,
}

impl Key {
    /// The root key of a driver run, with every queue handle populated.
    pub(crate) fn root(host: String, pid: u32, queues: Vec<QueueHandle>) -> Self {
        Key {
            namespace: String::new(),
            context: Vec::new(),
            host,
            pid,
            queues,
        }
    }

    /// A key with no sinks attached.
    ///
    /// Tasks run against a detached key execute normally but their log
    /// calls discard silently. This is how custom sinks drive their
    /// user-supplied open/write/close tasks.
    pub fn detached() -> Self {
        Key {
            namespace: String::new(),
            context: Vec::new(),
            host: String::new(),
            pid: std::process::id(),
            queues: Vec::new(),
        }
    }

    /// Extend this key for a nested scope.
    ///
    /// The namespace is concatenated without injecting a separator and the
    /// pairs are appended after the existing context. Host, pid and queues
    /// carry over unchanged.
    pub(crate) fn descend(&self, namespace: &str, pairs: Vec<(String, String)>) -> Self {
        let mut extended_namespace =
            String::with_capacity(self.namespace.len() + namespace.len());
        extended_namespace.push_str(&self.namespace);
        extended_namespace.push_str(namespace);

        let mut context = Vec::with_capacity(self.context.len() + pairs.len());
        context.extend(self.context.iter().cloned());
        context.extend(pairs);

        Key {
            namespace: extended_namespace,
            context,
            host: self.host.clone(),
            pid: self.pid,
            queues: self.queues.clone(),
        }
    }

    /// The accumulated namespace prefix.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The accumulated context pairs, oldest first. Duplicates are kept.
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Host name captured at driver start.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Process id captured at driver start.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub(crate) fn queues(&self) -> &[QueueHandle] {
        &self.queues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|&(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn descend_concatenates_namespace_without_separator() {
        let root = Key::root("host".to_string(), 7, Vec::new());
        let api = root.descend("api", Vec::new());
        let ping = api.descend("/ping", Vec::new());

        assert_eq!(api.namespace(), "api");
        assert_eq!(ping.namespace(), "api/ping");
    }

    #[test]
    fn descend_appends_context_preserving_order_and_duplicates() {
        let root = Key::root("host".to_string(), 7, Vec::new());
        let outer = root.descend("a", pairs(&[("rid", "1")]));
        let inner = outer.descend("b", pairs(&[("rid", "2"), ("user", "u")]));

        assert_eq!(
            inner.context(),
            pairs(&[("rid", "1"), ("rid", "2"), ("user", "u")]).as_slice()
        );
    }

    #[test]
    fn descend_leaves_parent_untouched() {
        let root = Key::root("host".to_string(), 7, Vec::new());
        let _child = root.descend("child", pairs(&[("k", "v")]));

        assert_eq!(root.namespace(), "");
        assert!(root.context().is_empty());
    }

    #[test]
    fn siblings_do_not_observe_each_other() {
        let root = Key::root("host".to_string(), 7, Vec::new());
        let left = root.descend("left", pairs(&[("side", "l")]));
        let right = root.descend("right", pairs(&[("side", "r")]));

        assert_eq!(left.namespace(), "left");
        assert_eq!(right.namespace(), "right");
        assert_eq!(left.context(), pairs(&[("side", "l")]).as_slice());
        assert_eq!(right.context(), pairs(&[("side", "r")]).as_slice());
    }

    #[test]
    fn identity_carries_over() {
        let root = Key::root("box-1".to_string(), 41, Vec::new());
        let child = root.descend("ns", Vec::new());

        assert_eq!(child.host(), "box-1");
        assert_eq!(child.pid(), 41);
    }
}
