//! Severity-tagged log entry points.
//!
//! Each function returns a `Task<(), E>` that, when invoked, captures the
//! current wall-clock time, merges its arguments with the ambient [`Key`]
//! into an [`Entry`], and hands the entry to every sink queue in the key.
//! Logging is a side channel: it never fails the program and never blocks
//! it. A full queue drops the entry for that sink and bumps the sink's
//! drop counter; delivery to the remaining sinks is unaffected.
//!
//! [`Key`]: crate::Key
//!
//! # Examples
//!
//! ```
//! use watershed::testing::CaptureSink;
//! use watershed::{log, perform, Severity, Task};
//!
//! # tokio_test::block_on(async {
//! let capture = CaptureSink::new();
//! let task: Task<(), String> = log::warning("cache", "miss", &[("key", "user:7")]);
//!
//! perform(vec![capture.sink()], task).await.unwrap();
//!
//! let entries = capture.entries();
//! assert_eq!(entries[0].severity, Severity::Warning);
//! assert_eq!(entries[0].message, "miss");
//! # });
//! ```

use crate::entry::{Entry, Severity};
use crate::task::Task;

/// Log at [`Severity::Debug`].
pub fn debug<E>(
    namespace: impl Into<String>,
    message: impl Into<String>,
    pairs: &[(&str, &str)],
) -> Task<(), E>
where
    E: Send + 'static,
{
    emit(Severity::Debug, namespace, message, pairs)
}

/// Log at [`Severity::Info`].
pub fn info<E>(
    namespace: impl Into<String>,
    message: impl Into<String>,
    pairs: &[(&str, &str)],
) -> Task<(), E>
where
    E: Send + 'static,
{
    emit(Severity::Info, namespace, message, pairs)
}

/// Log at [`Severity::Warning`].
pub fn warning<E>(
    namespace: impl Into<String>,
    message: impl Into<String>,
    pairs: &[(&str, &str)],
) -> Task<(), E>
where
    E: Send + 'static,
{
    emit(Severity::Warning, namespace, message, pairs)
}

/// Log at [`Severity::Error`].
pub fn error<E>(
    namespace: impl Into<String>,
    message: impl Into<String>,
    pairs: &[(&str, &str)],
) -> Task<(), E>
where
    E: Send + 'static,
{
    emit(Severity::Error, namespace, message, pairs)
}

/// Log at [`Severity::Alert`].
pub fn alert<E>(
    namespace: impl Into<String>,
    message: impl Into<String>,
    pairs: &[(&str, &str)],
) -> Task<(), E>
where
    E: Send + 'static,
{
    emit(Severity::Alert, namespace, message, pairs)
}

/// Build the entry against the ambient key and fan it out, one
/// non-blocking enqueue per sink.
fn emit<E>(
    severity: Severity,
    namespace: impl Into<String>,
    message: impl Into<String>,
    pairs: &[(&str, &str)],
) -> Task<(), E>
where
    E: Send + 'static,
{
    let namespace = namespace.into();
    let message = message.into();
    let pairs: Vec<(String, String)> = pairs
        .iter()
        .map(|&(name, value)| (name.to_string(), value.to_string()))
        .collect();

    Task {
        run_fn: Box::new(move |key| {
            let entry = Entry::record(severity, key, &namespace, &message, pairs);
            for queue in key.queues() {
                queue.offer(entry.clone());
            }
            Box::pin(async { Ok(()) })
        }),
    }
}
