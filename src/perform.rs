//! The top-level driver.
//!
//! [`perform`] is the only place resources live: it opens every sink,
//! spawns their workers, builds the root [`Key`], runs the task, and
//! guarantees that every worker drains and every sink closes on all exit
//! paths - success, domain error, or a panic inside the task body.

use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use thiserror::Error;

use crate::key::Key;
use crate::sink::worker::Worker;
use crate::sink::{Sink, SinkError};
use crate::task::Task;

/// Why a driver run did not produce the task's success value.
#[derive(Debug, Error)]
pub enum PerformError<E>
where
    E: fmt::Debug,
{
    /// A sink failed to open; the task never ran.
    #[error("sink failed to open: {0}")]
    Sink(#[from] SinkError),
    /// The task itself failed with its domain error.
    #[error("task failed: {0:?}")]
    Task(E),
}

impl<E> PerformError<E>
where
    E: fmt::Debug,
{
    /// The domain error, if the task ran and failed.
    pub fn into_task_error(self) -> Option<E> {
        match self {
            PerformError::Task(error) => Some(error),
            PerformError::Sink(_) => None,
        }
    }
}

/// Run a task under a full logging runtime.
///
/// Sinks are opened in declaration order, each with its own bounded queue
/// and worker. If any open fails (only [`Sink::custom`] can), the sinks
/// already started are shut down and [`PerformError::Sink`] is returned -
/// nothing is left dangling. Otherwise the task runs with the root key and,
/// whatever the outcome, every worker is then told to finish, awaited until
/// its queue has drained, and its resource closed, in declaration order. A
/// panic in the task body resumes only after that shutdown completes.
///
/// When `perform` returns, every entry that was not dropped has been
/// written.
///
/// # Examples
///
/// ```
/// use watershed::{log, perform, Sink, Task};
///
/// # tokio_test::block_on(async {
/// let task: Task<i32, String> = log::info("boot", "starting", &[])
///     .and_then(|_| Task::succeed(42));
///
/// let result = perform(vec![Sink::none()], task).await;
/// assert_eq!(result.unwrap(), 42);
/// # });
/// ```
pub async fn perform<T, E>(
    sinks: Vec<Sink>,
    task: Task<T, E>,
) -> Result<T, PerformError<E>>
where
    T: Send + 'static,
    E: Send + fmt::Debug + 'static,
{
    let host = hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string());
    let pid = std::process::id();

    let mut workers: Vec<Worker> = Vec::with_capacity(sinks.len());
    for sink in sinks {
        match sink.open().await {
            Ok(worker) => workers.push(worker),
            Err(error) => {
                for worker in workers {
                    worker.quit().await;
                }
                return Err(PerformError::Sink(error));
            }
        }
    }

    let key = Key::root(host, pid, workers.iter().map(Worker::queue).collect());
    let outcome = AssertUnwindSafe(task.run(&key)).catch_unwind().await;
    drop(key);

    for worker in workers {
        worker.quit().await;
    }

    match outcome {
        Ok(result) => result.map_err(PerformError::Task),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
