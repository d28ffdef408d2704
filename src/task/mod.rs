//! The task type and its combinators.
//!
//! A [`Task`] is a lazy, fallible computation: nothing runs until it is
//! invoked with an ambient [`Key`], either by the driver
//! ([`perform`](crate::perform())) or directly via [`Task::run`]. The key
//! threads through every combinator unchanged unless [`Task::context`]
//! replaces it with an extended copy for an inner scope.
//!
//! # Examples
//!
//! ## Composing tasks
//!
//! ```
//! use watershed::{Key, Task};
//!
//! # tokio_test::block_on(async {
//! let task = Task::<_, String>::succeed(5)
//!     .map(|x| x * 2)
//!     .and_then(|x| Task::succeed(x + 10));
//!
//! assert_eq!(task.run(&Key::detached()).await, Ok(20));
//! # });
//! ```
//!
//! ## Recovering from errors
//!
//! ```
//! use watershed::{Key, Task};
//!
//! # tokio_test::block_on(async {
//! let task = Task::<i32, &str>::fail("boom")
//!     .or_else(|_| Task::<_, String>::succeed(42));
//!
//! assert_eq!(task.run(&Key::detached()).await, Ok(42));
//! # });
//! ```

use std::future::Future;
use std::pin::Pin;

use crate::key::Key;

mod sequence;
mod zip;

pub use sequence::sequence;
pub use zip::{map2, map3, map4, map5, map6, zip, zip3};

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Function type for task internals.
type TaskFn<T, E> = Box<dyn FnOnce(&Key) -> BoxFuture<'_, Result<T, E>> + Send>;

/// A deferred, fallible computation over an ambient [`Key`].
///
/// `Task<T, E>` yields `Ok(T)` or `Err(E)` when invoked. Tasks own no
/// resources; sink resources live in the driver, and the task merely
/// carries log entries to them through the key's queue handles.
///
/// # Type Parameters
///
/// * `T` - The type of the success value
/// * `E` - The type of the domain error
///
/// # Examples
///
/// ```
/// use watershed::{Key, Task};
///
/// # tokio_test::block_on(async {
/// let task = Task::<_, String>::succeed(42);
/// assert_eq!(task.run(&Key::detached()).await, Ok(42));
///
/// let task = Task::<i32, _>::fail("error");
/// assert_eq!(task.run(&Key::detached()).await, Err("error"));
/// # });
/// ```
pub struct Task<T, E> {
    pub(crate) run_fn: TaskFn<T, E>,
}

// Manual Debug implementation since FnOnce is not Debug
impl<T, E> std::fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<T, E> Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// A task that always yields `Ok` with the given value.
    ///
    /// The key is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::{Key, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::<_, String>::succeed(42);
    /// assert_eq!(task.run(&Key::detached()).await, Ok(42));
    /// # });
    /// ```
    pub fn succeed(value: T) -> Self {
        Task {
            run_fn: Box::new(move |_| Box::pin(async move { Ok(value) })),
        }
    }

    /// A task that always yields `Err` with the given error.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::{Key, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::<i32, _>::fail("error");
    /// assert_eq!(task.run(&Key::detached()).await, Err("error"));
    /// # });
    /// ```
    pub fn fail(error: E) -> Self {
        Task {
            run_fn: Box::new(move |_| Box::pin(async move { Err(error) })),
        }
    }

    /// Lift a plain synchronous computation into a task.
    ///
    /// This is the boundary where non-task effects are admitted; the
    /// closure receives nothing from the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::{Key, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::from_fn(|| Ok::<_, String>(42));
    /// assert_eq!(task.run(&Key::detached()).await, Ok(42));
    /// # });
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        Task {
            run_fn: Box::new(move |_| {
                let result = f();
                Box::pin(async move { result })
            }),
        }
    }

    /// Lift a plain asynchronous computation into a task.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::{Key, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::from_async(|| async { Ok::<_, String>(42) });
    /// assert_eq!(task.run(&Key::detached()).await, Ok(42));
    /// # });
    /// ```
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Task {
            run_fn: Box::new(move |_| Box::pin(f())),
        }
    }

    /// Lift an already-computed `Result` into a task.
    pub fn from_result(result: Result<T, E>) -> Self {
        Task {
            run_fn: Box::new(move |_| Box::pin(async move { result })),
        }
    }

    /// Transform the success value, propagating errors unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::{Key, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::<_, String>::succeed(5).map(|x| x * 2);
    /// assert_eq!(task.run(&Key::detached()).await, Ok(10));
    /// # });
    /// ```
    pub fn map<U, F>(self, f: F) -> Task<U, E>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        Task {
            run_fn: Box::new(move |key| {
                Box::pin(async move { (self.run_fn)(key).await.map(f) })
            }),
        }
    }

    /// Transform the error value, leaving success untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::{Key, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::<i32, _>::fail(404).map_err(|code| format!("status {code}"));
    /// assert_eq!(task.run(&Key::detached()).await, Err("status 404".to_string()));
    /// # });
    /// ```
    pub fn map_err<E2, F>(self, f: F) -> Task<T, E2>
    where
        F: FnOnce(E) -> E2 + Send + 'static,
        E2: Send + 'static,
    {
        Task {
            run_fn: Box::new(move |key| {
                Box::pin(async move { (self.run_fn)(key).await.map_err(f) })
            }),
        }
    }

    /// Chain tasks: on success, `f` produces the next task, which runs
    /// under the same key. Errors short-circuit.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::{Key, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::<_, String>::succeed(5).and_then(|x| Task::succeed(x * 2));
    /// assert_eq!(task.run(&Key::detached()).await, Ok(10));
    /// # });
    /// ```
    pub fn and_then<U, F>(self, f: F) -> Task<U, E>
    where
        F: FnOnce(T) -> Task<U, E> + Send + 'static,
        U: Send + 'static,
    {
        Task {
            run_fn: Box::new(move |key| {
                Box::pin(async move {
                    let value = (self.run_fn)(key).await?;
                    let next = f(value);
                    (next.run_fn)(key).await
                })
            }),
        }
    }

    /// Recover from errors: on failure, `f` produces the recovery task,
    /// which runs under the same key and may change the error type.
    /// Success passes through untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::{Key, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::<i32, &str>::fail("missing")
    ///     .or_else(|_| Task::<_, String>::succeed(0));
    /// assert_eq!(task.run(&Key::detached()).await, Ok(0));
    /// # });
    /// ```
    pub fn or_else<E2, F>(self, f: F) -> Task<T, E2>
    where
        F: FnOnce(E) -> Task<T, E2> + Send + 'static,
        E2: Send + 'static,
    {
        Task {
            run_fn: Box::new(move |key| {
                Box::pin(async move {
                    match (self.run_fn)(key).await {
                        Ok(value) => Ok(value),
                        Err(error) => {
                            let recovery = f(error);
                            (recovery.run_fn)(key).await
                        }
                    }
                })
            }),
        }
    }

    /// Run a side task on success, for its effects only.
    ///
    /// The tap runs under the same key as this task, so its log calls share
    /// this task's scope. The tap's result is discarded entirely, errors
    /// included: it cannot alter the outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::{log, Key, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::<_, String>::succeed(42)
    ///     .on_ok(|value| log::info("audit", format!("got {value}"), &[]));
    /// assert_eq!(task.run(&Key::detached()).await, Ok(42));
    /// # });
    /// ```
    pub fn on_ok<U, F>(self, f: F) -> Self
    where
        F: FnOnce(&T) -> Task<U, E> + Send + 'static,
        U: Send + 'static,
    {
        Task {
            run_fn: Box::new(move |key| {
                Box::pin(async move {
                    let result = (self.run_fn)(key).await;
                    if let Ok(value) = &result {
                        let tap = f(value);
                        let _ = (tap.run_fn)(key).await;
                    }
                    result
                })
            }),
        }
    }

    /// Run a side task on failure, for its effects only.
    ///
    /// Symmetric to [`Task::on_ok`]: the tap runs under the same key and
    /// its result is discarded, so the original error still propagates.
    pub fn on_err<U, F>(self, f: F) -> Self
    where
        F: FnOnce(&E) -> Task<U, E> + Send + 'static,
        U: Send + 'static,
    {
        Task {
            run_fn: Box::new(move |key| {
                Box::pin(async move {
                    let result = (self.run_fn)(key).await;
                    if let Err(error) = &result {
                        let tap = f(error);
                        let _ = (tap.run_fn)(key).await;
                    }
                    result
                })
            }),
        }
    }

    /// Run this task under an extended key.
    ///
    /// For the dynamic extent of this task, the ambient namespace gains the
    /// given suffix (no separator is injected; callers control that) and
    /// the given pairs are appended to the ambient context. Everything the
    /// task runs - including tasks chained by [`Task::and_then`] and
    /// recovery tasks from [`Task::or_else`] - inherits the extension;
    /// control flow returning out of this task restores the outer key.
    ///
    /// # Examples
    ///
    /// ```
    /// use watershed::testing::CaptureSink;
    /// use watershed::{log, perform, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let capture = CaptureSink::new();
    /// let task: Task<(), String> =
    ///     log::info("/ping", "hello", &[]).context("api", &[("rid", "7")]);
    ///
    /// perform(vec![capture.sink()], task).await.unwrap();
    ///
    /// let entries = capture.entries();
    /// assert_eq!(entries[0].namespace, "api/ping");
    /// assert_eq!(entries[0].context, vec![("rid".to_string(), "7".to_string())]);
    /// # });
    /// ```
    pub fn context(self, namespace: impl Into<String>, pairs: &[(&str, &str)]) -> Self {
        let namespace = namespace.into();
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|&(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Task {
            run_fn: Box::new(move |key| {
                let scoped = key.descend(&namespace, pairs);
                Box::pin(async move { (self.run_fn)(&scoped).await })
            }),
        }
    }

    /// Invoke the task with the given key.
    ///
    /// [`perform`](crate::perform()) is the usual entry point; running
    /// against [`Key::detached`] executes the task with no sinks attached,
    /// discarding its log calls.
    pub async fn run(self, key: &Key) -> Result<T, E> {
        (self.run_fn)(key).await
    }
}

/// Free-function form of [`Task::succeed`].
pub fn succeed<T, E>(value: T) -> Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    Task::succeed(value)
}

/// Free-function form of [`Task::fail`].
pub fn fail<T, E>(error: E) -> Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    Task::fail(error)
}
