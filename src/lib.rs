//! # Watershed
//!
//! > *Everything logged flows downhill to a sink.*
//!
//! A contextual task runtime: effectful, fallible computations that carry
//! an implicit, hierarchically-scoped logging context and fan their log
//! entries out to multiple sinks concurrently.
//!
//! ## Model
//!
//! - A [`Task`] is a lazy computation yielding `Ok` or `Err` when invoked
//!   with an ambient [`Key`].
//! - The [`Key`] bundles the current namespace, accumulated context pairs,
//!   process identity, and one queue handle per sink. It is immutable;
//!   [`Task::context`] extends it for the dynamic extent of an inner task.
//! - [`log`] calls merge with the key into an [`Entry`] and enqueue it onto
//!   every sink queue without blocking - a full queue drops that entry.
//! - [`perform()`](crate::perform()) owns the sink lifecycles: open, spawn workers, run the
//!   task, drain and close on every exit path.
//!
//! ## Quick Example
//!
//! ```
//! use watershed::{log, perform, Sink, Task};
//!
//! # tokio_test::block_on(async {
//! let task: Task<i32, String> = log::info("/start", "handling request", &[])
//!     .and_then(|_| Task::succeed(21))
//!     .map(|x| x * 2)
//!     .context("api", &[("rid", "7")]);
//!
//! let result = perform(vec![Sink::none()], task).await;
//! assert_eq!(result.unwrap(), 42);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod entry;
mod key;
mod perform;
mod sink;
mod task;

pub mod log;
pub mod testing;

// Re-exports
pub use entry::{Entry, Severity};
pub use key::Key;
pub use perform::{perform, PerformError};
pub use sink::{Sink, SinkError};
pub use task::{
    fail, map2, map3, map4, map5, map6, sequence, succeed, zip, zip3, BoxFuture, Task,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::entry::{Entry, Severity};
    pub use crate::key::Key;
    pub use crate::log;
    pub use crate::perform::{perform, PerformError};
    pub use crate::sink::{Sink, SinkError};
    pub use crate::task::{fail, map2, sequence, succeed, zip, Task};
}
