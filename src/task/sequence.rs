//! Running a homogeneous collection of tasks in order.

use crate::task::Task;

/// Run tasks left to right, collecting their results in input order.
///
/// Short-circuits on the first error; later tasks are never invoked.
///
/// # Examples
///
/// ```
/// use watershed::{sequence, Key, Task};
///
/// # tokio_test::block_on(async {
/// let task = sequence(vec![
///     Task::<_, String>::succeed(1),
///     Task::succeed(2),
///     Task::succeed(3),
/// ]);
/// assert_eq!(task.run(&Key::detached()).await, Ok(vec![1, 2, 3]));
/// # });
/// ```
pub fn sequence<T, E>(tasks: Vec<Task<T, E>>) -> Task<Vec<T>, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    Task {
        run_fn: Box::new(move |key| {
            Box::pin(async move {
                let mut values = Vec::with_capacity(tasks.len());
                for task in tasks {
                    values.push((task.run_fn)(key).await?);
                }
                Ok(values)
            })
        }),
    }
}
