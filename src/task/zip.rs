//! Combining independent tasks.
//!
//! All combinators here sequence left to right and short-circuit on the
//! first error: if the leftmost task fails, its error is the result and the
//! remaining tasks are never invoked. The `mapN` arities are a facade over
//! [`zip`]/[`zip3`].

use crate::task::Task;

/// Run two tasks in order and pair their results.
///
/// # Examples
///
/// ```
/// use watershed::{zip, Key, Task};
///
/// # tokio_test::block_on(async {
/// let task = zip(Task::<_, String>::succeed(1), Task::succeed("two"));
/// assert_eq!(task.run(&Key::detached()).await, Ok((1, "two")));
/// # });
/// ```
pub fn zip<A, B, E>(first: Task<A, E>, second: Task<B, E>) -> Task<(A, B), E>
where
    A: Send + 'static,
    B: Send + 'static,
    E: Send + 'static,
{
    first.and_then(move |a| second.map(move |b| (a, b)))
}

/// Run three tasks in order and return a flat tuple of their results.
pub fn zip3<A, B, C, E>(
    first: Task<A, E>,
    second: Task<B, E>,
    third: Task<C, E>,
) -> Task<(A, B, C), E>
where
    A: Send + 'static,
    B: Send + 'static,
    C: Send + 'static,
    E: Send + 'static,
{
    zip(first, zip(second, third)).map(|(a, (b, c))| (a, b, c))
}

/// Combine two independent tasks with a function.
///
/// # Examples
///
/// ```
/// use watershed::{map2, Key, Task};
///
/// # tokio_test::block_on(async {
/// let task = map2(
///     Task::<_, String>::succeed(2),
///     Task::succeed(3),
///     |a, b| a * b,
/// );
/// assert_eq!(task.run(&Key::detached()).await, Ok(6));
/// # });
/// ```
pub fn map2<A, B, T, E, F>(first: Task<A, E>, second: Task<B, E>, f: F) -> Task<T, E>
where
    A: Send + 'static,
    B: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce(A, B) -> T + Send + 'static,
{
    zip(first, second).map(move |(a, b)| f(a, b))
}

/// Combine three independent tasks with a function.
pub fn map3<A, B, C, T, E, F>(
    first: Task<A, E>,
    second: Task<B, E>,
    third: Task<C, E>,
    f: F,
) -> Task<T, E>
where
    A: Send + 'static,
    B: Send + 'static,
    C: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce(A, B, C) -> T + Send + 'static,
{
    zip3(first, second, third).map(move |(a, b, c)| f(a, b, c))
}

/// Combine four independent tasks with a function.
pub fn map4<A, B, C, D, T, E, F>(
    first: Task<A, E>,
    second: Task<B, E>,
    third: Task<C, E>,
    fourth: Task<D, E>,
    f: F,
) -> Task<T, E>
where
    A: Send + 'static,
    B: Send + 'static,
    C: Send + 'static,
    D: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce(A, B, C, D) -> T + Send + 'static,
{
    zip(zip(first, second), zip(third, fourth))
        .map(move |((a, b), (c, d))| f(a, b, c, d))
}

/// Combine five independent tasks with a function.
pub fn map5<A, B, C, D, G, T, E, F>(
    first: Task<A, E>,
    second: Task<B, E>,
    third: Task<C, E>,
    fourth: Task<D, E>,
    fifth: Task<G, E>,
    f: F,
) -> Task<T, E>
where
    A: Send + 'static,
    B: Send + 'static,
    C: Send + 'static,
    D: Send + 'static,
    G: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce(A, B, C, D, G) -> T + Send + 'static,
{
    zip(zip(first, second), zip3(third, fourth, fifth))
        .map(move |((a, b), (c, d, g))| f(a, b, c, d, g))
}

/// Combine six independent tasks with a function.
pub fn map6<A, B, C, D, G, H, T, E, F>(
    first: Task<A, E>,
    second: Task<B, E>,
    third: Task<C, E>,
    fourth: Task<D, E>,
    fifth: Task<G, E>,
    sixth: Task<H, E>,
    f: F,
) -> Task<T, E>
where
    A: Send + 'static,
    B: Send + 'static,
    C: Send + 'static,
    D: Send + 'static,
    G: Send + 'static,
    H: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce(A, B, C, D, G, H) -> T + Send + 'static,
{
    zip(zip3(first, second, third), zip3(fourth, fifth, sixth))
        .map(move |((a, b, c), (d, g, h))| f(a, b, c, d, g, h))
}
