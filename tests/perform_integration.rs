//! End-to-end driver tests: sinks are opened, entries delivered in order,
//! and everything drains and closes on every exit path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use watershed::testing::CaptureSink;
use watershed::{log, perform, sequence, Entry, PerformError, Sink, SinkError, Task};

/// A custom sink whose close bumps a shared counter, for asserting the
/// shutdown bracket ran.
fn counting_sink(written: Arc<AtomicU64>, closed: Arc<AtomicU64>) -> Sink {
    Sink::custom(
        move || Task::succeed((written, closed)),
        |counters: &(Arc<AtomicU64>, Arc<AtomicU64>), _entry| {
            counters.0.fetch_add(1, Ordering::SeqCst);
            Task::succeed(())
        },
        |counters| {
            counters.1.fetch_add(1, Ordering::SeqCst);
            Task::succeed(())
        },
    )
}

#[tokio::test]
async fn plain_success_with_a_terminal_sink() {
    let result = perform(vec![Sink::terminal()], Task::<_, String>::succeed(42)).await;
    assert_eq!(result.unwrap(), 42);
}

#[tokio::test]
async fn scoped_entry_reaches_the_sink_with_merged_namespace() {
    let capture = CaptureSink::new();
    let task: Task<(), String> =
        log::info("/ping", "hello", &[]).context("api", &[("rid", "7")]);

    perform(vec![capture.sink()], task).await.unwrap();

    let entries = capture.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].namespace, "api/ping");
    assert_eq!(entries[0].message, "hello");
    assert_eq!(
        entries[0].context,
        vec![("rid".to_string(), "7".to_string())]
    );
}

#[tokio::test]
async fn entries_are_written_before_a_failing_task_returns() {
    let capture = CaptureSink::new();
    let task = log::info("n", "m", &[]).and_then(|_| Task::<(), _>::fail("boom"));

    let result = perform(vec![capture.sink()], task).await;

    match result {
        Err(PerformError::Task(error)) => assert_eq!(error, "boom"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(capture.entries().len(), 1);
    assert_eq!(capture.entries()[0].message, "m");
}

#[tokio::test]
async fn file_sink_keeps_entries_in_emission_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.log");

    let task: Task<Vec<()>, String> = sequence(vec![
        log::info("a", "1", &[]),
        log::info("a", "2", &[]),
    ]);
    let result = perform(vec![Sink::file(&path)], task).await.unwrap();
    assert_eq!(result, vec![(), ()]);

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<Entry> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].message, "1");
    assert_eq!(lines[1].message, "2");
}

#[tokio::test]
async fn both_sinks_see_the_same_order() {
    let first = CaptureSink::new();
    let second = CaptureSink::new();

    let task: Task<Vec<()>, String> = sequence(vec![
        log::info("n", "one", &[]),
        log::info("n", "two", &[]),
        log::info("n", "three", &[]),
    ]);
    perform(vec![first.sink(), second.sink()], task)
        .await
        .unwrap();

    for capture in [first, second] {
        let messages: Vec<String> = capture
            .entries()
            .into_iter()
            .map(|entry| entry.message)
            .collect();
        assert_eq!(messages, vec!["one", "two", "three"]);
    }
}

#[tokio::test]
async fn sinks_close_exactly_once_on_success_and_on_failure() {
    for fails in [false, true] {
        let written = Arc::new(AtomicU64::new(0));
        let closed = Arc::new(AtomicU64::new(0));

        let task = log::info("n", "m", &[]).and_then(move |_| {
            if fails {
                Task::<(), &str>::fail("boom")
            } else {
                Task::succeed(())
            }
        });
        let result =
            perform(vec![counting_sink(written.clone(), closed.clone())], task).await;

        assert_eq!(result.is_err(), fails);
        assert_eq!(written.load(Ordering::SeqCst), 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn shutdown_runs_even_when_the_task_panics() {
    let written = Arc::new(AtomicU64::new(0));
    let closed = Arc::new(AtomicU64::new(0));

    let sink = counting_sink(written.clone(), closed.clone());
    let task: Task<(), String> = log::info("n", "before the end", &[])
        .map(|_| panic!("task body blew up"));

    let outcome = tokio::spawn(perform(vec![sink], task)).await;

    assert!(outcome.is_err());
    assert!(outcome.unwrap_err().is_panic());
    assert_eq!(written.load(Ordering::SeqCst), 1);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_custom_open_aborts_and_unwinds_earlier_sinks() {
    let written = Arc::new(AtomicU64::new(0));
    let closed = Arc::new(AtomicU64::new(0));

    let good = counting_sink(written, closed.clone());
    let bad = Sink::custom(
        || Task::<(), _>::fail(SinkError::message("nope")),
        |_: &(), _| Task::succeed(()),
        |_| Task::succeed(()),
    );

    let result = perform(vec![good, bad], Task::<_, String>::succeed(())).await;

    match result {
        Err(PerformError::Sink(error)) => {
            assert_eq!(error.to_string(), "nope");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    // The sink that did open was shut down before the driver returned.
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_slow_sink_drops_entries_instead_of_stalling_the_task() {
    const EMITTED: u64 = 5_000;
    // Queue capacity plus the one entry the worker may have pulled into
    // its blocked write.
    const MAX_DELIVERABLE: u64 = 4096 + 1;

    let gate = Arc::new(tokio::sync::Semaphore::new(0));
    let delivered = Arc::new(AtomicU64::new(0));
    let dropped = Arc::new(AtomicU64::new(0));

    let sink_state = (gate.clone(), delivered.clone());
    let slow_sink = Sink::custom(
        move || Task::succeed(sink_state),
        |state: &(Arc<tokio::sync::Semaphore>, Arc<AtomicU64>), _entry| {
            let (gate, delivered) = (state.0.clone(), state.1.clone());
            Task::from_async(move || async move {
                let permit = gate
                    .acquire()
                    .await
                    .map_err(|_| SinkError::message("gate closed"))?;
                permit.forget();
                delivered.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        },
        |_| Task::succeed(()),
    )
    .with_drop_counter(dropped.clone());

    let logs: Vec<Task<(), String>> = (0..EMITTED)
        .map(|i| log::info("flood", format!("{i}"), &[]))
        .collect();
    let release = gate.clone();
    let task = sequence(logs).and_then(move |_| {
        // Emission finished without blocking on the gated sink; now let
        // the worker drain so shutdown can complete.
        release.add_permits(EMITTED as usize);
        Task::succeed(())
    });

    perform(vec![slow_sink], task).await.unwrap();

    let delivered = delivered.load(Ordering::SeqCst);
    let dropped = dropped.load(Ordering::SeqCst);
    assert!(delivered <= MAX_DELIVERABLE, "delivered {delivered}");
    assert!(dropped >= EMITTED - MAX_DELIVERABLE, "dropped {dropped}");
    assert_eq!(delivered + dropped, EMITTED);
}

#[tokio::test]
async fn drop_counter_stays_zero_when_the_queue_keeps_up() {
    let dropped = Arc::new(AtomicU64::new(0));
    let capture = CaptureSink::new();

    let task: Task<Vec<()>, String> = sequence(
        (0..100)
            .map(|i| log::debug("n", format!("{i}"), &[]))
            .collect(),
    );
    perform(
        vec![capture.sink().with_drop_counter(dropped.clone())],
        task,
    )
    .await
    .unwrap();

    assert_eq!(dropped.load(Ordering::SeqCst), 0);
    assert_eq!(capture.len(), 100);
}
