//! Real-time end-to-end tests against the tokio-backed scheduler in both
//! execution contexts. Tick quanta are kept small and assertions poll with
//! generous deadlines so the tests stay robust on loaded machines.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tickbatch_core::{logging, BatchDispatcher, ExecutionMode, TokioTickScheduler};

fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

fn run_to_completion(mode: ExecutionMode) {
    logging::init_logging();
    let scheduler = Arc::new(TokioTickScheduler::with_tick(Duration::from_millis(5)).unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let dispatcher = BatchDispatcher::builder((1..=9).collect::<Vec<i32>>())
        .consumer(move |item: &i32| {
            sink.lock().push(*item);
            Ok(())
        })
        .partition_size(3)
        .execution_mode(mode)
        .scheduler(scheduler.clone())
        .start()
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || seen.lock().len() == 9));
    assert_eq!(*seen.lock(), (1..=9).collect::<Vec<_>>());
    assert!(wait_until(Duration::from_secs(5), || !dispatcher.is_running()));
}

#[test]
fn worker_mode_delivers_every_partition_in_order() {
    run_to_completion(ExecutionMode::Worker);
}

#[test]
fn cooperative_mode_delivers_every_partition_in_order() {
    run_to_completion(ExecutionMode::Cooperative);
}

#[test]
fn external_stop_halts_delivery_partway() {
    logging::init_logging();
    let scheduler = Arc::new(TokioTickScheduler::with_tick(Duration::from_millis(5)).unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let dispatcher = BatchDispatcher::builder((1..=1000).collect::<Vec<i32>>())
        .consumer(move |item: &i32| {
            sink.lock().push(*item);
            Ok(())
        })
        .partition_size(2)
        .execution_mode(ExecutionMode::Worker)
        .scheduler(scheduler.clone())
        .start()
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || !seen.lock().is_empty()));
    dispatcher.stop();
    assert!(!dispatcher.is_running());

    // One in-flight tick may still finish its partition; after that the
    // count must not move again.
    std::thread::sleep(Duration::from_millis(50));
    let settled = seen.lock().len();
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(seen.lock().len(), settled);
    assert!(settled < 1000);
}

#[test]
fn interval_ticks_spread_deliveries_over_time() {
    logging::init_logging();
    let scheduler = Arc::new(TokioTickScheduler::with_tick(Duration::from_millis(5)).unwrap());
    let timestamps = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&timestamps);
    let started = Instant::now();

    let dispatcher = BatchDispatcher::builder(vec![1, 2, 3])
        .consumer(move |_: &i32| {
            sink.lock().push(started.elapsed());
            Ok(())
        })
        .partition_size(1)
        .interval_ticks(4)
        .execution_mode(ExecutionMode::Cooperative)
        .scheduler(scheduler.clone())
        .start()
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || timestamps.lock().len() == 3));
    assert!(wait_until(Duration::from_secs(5), || !dispatcher.is_running()));

    // With a 4-tick period over 5ms ticks, consecutive deliveries should be
    // at least one full tick apart even with timer jitter.
    let stamps = timestamps.lock().clone();
    for pair in stamps.windows(2) {
        assert!(pair[1] > pair[0]);
        assert!(pair[1] - pair[0] >= Duration::from_millis(5));
    }
}

#[test]
fn dropping_the_scheduler_shuts_both_contexts_down() {
    let scheduler = Arc::new(TokioTickScheduler::with_tick(Duration::from_millis(5)).unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let dispatcher = BatchDispatcher::builder((1..=1000).collect::<Vec<i32>>())
        .consumer(move |item: &i32| {
            sink.lock().push(*item);
            Ok(())
        })
        .partition_size(1)
        .execution_mode(ExecutionMode::Cooperative)
        .scheduler(scheduler.clone())
        .start()
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || !seen.lock().is_empty()));
    dispatcher.stop();
    drop(dispatcher);
    drop(scheduler);

    // No panic and no further delivery after teardown.
    let settled = seen.lock().len();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(seen.lock().len(), settled);
}
