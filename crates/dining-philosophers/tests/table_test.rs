use dining_philosophers::{Table, TableConfig, UnitRange, DEFAULT_NAMES};
use ring_framework::mock::{RecordingSink, SinkEvent};
use ring_framework::After;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

fn fixed_config(seed: u64) -> TableConfig {
    TableConfig {
        eat: UnitRange::fixed(1),
        think: UnitRange::fixed(1),
        time_unit: Duration::from_secs(1),
        seed: Some(seed),
        ..TableConfig::default()
    }
}

/// The classic five-seat table with one-unit meals and thoughts, run for 30 units
/// on a real clock: every seat eats at least ten times.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_five_seat_table_for_thirty_units() {
    let sink = Arc::new(RecordingSink::new());
    let config = TableConfig {
        time_unit: Duration::from_millis(20),
        ..fixed_config(1)
    };
    let run_for = config.units(30);
    let running = Table::new(config, Arc::clone(&sink)).unwrap().start();
    let ring = running.ring().clone();

    let report = running.run_until(After(run_for)).await.unwrap();

    for p in &report.philosophers {
        assert!(p.meals >= 10, "{} only ate {} times", p.name, p.meals);
    }
    assert_eq!(report.double_holds, 0);
    assert_eq!(ring.double_holds(), 0);
    assert!(ring.held().is_empty());
    sink.verify();
}

/// The same table on a paused clock: fixed orders, mutual exclusion, legal
/// transitions.
#[tokio::test(start_paused = true)]
async fn test_five_seat_table_orders_and_exclusion() {
    let sink = Arc::new(RecordingSink::new());
    let running = Table::new(fixed_config(1), Arc::clone(&sink))
        .unwrap()
        .start();
    let ring = running.ring().clone();

    let report = running
        .run_until(After(Duration::from_secs(30)))
        .await
        .unwrap();

    let emily = report.philosopher("Emily").unwrap();
    assert_eq!(emily.seat, 4);
    assert_eq!(emily.order, [0, 4]);
    let pat = report.philosopher("Pat").unwrap();
    assert_eq!(pat.seat, 0);
    assert_eq!(pat.order, [0, 1]);

    assert!(report.philosophers.iter().all(|p| p.meals >= 1));
    // At most two of five can eat at once, one unit per meal.
    assert!(report.total_meals() <= 2 * 31);

    assert_eq!(report.double_holds, 0);
    assert_eq!(ring.double_holds(), 0);
    assert!(ring.held().is_empty());
    sink.verify();
}

/// Exactly one seat acquires right-before-left, whatever the ring size.
#[tokio::test(start_paused = true)]
async fn test_only_the_wrap_around_seat_reverses() {
    for size in 2..=9 {
        let names: Vec<String> = (0..size).map(|i| format!("P{i}")).collect();
        let config = TableConfig {
            names,
            ..fixed_config(3)
        };
        let report = Table::new(config, Arc::new(RecordingSink::new()))
            .unwrap()
            .start()
            .run_until(After(Duration::from_secs(4)))
            .await
            .unwrap();

        let reversed: Vec<usize> = report
            .philosophers
            .iter()
            .filter(|p| p.order[0] as usize != p.seat)
            .map(|p| p.seat)
            .collect();
        assert_eq!(reversed, vec![size - 1], "ring of {size}");
    }
}

/// No deadlock under randomized timing on a real multi-threaded runtime:
/// every seat eats at least once within a generous bound.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_seat_eats_under_random_timing() {
    for size in 2..=9 {
        let sink = Arc::new(RecordingSink::new());
        let config = TableConfig {
            names: (0..size).map(|i| format!("P{i}")).collect(),
            time_unit: Duration::from_millis(1),
            seed: None,
            ..TableConfig::default()
        };
        let running = Table::new(config, Arc::clone(&sink)).unwrap().start();
        let ring = running.ring().clone();

        let all_fed = async {
            while (0..size).any(|seat| sink.meals_for(seat).is_empty()) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        let fed = tokio::time::timeout(Duration::from_secs(20), all_fed).await;

        let report = running.shutdown().await.unwrap();
        assert!(fed.is_ok(), "ring of {size} stalled: {report:?}");
        assert!(report.philosophers.iter().all(|p| p.meals >= 1));
        assert_eq!(ring.double_holds(), 0);
        assert!(ring.held().is_empty());
        sink.verify();
    }
}

/// After the signal, everyone stops within one meal plus one thought.
#[tokio::test(start_paused = true)]
async fn test_shutdown_is_bounded_and_leaves_nothing_held() {
    let config = TableConfig {
        seed: Some(11),
        ..TableConfig::default()
    };
    let bound = config.units(config.eat.max + config.think.max);
    let sink = Arc::new(RecordingSink::new());
    let running = Table::new(config, Arc::clone(&sink)).unwrap().start();
    let ring = running.ring().clone();

    tokio::time::sleep(Duration::from_secs(17)).await;
    let signalled = Instant::now();
    let report = running.shutdown().await.unwrap();

    assert!(signalled.elapsed() <= bound, "took {:?}", signalled.elapsed());
    assert_eq!(report.philosophers.len(), DEFAULT_NAMES.len());
    assert!(ring.held().is_empty());
    for seat in 0..DEFAULT_NAMES.len() {
        let events = sink.events_for(seat);
        assert_eq!(
            events.last(),
            Some(&SinkEvent::Stopped),
            "seat {seat} did not report stopping"
        );
    }
}

/// Counters rise by one per meal and end where the report says.
#[tokio::test(start_paused = true)]
async fn test_meal_counters_are_monotonic() {
    let sink = Arc::new(RecordingSink::new());
    let (stop, trigger) = oneshot::channel::<()>();
    let config = TableConfig {
        seed: Some(5),
        ..TableConfig::default()
    };
    let running = Table::new(config, Arc::clone(&sink)).unwrap().start();

    let host = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(60)).await;
        let _ = stop.send(());
    });
    let report = running.run_until(trigger).await.unwrap();
    host.await.unwrap();

    sink.verify();
    for p in &report.philosophers {
        let meals = sink.meals_for(p.seat);
        let expected: Vec<u64> = (1..=p.meals).collect();
        assert_eq!(meals, expected, "{}", p.name);
    }
}
