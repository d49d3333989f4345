use sheetvox::output::OutputQueue;
use sheetvox::phoneme::PhonemeEvent;
use std::time::{Duration, Instant};

fn event() -> PhonemeEvent {
    PhonemeEvent {
        phoneme: "ah".to_string(),
        start_ms: 0,
        duration_ms: 100,
        volume: 0.5,
        pitch_hz: 220.0,
        vibrato: false,
        breathiness: 0.0,
        harmony_intervals: Vec::new(),
    }
}

#[test]
fn output_fill_rate_uses_span_from_oldest() {
    let mut queue = OutputQueue::new(32).unwrap();
    let start = Instant::now();
    queue.push_at(vec![event(); 4], start);
    queue.push_at(vec![event(); 4], start + Duration::from_millis(500));

    let snapshot = queue.snapshot_at(start + Duration::from_secs(1));
    // 8 events over a 1 s span, not over the 2 s window
    assert!((snapshot.fill_rate - 8.0).abs() < 1e-9);
    assert_eq!(snapshot.drain_rate, 0.0);
}

#[test]
fn output_drain_rate_tracks_pops() {
    let mut queue = OutputQueue::new(32).unwrap();
    let start = Instant::now();
    queue.push_at(vec![event(); 10], start);
    for i in 0..5 {
        queue.pop_at(start + Duration::from_millis(100 * i));
    }
    let snapshot = queue.snapshot_at(start + Duration::from_millis(500));
    assert!((snapshot.drain_rate - 10.0).abs() < 1e-9);
}

#[test]
fn output_empty_pop_is_not_recorded() {
    let mut queue = OutputQueue::new(4).unwrap();
    let start = Instant::now();
    assert!(queue.pop_at(start).is_none());
    assert_eq!(queue.snapshot_at(start).drain_rate, 0.0);
}

#[test]
fn output_single_sample_reports_one_per_second() {
    let mut queue = OutputQueue::new(4).unwrap();
    let start = Instant::now();
    queue.push_at(vec![event()], start);
    assert_eq!(queue.snapshot_at(start).fill_rate, 1.0);
    assert_eq!(
        queue.snapshot_at(start + Duration::from_millis(1900)).fill_rate,
        1.0
    );
}

#[test]
fn output_rates_decay_as_window_empties() {
    let mut queue = OutputQueue::new(32).unwrap();
    let start = Instant::now();
    queue.push_at(vec![event(); 3], start);
    queue.push_at(vec![event(); 3], start + Duration::from_millis(1500));

    let early = queue.snapshot_at(start + Duration::from_millis(1600)).fill_rate;
    let mid = queue.snapshot_at(start + Duration::from_millis(2500)).fill_rate;
    let late = queue.snapshot_at(start + Duration::from_millis(4000)).fill_rate;

    assert!((early - 6.0 / 1.6).abs() < 1e-9);
    // first batch pruned, 3 remain over a 1 s span
    assert!((mid - 3.0).abs() < 1e-9);
    assert_eq!(late, 0.0);
}

#[test]
fn output_window_boundary_is_inclusive() {
    let mut queue = OutputQueue::new(8).unwrap();
    let start = Instant::now();
    queue.push_at(vec![event(); 2], start);
    let snapshot = queue.snapshot_at(start + Duration::from_secs(2));
    assert!((snapshot.fill_rate - 1.0).abs() < 1e-9);
}
