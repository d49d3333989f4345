use proptest::prelude::*;
use sheetvox::output::{OutputQueue, Zone};
use sheetvox::phoneme::PhonemeEvent;

fn events(n: usize) -> Vec<PhonemeEvent> {
    (0..n)
        .map(|i| PhonemeEvent {
            phoneme: format!("p{}", i),
            start_ms: i as u64 * 100,
            duration_ms: 100,
            volume: 0.5,
            pitch_hz: 220.0,
            vibrato: false,
            breathiness: 0.0,
            harmony_intervals: Vec::new(),
        })
        .collect()
}

#[test]
fn output_zone_boundaries_exact() {
    let mut queue = OutputQueue::new(10).unwrap();
    queue.push(events(1));
    assert_eq!(queue.snapshot().zone, Zone::Underflow);
    queue.push(events(1));
    assert_eq!(queue.snapshot().zone, Zone::Optimal);
    queue.push(events(6));
    assert_eq!(queue.snapshot().level, 0.8);
    assert_eq!(queue.snapshot().zone, Zone::Optimal);
    queue.push(events(1));
    assert_eq!(queue.snapshot().zone, Zone::Overflow);
}

#[test]
fn output_zone_strings_are_fixed() {
    let names: Vec<&str> = [Zone::Underflow, Zone::Optimal, Zone::Overflow]
        .iter()
        .map(|z| z.as_str())
        .collect();
    assert_eq!(names, vec!["underflow", "optimal", "overflow"]);
    assert_eq!(Zone::Overflow.to_string(), "overflow");
}

#[test]
fn output_fifo_order() {
    let mut queue = OutputQueue::new(8).unwrap();
    queue.push(events(3));
    let order: Vec<String> = std::iter::from_fn(|| queue.pop())
        .map(|e| e.phoneme)
        .collect();
    assert_eq!(order, vec!["p0", "p1", "p2"]);
}

proptest! {
    #[test]
    fn output_props_zone_is_pure_function_of_level(
        capacity in 1usize..500,
        fill in 0usize..600,
    ) {
        let mut queue = OutputQueue::new(capacity).unwrap();
        queue.push(events(fill));
        let size = fill.min(capacity);
        prop_assert_eq!(queue.size(), size);

        let snapshot = queue.snapshot();
        let expected = if size * 5 < capacity {
            Zone::Underflow
        } else if size * 5 > capacity * 4 {
            Zone::Overflow
        } else {
            Zone::Optimal
        };
        prop_assert_eq!(snapshot.zone, expected);
        prop_assert_eq!(snapshot.zone, Zone::from_level(snapshot.level));
    }

    #[test]
    fn output_props_never_exceeds_capacity(
        capacity in 1usize..64,
        batches in prop::collection::vec(0usize..40, 0..10),
    ) {
        let mut queue = OutputQueue::new(capacity).unwrap();
        for batch in batches {
            let accepted = queue.push(events(batch));
            prop_assert!(accepted <= batch);
            prop_assert!(queue.size() <= capacity);
        }
    }
}
