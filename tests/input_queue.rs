use sheetvox::input::{InputQueue, Modifiers};

#[test]
fn input_consume_returns_arrival_order() {
    let mut queue = InputQueue::new(16).unwrap();
    for ch in "abcdef".chars() {
        queue.push(ch, Modifiers::NONE);
    }
    let first: String = queue.consume(4).iter().map(|k| k.ch).collect();
    assert_eq!(first, "abcd");
    let rest: String = queue.consume(4).iter().map(|k| k.ch).collect();
    assert_eq!(rest, "ef");
    assert!(queue.consume(4).is_empty());
}

#[test]
fn input_peek_is_non_destructive() {
    let mut queue = InputQueue::new(4).unwrap();
    queue.push('x', Modifiers::shift());
    queue.push('y', Modifiers::ctrl());
    let peeked: Vec<_> = queue.peek(10).cloned().collect();
    assert_eq!(peeked.len(), 2);
    assert!(peeked[0].modifiers.shift);
    assert!(peeked[1].modifiers.ctrl);
    assert_eq!(queue.size(), 2);
}

#[test]
fn input_level_tracks_fill() {
    let mut queue = InputQueue::new(4).unwrap();
    assert_eq!(queue.level(), 0.0);
    queue.push('a', Modifiers::NONE);
    assert_eq!(queue.level(), 0.25);
    for ch in "bcdefgh".chars() {
        queue.push(ch, Modifiers::NONE);
    }
    assert_eq!(queue.level(), 1.0);
    assert_eq!(queue.size(), 4);
    assert_eq!(queue.evicted(), 4);
    let kept: String = queue.peek(4).map(|k| k.ch).collect();
    assert_eq!(kept, "efgh");
    queue.clear();
    assert!(queue.is_empty());
}
