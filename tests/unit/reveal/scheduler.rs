use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn starts_idle_at_zero() {
    let s = TickScheduler::new();
    assert!(s.is_idle());
    assert_eq!(s.now(), Duration::ZERO);
    assert_eq!(s.next_due(), None);
}

#[test]
fn tick_fires_only_once_due() {
    let mut s = TickScheduler::new();
    s.schedule_after(ms(66));
    assert!(!s.pop_due(ms(65)));
    assert!(s.pop_due(ms(100)));
    assert_eq!(s.now(), ms(66));
    assert!(s.is_idle());
    assert!(!s.pop_due(ms(1000)));
}

#[test]
fn next_tick_is_relative_to_previous_completion() {
    let mut s = TickScheduler::new();
    s.schedule_after(ms(66));
    assert!(s.pop_due(ms(500)));
    s.schedule_after(ms(66));
    assert_eq!(s.next_due(), Some(ms(132)));
}

#[test]
fn at_most_one_pending_tick() {
    let mut s = TickScheduler::new();
    s.schedule_after(ms(10));
    s.schedule_after(ms(2000));
    assert_eq!(s.next_due(), Some(ms(2000)));
}

#[test]
fn cancel_prevents_firing() {
    let mut s = TickScheduler::new();
    s.schedule_after(ms(0));
    assert!(s.cancel());
    assert!(!s.cancel());
    assert!(!s.pop_due(ms(10)));
}

#[test]
fn settle_never_moves_backwards() {
    let mut s = TickScheduler::new();
    s.settle(ms(50));
    s.settle(ms(20));
    assert_eq!(s.now(), ms(50));
}
