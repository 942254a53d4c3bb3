//! End-to-end marble semantics: cold/hot test streams driving real
//! operators under the virtual clock.

use rill_core::{FlagLatch, LifecycleSignal, StreamError, combine_concat, combine_latest};
use rill_harness::{SubscriptionWindow, TestScheduler};

// ── Cold streams ─────────────────────────────────────────────────────

#[test]
fn cold_stream_replays_per_subscriber() {
    let s = TestScheduler::new();
    let source = s.cold("-a-b|", &[('a', 1), ('b', 2)]);

    let stream = source.stream();
    s.expect_stream(&stream, "-a-b|", &[('a', 1), ('b', 2)]);
    s.expect_stream(&stream, "-a-b|", &[('a', 1), ('b', 2)]);
    s.run();

    assert_eq!(
        source.log().windows(),
        vec![
            SubscriptionWindow {
                subscribed_at: 0,
                unsubscribed_at: Some(4),
            };
            2
        ]
    );
}

#[test]
fn cold_error_is_delivered_at_its_frame() {
    let s = TestScheduler::new();
    let source = s.cold_with_error(
        "a-#",
        &[('a', 10)],
        StreamError::source("feed down"),
    );
    s.expect_stream_with_error(
        &source.stream(),
        "a-#",
        &[('a', 10)],
        StreamError::source("feed down"),
    );
    s.run();
}

// ── Hot streams ──────────────────────────────────────────────────────

#[test]
fn hot_stream_drops_values_before_the_subscription_point() {
    let s = TestScheduler::new();
    let source = s.hot("a^b|", &[('a', 1), ('b', 2)]);
    s.expect_stream(&source.stream(), "-b|", &[('b', 2)]);
    s.run();
}

#[test]
fn late_hot_subscriber_misses_earlier_frames() {
    let s = TestScheduler::new();
    let source = s.hot("^ab", &[('a', 1), ('b', 2)]);

    // Attach at frame 2, after both values fired.
    let stream = source.stream();
    let scheduler = s.scheduler().clone();
    let late = stream.clone();
    scheduler.schedule(2, move || {
        let _sub = late.subscribe_values(|_| panic!("late subscriber must see nothing"));
    });
    s.expect_stream(&stream, "-ab", &[('a', 1), ('b', 2)]);
    s.run();
}

// ── Operators under virtual time ─────────────────────────────────────

#[test]
fn flag_latch_unsubscribes_at_the_first_true() {
    let s = TestScheduler::new();
    let source = s.cold("aaaba", &[('a', false), ('b', true)]);

    let latch = FlagLatch::arm(&source.stream());
    s.expect_subscriptions(&source.log(), &["^--!"]);
    s.run();

    assert!(!latch.is_set());
}

#[test]
fn recover_replaces_failure_with_fallback() {
    let s = TestScheduler::new();
    let source = s.cold("#", &Vec::<(char, Vec<i32>)>::new());
    let recovered = source.stream().recover(|_| Vec::new());
    s.expect_stream(&recovered, "(a|)", &[('a', Vec::new())]);
    s.run();
}

#[test]
fn combine_latest_gates_on_all_inputs() {
    let s = TestScheduler::new();
    let one = s.cold("--a", &[('a', 1)]);
    let two = s.cold("a", &[('a', 2)]);

    let combined = combine_latest(vec![one.stream(), two.stream()]);
    s.expect_stream(&combined, "--a", &[('a', vec![1, 2])]);
    s.run();
}

#[test]
fn combine_concat_flattens_in_input_order() {
    let s = TestScheduler::new();
    let one = s.cold("a", &[('a', vec![1])]);
    let two = s.cold("a", &[('a', vec![3])]);
    let three = s.cold("a", &[('a', vec![4])]);

    let combined = combine_concat(vec![one.stream(), two.stream(), three.stream()]);
    s.expect_stream(&combined, "a", &[('a', vec![1, 3, 4])]);
    s.run();
}

#[test]
fn take_until_ends_a_cold_stream_at_signal_completion() {
    let s = TestScheduler::new();
    let source = s.cold("abcd", &[('a', 1), ('b', 2), ('c', 3), ('d', 4)]);
    let signal = LifecycleSignal::new();

    let chained = source.stream().take_until(&signal);
    let inner = signal.clone();
    s.scheduler().schedule(2, move || inner.complete());

    s.expect_stream(&chained, "ab|", &[('a', 1), ('b', 2)]);
    s.expect_subscriptions(&source.log(), &["^-!"]);
    s.run();
}
