#![forbid(unsafe_code)]

//! # Rill marble test harness
//!
//! Marble-diagram testing for rill streams, driven by a deterministic
//! virtual-time scheduler:
//!
//! - [`VirtualScheduler`] — virtual clock with a (time, sequence)-ordered
//!   task queue.
//! - [`parse_marbles`] / [`parse_subscription_marbles`] — the marble DSL.
//! - [`TestScheduler`] — builds cold/hot test streams, records
//!   expectations, and asserts them all on [`run`](TestScheduler::run).
//!
//! # Example
//!
//! ```rust
//! use rill_core::combine_concat;
//! use rill_harness::TestScheduler;
//!
//! let s = TestScheduler::new();
//! let one = s.cold("a", &[('a', vec![1])]);
//! let three = s.cold("a", &[('a', vec![3])]);
//! let four = s.cold("a", &[('a', vec![4])]);
//!
//! let combined = combine_concat(vec![one.stream(), three.stream(), four.stream()]);
//! s.expect_stream(&combined, "a", &[('a', vec![1, 3, 4])]);
//! s.run();
//! ```
//!
//! Expectation failures panic with the diagram and both timelines attached;
//! panicking is the harness's job, so helpers here do not return `Result`.

pub mod marble;
pub mod scheduler;
pub mod testable;

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use rill_core::{Observer, Stream, StreamError};

pub use marble::{
    MarbleError, Notification, SubscriptionWindow, parse_marbles, parse_marbles_with_error,
    parse_subscription_marbles,
};
pub use scheduler::{TaskHandle, VirtualScheduler};
pub use testable::{ColdMarble, HotMarble, SubscriptionLog};

type Check = Box<dyn FnOnce() -> Result<(), String>>;

/// Marble test driver: builds test streams against one virtual clock,
/// collects expectations, and asserts them after the clock is flushed.
#[derive(Default)]
pub struct TestScheduler {
    scheduler: VirtualScheduler,
    checks: RefCell<Vec<Check>>,
}

impl TestScheduler {
    /// A fresh test run at frame 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying virtual scheduler, for scheduling side effects at
    /// chosen frames.
    #[must_use]
    pub fn scheduler(&self) -> &VirtualScheduler {
        &self.scheduler
    }

    /// Build a cold stream from a marble diagram.
    ///
    /// # Panics
    ///
    /// Panics on a malformed diagram, or one containing `^` (cold timelines
    /// are relative to each subscription, so a subscription point makes no
    /// sense).
    #[must_use]
    pub fn cold<T: Clone + 'static>(&self, diagram: &str, values: &[(char, T)]) -> ColdMarble<T> {
        self.cold_with_error(diagram, values, StreamError::source("marble error"))
    }

    /// [`cold`](Self::cold) with a caller-supplied failure for `#`.
    #[must_use]
    pub fn cold_with_error<T: Clone + 'static>(
        &self,
        diagram: &str,
        values: &[(char, T)],
        error: StreamError,
    ) -> ColdMarble<T> {
        let timeline = parse_timeline(diagram, values, error);
        let timeline = timeline
            .into_iter()
            .map(|(at, notification)| {
                let at = u64::try_from(at)
                    .unwrap_or_else(|_| panic!("cold diagram `{diagram}` cannot contain `^`"));
                (at, notification)
            })
            .collect();
        ColdMarble::new(self.scheduler.clone(), timeline)
    }

    /// Build a hot stream from a marble diagram. `^` marks frame 0;
    /// notifications left of it are dropped.
    ///
    /// # Panics
    ///
    /// Panics on a malformed diagram.
    #[must_use]
    pub fn hot<T: Clone + 'static>(&self, diagram: &str, values: &[(char, T)]) -> HotMarble<T> {
        self.hot_with_error(diagram, values, StreamError::source("marble error"))
    }

    /// [`hot`](Self::hot) with a caller-supplied failure for `#`.
    #[must_use]
    pub fn hot_with_error<T: Clone + 'static>(
        &self,
        diagram: &str,
        values: &[(char, T)],
        error: StreamError,
    ) -> HotMarble<T> {
        HotMarble::new(
            self.scheduler.clone(),
            parse_timeline(diagram, values, error),
        )
    }

    /// Subscribe to `stream` now and expect its recorded timeline to match
    /// `diagram` once the clock has been flushed.
    pub fn expect_stream<T>(&self, stream: &Stream<T>, diagram: &str, values: &[(char, T)])
    where
        T: Clone + PartialEq + Debug + 'static,
    {
        self.expect_stream_with_error(stream, diagram, values, StreamError::source("marble error"));
    }

    /// [`expect_stream`](Self::expect_stream) with a caller-supplied
    /// failure for `#`.
    pub fn expect_stream_with_error<T>(
        &self,
        stream: &Stream<T>,
        diagram: &str,
        values: &[(char, T)],
        error: StreamError,
    ) where
        T: Clone + PartialEq + Debug + 'static,
    {
        let expected: Vec<(u64, Notification<T>)> = parse_timeline(diagram, values, error)
            .into_iter()
            .map(|(at, notification)| {
                let at = u64::try_from(at)
                    .unwrap_or_else(|_| panic!("expectation diagram `{diagram}` cannot contain `^`"));
                (at, notification)
            })
            .collect();

        let recorded: Rc<RefCell<Vec<(u64, Notification<T>)>>> = Rc::new(RefCell::new(Vec::new()));
        let scheduler = self.scheduler.clone();
        let _sub = stream.subscribe(Observer::new(
            {
                let recorded = Rc::clone(&recorded);
                let scheduler = scheduler.clone();
                move |value| {
                    recorded
                        .borrow_mut()
                        .push((scheduler.now(), Notification::Value(value)));
                }
            },
            {
                let recorded = Rc::clone(&recorded);
                let scheduler = scheduler.clone();
                move |error| {
                    recorded
                        .borrow_mut()
                        .push((scheduler.now(), Notification::Error(error)));
                }
            },
            {
                let recorded = Rc::clone(&recorded);
                move || {
                    recorded
                        .borrow_mut()
                        .push((scheduler.now(), Notification::Complete));
                }
            },
        ));

        let diagram = diagram.to_owned();
        self.checks.borrow_mut().push(Box::new(move || {
            let actual = recorded.borrow();
            if *actual == expected {
                Ok(())
            } else {
                Err(format!(
                    "stream did not match `{diagram}`\n  expected: {expected:?}\n  actual:   {actual:?}"
                ))
            }
        }));
    }

    /// Expect the subscription windows recorded by a test stream to match
    /// the given subscription diagrams, in attachment order.
    pub fn expect_subscriptions(&self, log: &SubscriptionLog, diagrams: &[&str]) {
        let expected: Vec<SubscriptionWindow> = diagrams
            .iter()
            .map(|diagram| {
                parse_subscription_marbles(diagram).unwrap_or_else(|err| {
                    panic!("bad subscription diagram `{diagram}`: {err}")
                })
            })
            .collect();
        let log = log.clone();
        let rendered = diagrams.join(", ");
        self.checks.borrow_mut().push(Box::new(move || {
            let actual = log.windows();
            if actual == expected {
                Ok(())
            } else {
                Err(format!(
                    "subscriptions did not match `{rendered}`\n  expected: {expected:?}\n  actual:   {actual:?}"
                ))
            }
        }));
    }

    /// Flush the virtual clock, then assert every recorded expectation.
    ///
    /// # Panics
    ///
    /// Panics with all failure messages if any expectation did not hold.
    pub fn run(&self) {
        self.scheduler.flush();
        let checks = self.checks.take();
        let total = checks.len();
        let failures: Vec<String> = checks
            .into_iter()
            .filter_map(|check| check().err())
            .collect();
        tracing::debug!(
            frames = self.scheduler.now(),
            expectations = total,
            failed = failures.len(),
            "marble run complete"
        );
        assert!(
            failures.is_empty(),
            "marble expectations failed:\n{}",
            failures.join("\n")
        );
    }
}

fn parse_timeline<T: Clone>(
    diagram: &str,
    values: &[(char, T)],
    error: StreamError,
) -> Vec<(i64, Notification<T>)> {
    parse_marbles_with_error(diagram, values, error)
        .unwrap_or_else(|err| panic!("bad marble diagram `{diagram}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    struct RunTraceCapture {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl<S: Subscriber> Layer<S> for RunTraceCapture {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            struct Msg {
                message: Option<String>,
            }
            impl tracing::field::Visit for Msg {
                fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                    if field.name() == "message" {
                        self.message = Some(value.to_string());
                    }
                }

                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    if field.name() == "message" {
                        self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                    }
                }
            }
            let mut msg = Msg { message: None };
            event.record(&mut msg);
            if let Some(message) = msg.message {
                self.messages.lock().expect("run trace lock").push(message);
            }
        }
    }

    #[test]
    fn run_emits_a_completion_debug_event() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(RunTraceCapture {
            messages: Arc::clone(&messages),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        let s = TestScheduler::new();
        let source = s.cold("a|", &[('a', 1)]);
        s.expect_stream(&source.stream(), "a|", &[('a', 1)]);
        s.run();

        let snapshot = messages.lock().expect("run trace lock");
        assert!(
            snapshot.iter().any(|m| m == "marble run complete"),
            "expected marble run completion event, got {snapshot:?}"
        );
    }
}
