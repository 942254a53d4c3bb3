#![forbid(unsafe_code)]

//! The showcase component.
//!
//! A [`Dashboard`] owns a [`LifecycleSignal`] and composes streams from its
//! [`DataFeed`]:
//!
//! - [`numbers`](Dashboard::numbers) combines the three numbers sources into
//!   one flattened stream (latest list from each, concatenated in call
//!   order).
//! - [`list`](Dashboard::list) wraps the list fetch so a failure degrades
//!   silently to an empty list.
//! - [`watch_quiet`](Dashboard::watch_quiet) arms a [`FlagLatch`] over a
//!   boolean stream.
//! - [`bind_form`](Dashboard::bind_form) consumes form change events until
//!   [`teardown`](Dashboard::teardown) completes the lifecycle.

use std::cell::RefCell;
use std::rc::Rc;

use rill_core::{FlagLatch, LifecycleSignal, Stream, combine_concat};

use crate::feed::DataFeed;

/// One form change event (the form has a single `name` field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValue {
    /// Current contents of the name field.
    pub name: String,
}

/// Component composing the feed's streams, torn down via its lifecycle
/// signal.
pub struct Dashboard<F: DataFeed> {
    feed: Rc<F>,
    lifecycle: LifecycleSignal,
    quiet_latch: RefCell<Option<FlagLatch>>,
}

impl<F: DataFeed> Dashboard<F> {
    /// Build a dashboard over `feed` with a fresh lifecycle.
    #[must_use]
    pub fn new(feed: Rc<F>) -> Self {
        Self {
            feed,
            lifecycle: LifecycleSignal::new(),
            quiet_latch: RefCell::new(None),
        }
    }

    /// Consume form change events until teardown. Events are logged, not
    /// transformed.
    pub fn bind_form(&self, changes: &Stream<FormValue>) {
        let _sub = changes
            .take_until(&self.lifecycle)
            .subscribe_values(|value: FormValue| {
                tracing::debug!(name = %value.name, "form value changed");
            });
    }

    /// The list fetch with fallback: a failure degrades silently to a
    /// single empty list, and the stream always completes.
    #[must_use]
    pub fn list(&self) -> Stream<Vec<String>> {
        self.feed.fetch_list().recover(|error| {
            tracing::debug!(%error, "list fetch failed; substituting empty list");
            Vec::new()
        })
    }

    /// The three numbers sources combined: each emission is the
    /// concatenation of the latest list from every source, in call order.
    /// A failure on any source fails the combined stream (no recovery).
    #[must_use]
    pub fn numbers(&self) -> Stream<Vec<i64>> {
        combine_concat(vec![
            self.feed.fetch_numbers1(),
            self.feed.fetch_numbers2(),
            self.feed.fetch_numbers3(),
        ])
    }

    /// Arm the quiet flag over `signals`: it is set only if the stream
    /// completes having emitted exclusively `false`.
    pub fn watch_quiet(&self, signals: &Stream<bool>) {
        *self.quiet_latch.borrow_mut() = Some(FlagLatch::arm(signals));
    }

    /// Whether the quiet flag has been set.
    #[must_use]
    pub fn quiet_flag(&self) -> bool {
        self.quiet_latch
            .borrow()
            .as_ref()
            .is_some_and(FlagLatch::is_set)
    }

    /// The component's lifecycle signal.
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleSignal {
        &self.lifecycle
    }

    /// Complete the lifecycle, ending every chained subscription.
    /// Idempotent.
    pub fn teardown(&self) {
        self.lifecycle.complete();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::feed::StaticFeed;
    use rill_core::{Broadcast, Observer, StreamError};

    fn dashboard() -> Dashboard<StaticFeed> {
        Dashboard::new(Rc::new(StaticFeed::default()))
    }

    #[test]
    fn numbers_concatenates_in_call_order() {
        let out = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&out);
        let _sub = dashboard()
            .numbers()
            .subscribe_values(move |v| sink.borrow_mut().push(v));
        assert_eq!(*out.borrow(), vec![vec![1, 3, 4]]);
    }

    #[test]
    fn list_passes_payload_through() {
        let out = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&out);
        let _sub = dashboard()
            .list()
            .subscribe_values(move |v| sink.borrow_mut().push(v));
        assert_eq!(
            *out.borrow(),
            vec![vec![
                "value1".to_owned(),
                "value2".to_owned(),
                "value3".to_owned(),
            ]]
        );
    }

    struct FailingFeed;

    impl DataFeed for FailingFeed {
        fn fetch_list(&self) -> Stream<Vec<String>> {
            Stream::fail(StreamError::source("list feed down"))
        }
        fn fetch_numbers1(&self) -> Stream<Vec<i64>> {
            Stream::fail(StreamError::source("numbers feed down"))
        }
        fn fetch_numbers2(&self) -> Stream<Vec<i64>> {
            Stream::of(vec![vec![3]])
        }
        fn fetch_numbers3(&self) -> Stream<Vec<i64>> {
            Stream::of(vec![vec![4]])
        }
    }

    #[test]
    fn list_failure_degrades_to_empty_list() {
        let dashboard = Dashboard::new(Rc::new(FailingFeed));
        let out = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&out);
        let done = Rc::clone(&completions);
        dashboard.list().subscribe(Observer::new(
            move |v| sink.borrow_mut().push(v),
            |_| panic!("list must never fail outward"),
            move || done.set(done.get() + 1),
        ));

        assert_eq!(*out.borrow(), vec![Vec::<String>::new()]);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn numbers_failure_propagates_unrecovered() {
        let dashboard = Dashboard::new(Rc::new(FailingFeed));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        dashboard.numbers().subscribe(Observer::new(
            |_| {},
            move |e| sink.borrow_mut().push(e),
            || {},
        ));
        assert_eq!(
            *errors.borrow(),
            vec![StreamError::source("numbers feed down")]
        );
    }

    #[test]
    fn form_binding_stops_at_teardown() {
        let dashboard = dashboard();
        let changes: Broadcast<FormValue> = Broadcast::new();
        dashboard.bind_form(&changes.stream());

        assert_eq!(changes.observer_count(), 1);
        dashboard.teardown();
        assert_eq!(changes.observer_count(), 0);

        // Teardown is idempotent.
        dashboard.teardown();
        assert!(dashboard.lifecycle().is_completed());
    }

    #[test]
    fn quiet_flag_follows_latch_semantics() {
        let dashboard = dashboard();
        let signals = Broadcast::new();
        dashboard.watch_quiet(&signals.stream());

        signals.emit(false);
        assert!(!dashboard.quiet_flag());
        signals.close();
        assert!(dashboard.quiet_flag());
    }
}
