#![forbid(unsafe_code)]

//! Single-shot lifecycle completion token.
//!
//! A [`LifecycleSignal`] transitions once from open to completed and never
//! re-opens. Callbacks registered while open run exactly once, at the moment
//! of completion, and are then cleared; callbacks registered after
//! completion run immediately. [`Stream::take_until`] chains a stream
//! against the signal so the hosting component's teardown deterministically
//! ends every dependent subscription: completion is delivered, the upstream
//! attachment is cancelled, and no emission arrives afterwards.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::stream::{Observer, Stream, Subscription};

type CompletionCallback = Box<dyn FnOnce()>;

struct SignalInner {
    completed: Cell<bool>,
    callbacks: RefCell<Vec<CompletionCallback>>,
}

/// Single-shot completion marker owned by a hosting component.
///
/// Clones share state; completing any clone completes the signal.
#[derive(Clone)]
pub struct LifecycleSignal {
    inner: Rc<SignalInner>,
}

impl LifecycleSignal {
    /// A fresh, open signal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SignalInner {
                completed: Cell::new(false),
                callbacks: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Whether the signal has completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.inner.completed.get()
    }

    /// Complete the signal, draining registered callbacks exactly once.
    ///
    /// Idempotent: completing an already-completed signal does nothing.
    pub fn complete(&self) {
        if self.inner.completed.replace(true) {
            return;
        }
        let callbacks = self.inner.callbacks.take();
        for callback in callbacks {
            callback();
        }
    }

    /// Run `callback` when the signal completes (immediately if it already
    /// has).
    pub fn on_complete(&self, callback: impl FnOnce() + 'static) {
        if self.is_completed() {
            callback();
        } else {
            self.inner.callbacks.borrow_mut().push(Box::new(callback));
        }
    }
}

impl Default for LifecycleSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LifecycleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleSignal")
            .field("completed", &self.is_completed())
            .finish()
    }
}

impl<T: 'static> Stream<T> {
    /// Forward notifications until `signal` completes, then complete the
    /// derived stream and cancel the upstream attachment.
    ///
    /// If the signal is already completed, the derived stream completes
    /// immediately without ever subscribing upstream.
    #[must_use]
    pub fn take_until(&self, signal: &LifecycleSignal) -> Stream<T> {
        let source = self.clone();
        let signal = signal.clone();
        Stream::new(move |observer| {
            if signal.is_completed() {
                observer.complete();
                return Subscription::cancelled();
            }
            let upstream = source.subscribe(observer.clone());
            // The completion callback goes through a slot that the
            // subscription teardown clears, so a cancelled chain does not
            // keep its observer alive until the signal fires.
            let slot: Rc<RefCell<Option<Observer<T>>>> = Rc::new(RefCell::new(Some(observer)));
            signal.on_complete({
                let slot = Rc::clone(&slot);
                move || {
                    // Release the borrow before delivering: completion
                    // re-enters the teardown, which clears the slot too.
                    let observer = slot.borrow_mut().take();
                    if let Some(observer) = observer {
                        observer.complete();
                    }
                }
            });
            upstream.add_teardown({
                let slot = Rc::clone(&slot);
                move || {
                    slot.borrow_mut().take();
                }
            });
            upstream
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::Broadcast;
    use crate::stream::Observer;

    #[test]
    fn complete_is_idempotent() {
        let runs = Rc::new(Cell::new(0u32));
        let signal = LifecycleSignal::new();
        signal.on_complete({
            let runs = Rc::clone(&runs);
            move || runs.set(runs.get() + 1)
        });

        signal.complete();
        signal.complete();
        assert_eq!(runs.get(), 1);
        assert!(signal.is_completed());
    }

    #[test]
    fn callback_after_completion_runs_immediately() {
        let signal = LifecycleSignal::new();
        signal.complete();

        let ran = Rc::new(Cell::new(false));
        signal.on_complete({
            let ran = Rc::clone(&ran);
            move || ran.set(true)
        });
        assert!(ran.get());
    }

    #[test]
    fn clones_share_completion_state() {
        let signal = LifecycleSignal::new();
        let clone = signal.clone();
        clone.complete();
        assert!(signal.is_completed());
    }

    #[test]
    fn take_until_completes_chained_streams_with_zero_further_emissions() {
        let source = Broadcast::new();
        let signal = LifecycleSignal::new();
        let chained = source.stream().take_until(&signal);

        let values = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(Cell::new(0u32));
        chained.subscribe(Observer::new(
            {
                let values = Rc::clone(&values);
                move |v: i32| values.borrow_mut().push(v)
            },
            |_| {},
            {
                let completions = Rc::clone(&completions);
                move || completions.set(completions.get() + 1)
            },
        ));

        source.emit(1);
        signal.complete();
        source.emit(2);
        signal.complete();

        assert_eq!(*values.borrow(), vec![1]);
        assert_eq!(completions.get(), 1);
        assert_eq!(source.observer_count(), 0);
    }

    #[test]
    fn take_until_on_completed_signal_skips_the_upstream_subscription() {
        let source = Broadcast::new();
        let signal = LifecycleSignal::new();
        signal.complete();

        let completions = Rc::new(Cell::new(0u32));
        source.stream().take_until(&signal).subscribe(Observer::new(
            |_: i32| {},
            |_| {},
            {
                let completions = Rc::clone(&completions);
                move || completions.set(completions.get() + 1)
            },
        ));

        assert_eq!(completions.get(), 1);
        assert_eq!(source.observer_count(), 0);
    }

    #[test]
    fn cancelling_the_chained_subscription_detaches_from_upstream() {
        let source = Broadcast::new();
        let signal = LifecycleSignal::new();
        let sub = source
            .stream()
            .take_until(&signal)
            .subscribe_values(|_: i32| {});

        assert_eq!(source.observer_count(), 1);
        sub.cancel();
        assert_eq!(source.observer_count(), 0);

        // Later signal completion finds nothing left to deliver.
        signal.complete();
    }

    #[test]
    fn cancelling_the_chained_subscription_releases_the_observer() {
        let source = Broadcast::new();
        let signal = LifecycleSignal::new();

        let payload = Rc::new(());
        let weak = Rc::downgrade(&payload);
        let sub = source
            .stream()
            .take_until(&signal)
            .subscribe_values(move |_: i32| {
                let _ = &payload;
            });

        assert!(weak.upgrade().is_some());
        sub.cancel();

        // The observer (and everything it captured) is dropped at
        // cancellation, not parked until the signal completes.
        assert!(weak.upgrade().is_none());
        signal.complete();
    }

    #[test]
    fn multiple_streams_chained_on_one_signal_all_complete() {
        let a = Broadcast::new();
        let b = Broadcast::new();
        let signal = LifecycleSignal::new();
        let completions = Rc::new(Cell::new(0u32));

        for stream in [a.stream(), b.stream()] {
            let completions = Rc::clone(&completions);
            stream.take_until(&signal).subscribe(Observer::new(
                |_: i32| {},
                |_| {},
                move || completions.set(completions.get() + 1),
            ));
        }

        signal.complete();
        assert_eq!(completions.get(), 2);
        assert_eq!(a.observer_count(), 0);
        assert_eq!(b.observer_count(), 0);
    }
}
