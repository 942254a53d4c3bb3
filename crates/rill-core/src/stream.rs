#![forbid(unsafe_code)]

//! Push-based streams with explicit subscription lifecycles.
//!
//! # Design
//!
//! A [`Stream<T>`] is a cold recipe: a stored `on_subscribe` closure that is
//! run once per [`subscribe`](Stream::subscribe) call. Two subscriptions are
//! two fully independent pipelines; nothing is shared or cached across them.
//!
//! An [`Observer<T>`] bundles the three delivery callbacks (value, error,
//! completion) behind a cheaply clonable `Rc` handle. A [`Subscription`] is
//! the explicit-cancel handle for one attachment: it holds an `active` flag
//! and a list of teardown closures that run exactly once on
//! [`cancel`](Subscription::cancel).
//!
//! # Invariants
//!
//! 1. Terminal delivery (completion or error) cancels the subscription
//!    before the terminal callback runs; no notification of any kind is
//!    delivered after cancellation.
//! 2. Teardowns run exactly once. Registering a teardown on an already
//!    cancelled subscription runs it immediately.
//! 3. Cancelling one subscription never affects other subscriptions of the
//!    same logical stream.
//!
//! Everything is single-threaded and callback-driven: `Rc<RefCell>` shared
//! interiors, no locks, no parallel delivery.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::StreamError;

type Teardown = Box<dyn FnOnce()>;

struct SubscriptionState {
    active: Cell<bool>,
    teardowns: RefCell<Vec<Teardown>>,
}

/// Handle for one active attachment to a [`Stream`].
///
/// Clones share state: cancelling any clone cancels the attachment.
/// Cancellation is always explicit (or driven by a terminal event); dropping
/// the handle does nothing, so handles can be stored or discarded freely.
#[derive(Clone)]
pub struct Subscription {
    state: Rc<SubscriptionState>,
}

impl Subscription {
    /// A fresh, active subscription with no teardowns yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(SubscriptionState {
                active: Cell::new(true),
                teardowns: RefCell::new(Vec::new()),
            }),
        }
    }

    /// An already-cancelled subscription, for sources that finish during
    /// subscribe (synchronous emission).
    #[must_use]
    pub fn cancelled() -> Self {
        let sub = Self::new();
        sub.state.active.set(false);
        sub
    }

    /// Whether this attachment can still receive notifications.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    /// Stop future delivery and run all registered teardowns exactly once.
    ///
    /// Idempotent: the second and later calls are no-ops.
    pub fn cancel(&self) {
        if !self.state.active.replace(false) {
            return;
        }
        let teardowns = self.state.teardowns.take();
        for teardown in teardowns {
            teardown();
        }
    }

    /// Register cleanup to run on cancellation.
    ///
    /// If the subscription is already cancelled the teardown runs
    /// immediately.
    pub fn add_teardown(&self, teardown: impl FnOnce() + 'static) {
        if self.is_active() {
            self.state.teardowns.borrow_mut().push(Box::new(teardown));
        } else {
            teardown();
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

struct ObserverCallbacks<T> {
    on_value: Box<dyn Fn(T)>,
    on_error: Box<dyn Fn(StreamError)>,
    on_complete: Box<dyn Fn()>,
}

/// The three delivery callbacks of one subscriber, behind a shared handle.
pub struct Observer<T> {
    callbacks: Rc<ObserverCallbacks<T>>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            callbacks: Rc::clone(&self.callbacks),
        }
    }
}

impl<T: 'static> Observer<T> {
    /// Build an observer from the full callback triple.
    pub fn new(
        on_value: impl Fn(T) + 'static,
        on_error: impl Fn(StreamError) + 'static,
        on_complete: impl Fn() + 'static,
    ) -> Self {
        Self {
            callbacks: Rc::new(ObserverCallbacks {
                on_value: Box::new(on_value),
                on_error: Box::new(on_error),
                on_complete: Box::new(on_complete),
            }),
        }
    }

    /// Value-only observer. Errors are logged at `warn`; completion is
    /// ignored.
    pub fn on_values(on_value: impl Fn(T) + 'static) -> Self {
        Self::new(
            on_value,
            |error| tracing::warn!(%error, "unhandled stream error"),
            || {},
        )
    }

    /// Deliver a value.
    pub fn value(&self, value: T) {
        (self.callbacks.on_value)(value);
    }

    /// Deliver a terminal failure.
    pub fn error(&self, error: StreamError) {
        (self.callbacks.on_error)(error);
    }

    /// Deliver normal completion.
    pub fn complete(&self) {
        (self.callbacks.on_complete)();
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer").finish_non_exhaustive()
    }
}

type OnSubscribe<T> = dyn Fn(Observer<T>) -> Subscription;

/// A time-ordered, possibly-infinite sequence of values that terminates with
/// either completion or a [`StreamError`].
///
/// Streams are cold: each [`subscribe`](Stream::subscribe) runs the stored
/// source closure again, producing an independent pipeline.
pub struct Stream<T: 'static> {
    on_subscribe: Rc<OnSubscribe<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: Rc::clone(&self.on_subscribe),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

impl<T: 'static> Stream<T> {
    /// Build a stream from a source closure, run once per subscription.
    ///
    /// The closure receives an already-gated observer: after the returned
    /// subscription is cancelled (explicitly or by a terminal event), calls
    /// on that observer become no-ops, so sources do not need their own
    /// delivery bookkeeping.
    pub fn new(on_subscribe: impl Fn(Observer<T>) -> Subscription + 'static) -> Self {
        Self {
            on_subscribe: Rc::new(on_subscribe),
        }
    }

    /// Attach an observer; returns the cancellation handle.
    pub fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let sub = Subscription::new();
        let gated = gate(observer, &sub);
        let upstream = (self.on_subscribe)(gated);
        sub.add_teardown(move || upstream.cancel());
        sub
    }

    /// Attach a value-only observer (see [`Observer::on_values`]).
    pub fn subscribe_values(&self, on_value: impl Fn(T) + 'static) -> Subscription {
        self.subscribe(Observer::on_values(on_value))
    }

    /// A stream that completes immediately without emitting.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(|observer| {
            observer.complete();
            Subscription::cancelled()
        })
    }

    /// A stream that never emits and never terminates.
    #[must_use]
    pub fn never() -> Self {
        Self::new(|_observer| Subscription::new())
    }

    /// A stream that fails immediately with `error`.
    #[must_use]
    pub fn fail(error: StreamError) -> Self {
        Self::new(move |observer| {
            observer.error(error.clone());
            Subscription::cancelled()
        })
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// A stream that synchronously emits each value in order, then
    /// completes.
    #[must_use]
    pub fn of(values: impl Into<Vec<T>>) -> Self {
        let values: Vec<T> = values.into();
        Self::new(move |observer| {
            for value in &values {
                observer.value(value.clone());
            }
            observer.complete();
            Subscription::cancelled()
        })
    }
}

/// Wrap `observer` so every delivery is dropped once `sub` is cancelled, and
/// terminal deliveries cancel `sub` first.
fn gate<T: 'static>(observer: Observer<T>, sub: &Subscription) -> Observer<T> {
    let on_value = {
        let sub = sub.clone();
        let observer = observer.clone();
        move |value| {
            if sub.is_active() {
                observer.value(value);
            }
        }
    };
    let on_error = {
        let sub = sub.clone();
        let observer = observer.clone();
        move |error| {
            if sub.is_active() {
                sub.cancel();
                observer.error(error);
            }
        }
    };
    let on_complete = {
        let sub = sub.clone();
        move || {
            if sub.is_active() {
                sub.cancel();
                observer.complete();
            }
        }
    };
    Observer::new(on_value, on_error, on_complete)
}
