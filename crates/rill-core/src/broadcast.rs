#![forbid(unsafe_code)]

//! Hot multicast source.
//!
//! A [`Broadcast<T>`] pushes each emission to every currently attached
//! observer. Attachments are independent subscriptions: cancelling one does
//! not affect the others. After [`close`](Broadcast::close) or
//! [`fail`](Broadcast::fail), the source is terminated; late subscribers
//! receive the terminal signal immediately and nothing else.
//!
//! Observer lists are snapshotted before delivery, so callbacks may freely
//! subscribe or cancel during a notification cycle without re-entrant borrow
//! panics.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::StreamError;
use crate::stream::{Observer, Stream, Subscription};

#[derive(Clone)]
enum Terminal {
    Closed,
    Failed(StreamError),
}

struct BroadcastInner<T> {
    observers: RefCell<Vec<(u64, Observer<T>)>>,
    next_id: Cell<u64>,
    terminal: RefCell<Option<Terminal>>,
}

/// Hot push source multicasting to all attached observers.
pub struct Broadcast<T: 'static> {
    inner: Rc<BroadcastInner<T>>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Broadcast<T> {
    /// A fresh, open broadcast with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BroadcastInner {
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                terminal: RefCell::new(None),
            }),
        }
    }

    /// Number of currently attached observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Whether the broadcast has been closed or failed.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.inner.terminal.borrow().is_some()
    }

    /// Terminate with completion. All observers receive `complete`; later
    /// subscribers complete immediately. Idempotent.
    pub fn close(&self) {
        if self.is_terminated() {
            return;
        }
        *self.inner.terminal.borrow_mut() = Some(Terminal::Closed);
        let observers = self.inner.observers.take();
        for (_, observer) in observers {
            observer.complete();
        }
    }

    /// Terminate with a failure. All observers receive `error`; later
    /// subscribers fail immediately. Idempotent.
    pub fn fail(&self, error: StreamError) {
        if self.is_terminated() {
            return;
        }
        *self.inner.terminal.borrow_mut() = Some(Terminal::Failed(error.clone()));
        let observers = self.inner.observers.take();
        for (_, observer) in observers {
            observer.error(error.clone());
        }
    }

    /// A stream view over this broadcast. Each subscription attaches an
    /// independent observer.
    #[must_use]
    pub fn stream(&self) -> Stream<T> {
        let inner = Rc::clone(&self.inner);
        Stream::new(move |observer| {
            let terminal = inner.terminal.borrow().clone();
            if let Some(terminal) = terminal {
                match terminal {
                    Terminal::Closed => observer.complete(),
                    Terminal::Failed(error) => observer.error(error),
                }
                return Subscription::cancelled();
            }

            let id = inner.next_id.get();
            inner.next_id.set(id + 1);
            inner.observers.borrow_mut().push((id, observer));

            let sub = Subscription::new();
            let detach = Rc::downgrade(&inner);
            sub.add_teardown(move || {
                if let Some(inner) = detach.upgrade() {
                    inner.observers.borrow_mut().retain(|(oid, _)| *oid != id);
                }
            });
            sub
        })
    }
}

impl<T: Clone + 'static> Broadcast<T> {
    /// Push a value to every attached observer, in attachment order.
    ///
    /// No-op once terminated.
    pub fn emit(&self, value: T) {
        if self.is_terminated() {
            return;
        }
        let observers: Vec<Observer<T>> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer.value(value.clone());
        }
    }
}

impl<T> fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcast")
            .field("observers", &self.observer_count())
            .field("terminated", &self.is_terminated())
            .finish()
    }
}
