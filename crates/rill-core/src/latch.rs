#![forbid(unsafe_code)]

//! Boolean flag latch over a monitored stream.
//!
//! [`FlagLatch::arm`] watches a `Stream<bool>` and sets its flag exactly
//! once, at the moment the stream completes, provided every observed value
//! was `false`. The first `true` value cancels the subscription on the spot:
//! the latch is not merely ignoring the value, it stops listening, and the
//! flag can never be set afterwards.
//!
//! # Invariants
//!
//! 1. The flag starts `false` and is written at most once, only on the
//!    all-false-then-complete path.
//! 2. A `true` value permanently suppresses the flag and ends the
//!    subscription at that point.
//! 3. A source failure leaves the flag unset.
//!
//! Sources that emit synchronously during subscribe are handled: the trip is
//! recorded immediately and the subscription is cancelled as soon as its
//! handle exists, so no later value or completion can set the flag.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::StreamError;
use crate::stream::{Observer, Stream, Subscription};

/// One-shot boolean latch armed over a monitored stream.
pub struct FlagLatch {
    flag: Rc<Cell<bool>>,
    subscription: Subscription,
}

impl FlagLatch {
    /// Subscribe to `signals` and latch on all-false-then-complete.
    #[must_use]
    pub fn arm(signals: &Stream<bool>) -> Self {
        let flag = Rc::new(Cell::new(false));
        let tripped = Rc::new(Cell::new(false));
        let handle: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let on_value = {
            let tripped = Rc::clone(&tripped);
            let handle = Rc::clone(&handle);
            move |value: bool| {
                if tripped.get() {
                    return;
                }
                if value {
                    tripped.set(true);
                    if let Some(sub) = handle.borrow().as_ref() {
                        sub.cancel();
                    }
                }
            }
        };
        let on_error = |error: StreamError| {
            tracing::debug!(%error, "flag latch source failed; flag stays unset");
        };
        let on_complete = {
            let flag = Rc::clone(&flag);
            let tripped = Rc::clone(&tripped);
            move || {
                if !tripped.get() {
                    flag.set(true);
                }
            }
        };

        let subscription = signals.subscribe(Observer::new(on_value, on_error, on_complete));
        if tripped.get() {
            // The source emitted `true` synchronously, before the handle
            // existed.
            subscription.cancel();
        }
        *handle.borrow_mut() = Some(subscription.clone());

        Self { flag, subscription }
    }

    /// Whether the latch has fired.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.flag.get()
    }

    /// The underlying subscription, for lifecycle chaining or explicit
    /// cancellation.
    #[must_use]
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl fmt::Debug for FlagLatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagLatch")
            .field("set", &self.is_set())
            .field("listening", &self.subscription.is_active())
            .finish()
    }
}
