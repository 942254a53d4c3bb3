#![forbid(unsafe_code)]

//! Latest-value stream combination.
//!
//! # Design
//!
//! [`combine_latest`] joins N input streams into one output whose emissions
//! are snapshots of the most recent value from every input, in input order.
//! The snapshot is gated: nothing is emitted until every input has produced
//! at least one value. After the gate opens, any single input's emission
//! recomputes and re-emits using the latest value from every input.
//!
//! [`combine_concat`] layers a flatten-one-level map on top for streams of
//! lists: each emission is the concatenation of the latest list from every
//! input.
//!
//! # Invariants
//!
//! 1. No snapshot is emitted before all inputs have emitted (cold-start
//!    gating).
//! 2. Snapshot order always matches input order, regardless of arrival
//!    order.
//! 3. An input failure fails the output unchanged and cancels all sibling
//!    subscriptions (fail-fast, no partial combination).
//!
//! # Edge cases
//!
//! - An input that completes without ever emitting makes the gate
//!   unsatisfiable; the output completes immediately.
//! - Zero inputs: the output emits one empty snapshot and completes. The
//!   empty concatenation is the empty list, which keeps
//!   `combine_concat` ≡ direct concatenation at N = 0.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::stream::{Observer, Stream, Subscription};

/// Combine the latest values of all inputs into ordered snapshots.
///
/// Each subscription to the result builds an independent combination
/// pipeline; there is no shared state across subscriptions.
#[must_use]
pub fn combine_latest<T: Clone + 'static>(inputs: Vec<Stream<T>>) -> Stream<Vec<T>> {
    let inputs = Rc::new(inputs);
    Stream::new(move |observer| {
        if inputs.is_empty() {
            observer.value(Vec::new());
            observer.complete();
            return Subscription::cancelled();
        }

        let count = inputs.len();
        let latest: Rc<RefCell<Vec<Option<T>>>> = Rc::new(RefCell::new(vec![None; count]));
        let remaining = Rc::new(Cell::new(count));
        let sub = Subscription::new();

        for (index, input) in inputs.iter().enumerate() {
            let on_value = {
                let latest = Rc::clone(&latest);
                let observer = observer.clone();
                move |value: T| {
                    // Snapshot under the borrow, deliver after releasing it.
                    let snapshot = {
                        let mut latest = latest.borrow_mut();
                        latest[index] = Some(value);
                        if latest.iter().all(Option::is_some) {
                            Some(
                                latest
                                    .iter()
                                    .map(|slot| {
                                        slot.clone().expect("gate checked all slots are filled")
                                    })
                                    .collect::<Vec<T>>(),
                            )
                        } else {
                            None
                        }
                    };
                    if let Some(snapshot) = snapshot {
                        observer.value(snapshot);
                    }
                }
            };
            let on_error = {
                let observer = observer.clone();
                move |error| observer.error(error)
            };
            let on_complete = {
                let latest = Rc::clone(&latest);
                let remaining = Rc::clone(&remaining);
                let observer = observer.clone();
                move || {
                    if latest.borrow()[index].is_none() {
                        // This input can never satisfy the gate.
                        observer.complete();
                        return;
                    }
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        observer.complete();
                    }
                }
            };
            let inner = input.subscribe(Observer::new(on_value, on_error, on_complete));
            sub.add_teardown(move || inner.cancel());
        }
        sub
    })
}

/// Combine list-valued inputs and flatten one level: each emission is the
/// concatenation of the latest list from every input, in input order.
#[must_use]
pub fn combine_concat<U: Clone + 'static>(inputs: Vec<Stream<Vec<U>>>) -> Stream<Vec<U>> {
    combine_latest(inputs).map(|lists| lists.into_iter().flatten().collect())
}
