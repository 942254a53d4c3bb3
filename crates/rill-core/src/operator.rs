#![forbid(unsafe_code)]

//! Composing stream operators.
//!
//! Each operator returns a new [`Stream`] whose source closure subscribes
//! upstream with an adapted observer. Nothing is evaluated until the derived
//! stream is itself subscribed, and every subscription composes its own
//! pipeline.

use std::rc::Rc;

use crate::error::StreamError;
use crate::stream::{Observer, Stream};

impl<T: 'static> Stream<T> {
    /// Transform every value with `f`.
    #[must_use]
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + 'static) -> Stream<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::new(move |observer| {
            let on_value = {
                let f = Rc::clone(&f);
                let observer = observer.clone();
                move |value| observer.value(f(value))
            };
            let on_error = {
                let observer = observer.clone();
                move |error| observer.error(error)
            };
            let on_complete = move || observer.complete();
            source.subscribe(Observer::new(on_value, on_error, on_complete))
        })
    }

    /// Drop values for which `pred` returns false.
    #[must_use]
    pub fn filter(&self, pred: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        let source = self.clone();
        let pred = Rc::new(pred);
        Stream::new(move |observer| {
            let on_value = {
                let pred = Rc::clone(&pred);
                let observer = observer.clone();
                move |value| {
                    if pred(&value) {
                        observer.value(value);
                    }
                }
            };
            let on_error = {
                let observer = observer.clone();
                move |error| observer.error(error)
            };
            let on_complete = move || observer.complete();
            source.subscribe(Observer::new(on_value, on_error, on_complete))
        })
    }

    /// Forward values while `pred` holds. The first failing value is not
    /// forwarded; the derived stream completes there and the upstream
    /// subscription is cancelled.
    #[must_use]
    pub fn take_while(&self, pred: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        let source = self.clone();
        let pred = Rc::new(pred);
        Stream::new(move |observer| {
            let on_value = {
                let pred = Rc::clone(&pred);
                let observer = observer.clone();
                move |value| {
                    if pred(&value) {
                        observer.value(value);
                    } else {
                        // Completing the derived stream cancels upstream
                        // through the subscription teardown chain.
                        observer.complete();
                    }
                }
            };
            let on_error = {
                let observer = observer.clone();
                move |error| observer.error(error)
            };
            let on_complete = move || observer.complete();
            source.subscribe(Observer::new(on_value, on_error, on_complete))
        })
    }

    /// Replace a failure with a single fallback value, then complete.
    ///
    /// Successful notifications pass through unchanged. The derived stream
    /// never fails outward: it always terminates with completion, either
    /// after the original payload or after the substituted value.
    #[must_use]
    pub fn recover(&self, fallback: impl Fn(StreamError) -> T + 'static) -> Stream<T> {
        let source = self.clone();
        let fallback = Rc::new(fallback);
        Stream::new(move |observer| {
            let on_value = {
                let observer = observer.clone();
                move |value| observer.value(value)
            };
            let on_error = {
                let fallback = Rc::clone(&fallback);
                let observer = observer.clone();
                move |error| {
                    observer.value(fallback(error));
                    observer.complete();
                }
            };
            let on_complete = move || observer.complete();
            source.subscribe(Observer::new(on_value, on_error, on_complete))
        })
    }
}
