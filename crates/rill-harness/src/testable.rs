#![forbid(unsafe_code)]

//! Cold and hot marble-backed test streams.
//!
//! A [`ColdMarble`] replays its timeline from scratch for every subscriber,
//! relative to the subscription frame. A [`HotMarble`] plays one absolute
//! timeline through a shared broadcast; subscribers only see what happens
//! after they attach, and notifications left of `^` are dropped entirely
//! (they happen before the test's frame 0).
//!
//! Both record a [`SubscriptionWindow`] per attachment. A window closes when
//! the subscription ends for any reason: explicit cancellation or terminal
//! delivery.

use std::cell::RefCell;
use std::rc::Rc;

use rill_core::{Broadcast, Stream, Subscription};

use crate::marble::{Notification, SubscriptionWindow};
use crate::scheduler::VirtualScheduler;

/// Shared record of every subscription window opened against one test
/// stream.
#[derive(Clone, Default)]
pub struct SubscriptionLog {
    windows: Rc<RefCell<Vec<SubscriptionWindow>>>,
}

impl SubscriptionLog {
    /// A fresh, empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all windows, in attachment order.
    #[must_use]
    pub fn windows(&self) -> Vec<SubscriptionWindow> {
        self.windows.borrow().clone()
    }

    fn open(&self, at: u64) -> usize {
        let mut windows = self.windows.borrow_mut();
        windows.push(SubscriptionWindow {
            subscribed_at: at,
            unsubscribed_at: None,
        });
        windows.len() - 1
    }

    fn close(&self, index: usize, at: u64) {
        let mut windows = self.windows.borrow_mut();
        if let Some(window) = windows.get_mut(index)
            && window.unsubscribed_at.is_none()
        {
            window.unsubscribed_at = Some(at);
        }
    }
}

impl std::fmt::Debug for SubscriptionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.windows().iter()).finish()
    }
}

/// Cold test stream: the parsed timeline is scheduled anew, relative to the
/// current frame, each time someone subscribes.
pub struct ColdMarble<T: Clone + 'static> {
    scheduler: VirtualScheduler,
    timeline: Rc<Vec<(u64, Notification<T>)>>,
    log: SubscriptionLog,
}

impl<T: Clone + 'static> ColdMarble<T> {
    pub(crate) fn new(scheduler: VirtualScheduler, timeline: Vec<(u64, Notification<T>)>) -> Self {
        Self {
            scheduler,
            timeline: Rc::new(timeline),
            log: SubscriptionLog::new(),
        }
    }

    /// The stream view. Each subscription schedules its own copy of the
    /// timeline.
    #[must_use]
    pub fn stream(&self) -> Stream<T> {
        let scheduler = self.scheduler.clone();
        let timeline = Rc::clone(&self.timeline);
        let log = self.log.clone();
        Stream::new(move |observer| {
            let index = log.open(scheduler.now());
            let mut handles = Vec::with_capacity(timeline.len());
            for (delay, notification) in timeline.iter() {
                let notification = notification.clone();
                let observer = observer.clone();
                handles.push(scheduler.schedule(*delay, move || match notification {
                    Notification::Value(value) => observer.value(value),
                    Notification::Error(error) => observer.error(error),
                    Notification::Complete => observer.complete(),
                }));
            }

            let sub = Subscription::new();
            let log = log.clone();
            let scheduler = scheduler.clone();
            sub.add_teardown(move || {
                for handle in &handles {
                    handle.cancel();
                }
                log.close(index, scheduler.now());
            });
            sub
        })
    }

    /// Per-subscription windows recorded so far.
    #[must_use]
    pub fn log(&self) -> SubscriptionLog {
        self.log.clone()
    }
}

/// Hot test stream: one absolute timeline multicast to whoever is attached
/// when each notification fires.
pub struct HotMarble<T: Clone + 'static> {
    scheduler: VirtualScheduler,
    source: Broadcast<T>,
    log: SubscriptionLog,
}

impl<T: Clone + 'static> HotMarble<T> {
    /// Schedules the positive-frame part of `timeline` immediately;
    /// negative frames (left of `^`) are dropped.
    pub(crate) fn new(scheduler: VirtualScheduler, timeline: Vec<(i64, Notification<T>)>) -> Self {
        let source: Broadcast<T> = Broadcast::new();
        for (at, notification) in timeline {
            let Ok(delay) = u64::try_from(at) else {
                continue;
            };
            let source = source.clone();
            scheduler.schedule(delay, move || match notification {
                Notification::Value(value) => source.emit(value),
                Notification::Error(error) => source.fail(error),
                Notification::Complete => source.close(),
            });
        }
        Self {
            scheduler,
            source,
            log: SubscriptionLog::new(),
        }
    }

    /// The stream view over the shared timeline.
    #[must_use]
    pub fn stream(&self) -> Stream<T> {
        let source = self.source.stream();
        let log = self.log.clone();
        let scheduler = self.scheduler.clone();
        Stream::new(move |observer| {
            let index = log.open(scheduler.now());
            let upstream = source.subscribe(observer);

            let sub = Subscription::new();
            let log = log.clone();
            let scheduler = scheduler.clone();
            sub.add_teardown(move || {
                upstream.cancel();
                log.close(index, scheduler.now());
            });
            sub
        })
    }

    /// Per-subscription windows recorded so far.
    #[must_use]
    pub fn log(&self) -> SubscriptionLog {
        self.log.clone()
    }
}
