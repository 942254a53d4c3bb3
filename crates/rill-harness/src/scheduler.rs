#![forbid(unsafe_code)]

//! Virtual-time task scheduler.
//!
//! Drives marble tests deterministically: tasks are ordered by (virtual
//! time, insertion sequence), so two tasks scheduled for the same frame run
//! in the order they were scheduled. [`VirtualScheduler::flush`] drains the
//! queue, advancing the clock as it goes; a running task may schedule
//! further tasks, including at the current frame.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;

struct Task {
    at: u64,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    action: Option<Box<dyn FnOnce()>>,
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Task {}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Task {
    // Reversed so the BinaryHeap pops the earliest (time, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

#[derive(Default)]
struct SchedulerCore {
    now: u64,
    next_seq: u64,
    queue: BinaryHeap<Task>,
}

/// Deterministic single-threaded scheduler over a virtual clock.
#[derive(Clone, Default)]
pub struct VirtualScheduler {
    core: Rc<RefCell<SchedulerCore>>,
}

impl VirtualScheduler {
    /// A fresh scheduler at frame 0 with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.core.borrow().now
    }

    /// Number of tasks still queued (including cancelled ones not yet
    /// drained).
    #[must_use]
    pub fn pending(&self) -> usize {
        self.core.borrow().queue.len()
    }

    /// Queue `action` to run `delay` frames from now. Returns a handle that
    /// can cancel the task before it runs.
    pub fn schedule(&self, delay: u64, action: impl FnOnce() + 'static) -> TaskHandle {
        let mut core = self.core.borrow_mut();
        let cancelled = Rc::new(Cell::new(false));
        let task = Task {
            at: core.now + delay,
            seq: core.next_seq,
            cancelled: Rc::clone(&cancelled),
            action: Some(Box::new(action)),
        };
        core.next_seq += 1;
        core.queue.push(task);
        TaskHandle { cancelled }
    }

    /// Run all queued tasks in (time, sequence) order, advancing the clock.
    ///
    /// Tasks scheduled by running tasks are drained too; the queue borrow is
    /// released before each action runs, so re-entrant scheduling is safe.
    pub fn flush(&self) {
        loop {
            let mut task = {
                let mut core = self.core.borrow_mut();
                match core.queue.pop() {
                    Some(task) => {
                        core.now = core.now.max(task.at);
                        task
                    }
                    None => break,
                }
            };
            if task.cancelled.get() {
                continue;
            }
            if let Some(action) = task.action.take() {
                action();
            }
        }
    }
}

impl fmt::Debug for VirtualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualScheduler")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Cancellation handle for a scheduled task.
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    /// Prevent the task from running. No-op if it already ran.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Whether the task was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
