#![forbid(unsafe_code)]

//! # Rill core
//!
//! Push-based reactive streams for single-threaded, callback-driven
//! composition:
//!
//! - [`Stream`] — cold stream with "subscribe with three callbacks, cancel"
//!   semantics; operators ([`map`](Stream::map), [`filter`](Stream::filter),
//!   [`take_while`](Stream::take_while), [`recover`](Stream::recover),
//!   [`take_until`](Stream::take_until)) are composing wrapper streams.
//! - [`combine_latest`] / [`combine_concat`] — latest-value combination with
//!   cold-start gating and fail-fast error propagation.
//! - [`Broadcast`] — hot multicast push source.
//! - [`FlagLatch`] — sets a flag exactly once when a boolean stream
//!   completes having emitted only `false`.
//! - [`LifecycleSignal`] — single-shot completion token for deterministic
//!   subscription teardown.
//!
//! All delivery happens on one logical thread of control; subscriptions wait
//! for the next emission without blocking, and cancellation is cooperative
//! and immediate.

pub mod broadcast;
pub mod combine;
pub mod error;
pub mod latch;
pub mod lifecycle;
pub mod operator;
pub mod stream;

pub use broadcast::Broadcast;
pub use combine::{combine_concat, combine_latest};
pub use error::StreamError;
pub use latch::FlagLatch;
pub use lifecycle::LifecycleSignal;
pub use stream::{Observer, Stream, Subscription};
