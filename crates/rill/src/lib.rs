#![forbid(unsafe_code)]

//! Rill public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use rill_core as core;
    #[cfg(feature = "harness")]
    pub use rill_harness as harness;

    pub use rill_core::{
        Broadcast, FlagLatch, LifecycleSignal, Observer, Stream, StreamError, Subscription,
        combine_concat, combine_latest,
    };
}
