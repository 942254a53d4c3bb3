#![forbid(unsafe_code)]

//! Demo component wiring rill streams to a data feed.
//!
//! The [`Dashboard`] composes four stream patterns over a [`DataFeed`]:
//! three numbers sources combined into one flattened stream, a list fetch
//! with silent empty-list fallback, a quiet flag latched over a boolean
//! stream, and form bindings that end at lifecycle teardown.

pub mod cli;
pub mod dashboard;
pub mod feed;

pub use dashboard::{Dashboard, FormValue};
pub use feed::{DataFeed, StaticFeed};
