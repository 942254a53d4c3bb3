#![forbid(unsafe_code)]

//! Data-access collaborator.
//!
//! The dashboard only depends on the [`DataFeed`] trait; tests substitute
//! marble-backed feeds, the demo binary uses the canned [`StaticFeed`].

use rill_core::Stream;

/// Four fetch-style operations, each returning a stream.
pub trait DataFeed {
    /// Named entries for the list panel.
    fn fetch_list(&self) -> Stream<Vec<String>>;
    /// First numbers source.
    fn fetch_numbers1(&self) -> Stream<Vec<i64>>;
    /// Second numbers source.
    fn fetch_numbers2(&self) -> Stream<Vec<i64>>;
    /// Third numbers source.
    fn fetch_numbers3(&self) -> Stream<Vec<i64>>;
}

/// In-memory feed emitting one canned payload per operation.
pub struct StaticFeed {
    /// Payload for [`DataFeed::fetch_list`].
    pub list: Vec<String>,
    /// Payload for [`DataFeed::fetch_numbers1`].
    pub numbers1: Vec<i64>,
    /// Payload for [`DataFeed::fetch_numbers2`].
    pub numbers2: Vec<i64>,
    /// Payload for [`DataFeed::fetch_numbers3`].
    pub numbers3: Vec<i64>,
}

impl Default for StaticFeed {
    fn default() -> Self {
        Self {
            list: vec!["value1".into(), "value2".into(), "value3".into()],
            numbers1: vec![1],
            numbers2: vec![3],
            numbers3: vec![4],
        }
    }
}

impl DataFeed for StaticFeed {
    fn fetch_list(&self) -> Stream<Vec<String>> {
        Stream::of(vec![self.list.clone()])
    }

    fn fetch_numbers1(&self) -> Stream<Vec<i64>> {
        Stream::of(vec![self.numbers1.clone()])
    }

    fn fetch_numbers2(&self) -> Stream<Vec<i64>> {
        Stream::of(vec![self.numbers2.clone()])
    }

    fn fetch_numbers3(&self) -> Stream<Vec<i64>> {
        Stream::of(vec![self.numbers3.clone()])
    }
}
