//! Instance id generation.
//!
//! Ids are a per-session monotonic counter joined to a random alphanumeric
//! suffix. The counter alone guarantees uniqueness within a session no matter
//! how fast ids are requested; the 6-character suffix (62^6, about 5.7e10
//! values) keeps ids from different sessions apart when graphs are merged on
//! the backend.

#[cfg(test)]
#[path = "ids_test.rs"]
mod ids_test;

use rand::Rng;
use rand::distr::Alphanumeric;

const SUFFIX_LEN: usize = 6;

/// Source of instance ids for a canvas store.
pub trait IdSource: Send {
    /// Produce the next id. Must never repeat within one source.
    fn next_id(&mut self) -> String;
}

/// Default generator: `b{counter}-{random suffix}`.
#[derive(Debug, Default)]
pub struct CounterIds {
    counter: u64,
}

impl CounterIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for CounterIds {
    fn next_id(&mut self) -> String {
        self.counter += 1;
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();
        format!("b{}-{suffix}", self.counter)
    }
}

/// Deterministic `{prefix}1`, `{prefix}2`, ... ids for scripted sessions and tests.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: u64,
}

impl SequentialIds {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), counter: 0 }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("{}{}", self.prefix, self.counter)
    }
}
