//! Module: aggregate::grouped
//! Responsibility: one independent median state per group key.
//! Does not own: per-group strategy (delegated to `MedianAggregate`).
//! Boundary: a failed update releases only that group's state.

use crate::{
    aggregate::accumulator::{MedianAggregate, MedianState},
    error::InternalError,
    value::Value,
};
use std::collections::BTreeMap;

///
/// GroupedMedian
///
/// One independent median per group key, finalized in key order.
///

#[derive(Debug)]
pub struct GroupedMedian<K: Ord> {
    aggregate: MedianAggregate,
    groups: BTreeMap<K, Option<MedianState>>,
}

impl<K: Ord> GroupedMedian<K> {
    #[must_use]
    pub const fn new(aggregate: MedianAggregate) -> Self {
        Self {
            aggregate,
            groups: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Fold one value into its group. A null value still registers the key.
    ///
    /// If the update fails the group's state is released and the key is
    /// removed; other groups are untouched.
    pub fn update(&mut self, key: K, value: &Value) -> Result<(), InternalError> {
        let state = self.groups.get_mut(&key).and_then(Option::take);

        match self.aggregate.update(state, value) {
            Ok(state) => {
                self.groups.insert(key, state);
                Ok(())
            }
            Err(err) => {
                self.groups.remove(&key);
                Err(err)
            }
        }
    }

    /// Finalize every group in ascending key order.
    pub fn finalize(self) -> Result<Vec<(K, Value)>, InternalError> {
        let Self { aggregate, groups } = self;

        groups
            .into_iter()
            .map(|(key, state)| aggregate.finalize(state).map(|median| (key, median)))
            .collect()
    }
}
