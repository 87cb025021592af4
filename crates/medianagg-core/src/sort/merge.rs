use crate::{
    capability::ValueOrdering, error::InternalError, sort::run::RunReader, value::Value,
};
use std::{cmp::Ordering, collections::BinaryHeap, vec};

///
/// MergeSource
///
/// One ascending input to the k-way merge.
///

pub(super) enum MergeSource {
    Disk(RunReader),
    Memory(vec::IntoIter<Value>),
}

impl MergeSource {
    fn next_value(&mut self) -> Result<Option<Value>, InternalError> {
        match self {
            Self::Disk(reader) => reader.next_value(),
            Self::Memory(values) => Ok(values.next()),
        }
    }
}

///
/// HeapEntry
///
/// Min-heap adapter over `BinaryHeap`: ordering is reversed, and ties break
/// on source index so the merge is deterministic.
///

struct HeapEntry {
    value: Value,
    source: usize,
    ordering: ValueOrdering,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordering
            .compare(&other.value, &self.value)
            .then_with(|| other.source.cmp(&self.source))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

///
/// RunMerger
///
/// K-way merge of sorted sources. Holds at most one pending value per source.
///

pub(super) struct RunMerger {
    sources: Vec<MergeSource>,
    heap: BinaryHeap<HeapEntry>,
    ordering: ValueOrdering,
}

impl RunMerger {
    pub(super) fn new(
        mut sources: Vec<MergeSource>,
        ordering: ValueOrdering,
    ) -> Result<Self, InternalError> {
        let mut heap = BinaryHeap::with_capacity(sources.len());
        for (source, input) in sources.iter_mut().enumerate() {
            if let Some(value) = input.next_value()? {
                heap.push(HeapEntry {
                    value,
                    source,
                    ordering,
                });
            }
        }

        Ok(Self {
            sources,
            heap,
            ordering,
        })
    }

    pub(super) fn next_value(&mut self) -> Result<Option<Value>, InternalError> {
        let Some(HeapEntry { value, source, .. }) = self.heap.pop() else {
            return Ok(None);
        };

        if let Some(next) = self.sources[source].next_value()? {
            self.heap.push(HeapEntry {
                value: next,
                source,
                ordering: self.ordering,
            });
        }

        Ok(Some(value))
    }
}
