//! Module: aggregate::selector
//! Responsibility: bounded in-memory buffer and quickselect.
//! Does not own: overflow handling (the spill coordinator checks `is_full`).
//! Boundary: all comparisons go through the aggregation's `ValueOrdering`.

use crate::{
    aggregate::rank::RankPosition,
    capability::ValueOrdering,
    error::{ErrorOrigin, InternalError},
    value::Value,
};
use std::cmp::Ordering;

///
/// BoundedSelector
///
/// Append-only buffer of owned values, capped at `capacity`.
/// Selection reorders the buffer in place.
///

#[derive(Clone, Debug)]
pub struct BoundedSelector {
    values: Vec<Value>,
    capacity: usize,
}

impl BoundedSelector {
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            values: Vec::new(),
            capacity,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when the next insert would exceed capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    /// Append one owned value. Inserting into a full buffer is a caller bug.
    pub fn insert(&mut self, slot: Value) -> Result<(), InternalError> {
        if self.is_full() {
            return Err(InternalError::invariant(
                ErrorOrigin::Selector,
                format!(
                    "insert into full selector (capacity {}); overflow must spill first",
                    self.capacity
                ),
            ));
        }

        self.values.push(slot);
        Ok(())
    }

    /// Return the value with 1-based `rank` under `ordering`.
    pub fn select(&mut self, rank: u64, ordering: ValueOrdering) -> Result<&Value, InternalError> {
        let index = self.rank_index(rank)?;
        let index = quickselect(&mut self.values, index, ordering);

        Ok(&self.values[index])
    }

    /// Select both middle ranks in one pass.
    ///
    /// After quickselect places rank `low` at index `k`, every value right of
    /// `k` compares greater-or-equal, so rank `low + 1` is the minimum of that
    /// suffix.
    pub fn select_pair(
        &mut self,
        position: RankPosition,
        ordering: ValueOrdering,
    ) -> Result<(Value, Option<Value>), InternalError> {
        let index = self.rank_index(position.low())?;
        let index = quickselect(&mut self.values, index, ordering);
        let low = self.values[index].clone();

        if position.is_single() {
            return Ok((low, None));
        }

        self.rank_index(position.high())?;
        let high = self.values[index + 1..]
            .iter()
            .min_by(|a, b| ordering.compare(a, b))
            .cloned()
            .ok_or_else(|| {
                InternalError::rank_out_of_range(
                    ErrorOrigin::Selector,
                    position.high(),
                    self.values.len() as u64,
                )
            })?;

        Ok((low, Some(high)))
    }

    /// Hand the buffered values over (used when spilling).
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    fn rank_index(&self, rank: u64) -> Result<usize, InternalError> {
        let len = self.values.len() as u64;
        if rank == 0 || rank > len {
            return Err(InternalError::rank_out_of_range(
                ErrorOrigin::Selector,
                rank,
                len,
            ));
        }

        usize::try_from(rank - 1)
            .map_err(|_| InternalError::rank_out_of_range(ErrorOrigin::Selector, rank, len))
    }
}

// Quickselect with the last element of the active range as pivot.
// Returns `index`, after which `values[index]` holds the order statistic.
fn quickselect(values: &mut [Value], index: usize, ordering: ValueOrdering) -> usize {
    let mut lo = 0;
    let mut hi = values.len() - 1;

    loop {
        let (lt, gt) = partition3(values, lo, hi, ordering);
        if index < lt {
            hi = lt - 1;
        } else if index < gt {
            return index;
        } else {
            lo = gt;
        }
    }
}

// Three-way partition of `values[lo..=hi]` around `values[hi]`:
// [lo, lt) < pivot, [lt, gt) == pivot, [gt, hi] > pivot.
// The equal band always holds the pivot, so every round shrinks the range.
fn partition3(
    values: &mut [Value],
    lo: usize,
    hi: usize,
    ordering: ValueOrdering,
) -> (usize, usize) {
    let pivot = values[hi].clone();
    let (mut lt, mut i, mut gt) = (lo, lo, hi + 1);

    while i < gt {
        match ordering.compare(&values[i], &pivot) {
            Ordering::Less => {
                values.swap(lt, i);
                lt += 1;
                i += 1;
            }
            Ordering::Greater => {
                gt -= 1;
                values.swap(i, gt);
            }
            Ordering::Equal => i += 1,
        }
    }

    (lt, gt)
}
