//! Module: aggregate::rank
//! Responsibility: middle-rank arithmetic for a value count.
//! Does not own: locating values at those ranks.
//! Boundary: ranks are 1-based; a count of zero has no ranks.

///
/// RankPosition
///
/// 1-based ranks of the middle order statistics for `count` values:
/// `low = ⌊(count+1)/2⌋`, `high = ⌊count/2⌋+1`. They coincide iff count is odd.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RankPosition {
    low: u64,
    high: u64,
}

impl RankPosition {
    /// Middle ranks for `count` values; `None` when there is nothing to rank.
    #[must_use]
    pub const fn for_count(count: u64) -> Option<Self> {
        if count == 0 {
            return None;
        }

        // ⌊(count+1)/2⌋ without overflowing at u64::MAX
        let low = count / 2 + count % 2;
        let high = count / 2 + 1;

        Some(Self { low, high })
    }

    #[must_use]
    pub const fn low(&self) -> u64 {
        self.low
    }

    #[must_use]
    pub const fn high(&self) -> u64 {
        self.high
    }

    /// True when one middle value is the median (odd count).
    #[must_use]
    pub const fn is_single(&self) -> bool {
        self.low == self.high
    }
}
