//! Include ranges - bits of a message type not yet claimed by a label
//!
//! Starts as one range covering the longest message. Every discovered label
//! is cut out of the range that holds it, leaving at most two remainders.
//! Ranges are kept sorted by start and never overlap.

use awre_core::BitRange;

/// Disjoint unassigned bit ranges of one message type
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncludeRanges {
    ranges: Vec<BitRange>,
}

impl IncludeRanges {
    /// One range `[0, max_len)`, or nothing for `max_len == 0`
    pub fn new(max_len: usize) -> Self {
        let ranges = if max_len == 0 {
            Vec::new()
        } else {
            vec![BitRange::new(0, max_len)]
        };
        IncludeRanges { ranges }
    }

    /// Build from arbitrary ranges; empty ones are dropped, the rest sorted
    pub fn from_ranges(mut ranges: Vec<BitRange>) -> Self {
        ranges.retain(|r| !r.is_empty());
        ranges.sort();
        IncludeRanges { ranges }
    }

    /// Iterate ranges in ascending order
    pub fn iter(&self) -> impl Iterator<Item = BitRange> + '_ {
        self.ranges.iter().copied()
    }

    pub fn as_slice(&self) -> &[BitRange] {
        &self.ranges
    }

    /// Lowest range
    pub fn first(&self) -> Option<BitRange> {
        self.ranges.first().copied()
    }

    /// Range holding `bit`
    pub fn containing(&self, bit: usize) -> Option<BitRange> {
        self.iter().find(|r| r.contains(bit))
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of unassigned bits
    pub fn unassigned_bits(&self) -> usize {
        self.ranges.iter().map(BitRange::len).sum()
    }

    /// Cut `label` out of the range holding it.
    ///
    /// Returns the range that was split, or `None` when no single range
    /// contains `label` (the ranges are left untouched).
    pub fn exclude(&mut self, label: BitRange) -> Option<BitRange> {
        let index = self.ranges.iter().position(|r| r.overlaps(&label))?;
        let overlapping = self.ranges[index];
        if !overlapping.contains_range(&label) {
            return None;
        }

        self.ranges.remove(index);

        let mut insert_at = index;
        if overlapping.start != label.start {
            self.ranges
                .insert(insert_at, BitRange::new(overlapping.start, label.start));
            insert_at += 1;
        }
        if overlapping.end != label.end {
            self.ranges
                .insert(insert_at, BitRange::new(label.end, overlapping.end));
        }

        Some(overlapping)
    }
}
