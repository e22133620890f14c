//! Equality clustering - groups messages by length and scores bit stability
//!
//! For messages of lengths 2 and 4 the result could look like
//!
//! ```text
//! 2: [0.5, 1.0]
//! 4: [1.0, 0.75, 1.0, 1.0]
//! ```
//!
//! meaning bit 0 of the 2-bit messages is split evenly while bit 1 never
//! changes. Only consistency matters, so a position that is always 0 scores
//! the same as one that is always 1.

use std::collections::BTreeMap;

use awre_core::{BitRange, BitSequence};
use tracing::debug;

/// A single length with fewer members than this carries no signal
pub const MIN_BLOCKS_PER_CLUSTER: usize = 2;

/// Stability statistics for all messages of one length
#[derive(Clone, Debug, PartialEq)]
pub struct LengthGroup {
    /// Per-bit agreement in [0.5, 1.0]
    pub stability: Vec<f64>,
    /// Number of messages with this length
    pub count: usize,
}

impl LengthGroup {
    /// Message length in bits
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.stability.len()
    }

    /// Check if every position of `range` has the same value in all members
    pub fn is_stable(&self, range: BitRange) -> bool {
        range.end <= self.stability.len()
            && self.stability[range.start..range.end]
                .iter()
                .all(|&s| s >= 1.0)
    }
}

/// Length clusters keyed by message length
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LengthClusters {
    groups: BTreeMap<usize, LengthGroup>,
}

impl LengthClusters {
    /// Cluster with the default minimum group size
    pub fn new(messages: &[BitSequence]) -> Self {
        Self::build(messages, MIN_BLOCKS_PER_CLUSTER)
    }

    /// Cluster `messages` by length, dropping lengths seen fewer than `min_blocks` times
    pub fn build(messages: &[BitSequence], min_blocks: usize) -> Self {
        // length -> (number of ones per position, number of messages)
        let mut ones: BTreeMap<usize, (Vec<u32>, usize)> = BTreeMap::new();

        for message in messages {
            let entry = ones
                .entry(message.len())
                .or_insert_with(|| (vec![0; message.len()], 0));
            for (sum, &bit) in entry.0.iter_mut().zip(message.as_slice()) {
                *sum += bit as u32;
            }
            entry.1 += 1;
        }

        let total = ones.len();
        let groups: BTreeMap<usize, LengthGroup> = ones
            .into_iter()
            .filter(|(_, (_, count))| *count >= min_blocks)
            .map(|(len, (sums, count))| {
                let stability = sums
                    .iter()
                    .map(|&sum| fold_fraction(sum as f64 / count as f64))
                    .collect();
                (len, LengthGroup { stability, count })
            })
            .collect();

        debug!(
            retained = groups.len(),
            dropped = total - groups.len(),
            "length clusters built"
        );

        LengthClusters { groups }
    }

    /// Get the group for a message length
    pub fn get(&self, len: usize) -> Option<&LengthGroup> {
        self.groups.get(&len)
    }

    /// Iterate groups in ascending length order
    pub fn iter(&self) -> impl Iterator<Item = (&usize, &LengthGroup)> {
        self.groups.iter()
    }

    /// Lengths that were retained
    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Fold a fraction of ones into an agreement score: 0.3 becomes 0.7
#[inline]
fn fold_fraction(fraction: f64) -> f64 {
    if fraction >= 0.5 {
        fraction
    } else {
        1.0 - fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitSequence {
        s.parse().unwrap()
    }

    #[test]
    fn test_identical_messages_fully_stable() {
        let messages = vec![bits("10110"), bits("10110"), bits("10110")];
        let clusters = LengthClusters::new(&messages);

        let group = clusters.get(5).unwrap();
        assert_eq!(group.count, 3);
        assert!(group.stability.iter().all(|&s| s == 1.0));
        assert!(group.is_stable(BitRange::new(0, 5)));
    }

    #[test]
    fn test_even_split_scores_half() {
        let messages = vec![bits("01"), bits("11")];
        let clusters = LengthClusters::new(&messages);

        assert_eq!(clusters.get(2).unwrap().stability, vec![0.5, 1.0]);
    }

    #[test]
    fn test_direction_of_bias_ignored() {
        let messages = vec![bits("0100"), bits("0000"), bits("0000"), bits("1000")];
        let clusters = LengthClusters::new(&messages);

        let stability = &clusters.get(4).unwrap().stability;
        assert_eq!(stability, &vec![0.75, 0.75, 1.0, 1.0]);
    }

    #[test]
    fn test_singleton_lengths_dropped() {
        let messages = vec![bits("1010"), bits("1011"), bits("111")];
        let clusters = LengthClusters::new(&messages);

        assert_eq!(clusters.len(), 1);
        assert!(clusters.get(3).is_none());
        assert!(clusters.get(4).is_some());
    }

    #[test]
    fn test_custom_minimum() {
        let messages = vec![bits("10"), bits("10"), bits("111")];
        assert_eq!(LengthClusters::build(&messages, 1).len(), 2);
        assert_eq!(LengthClusters::build(&messages, 3).len(), 0);
    }

    #[test]
    fn test_unstable_range() {
        let messages = vec![bits("1100"), bits("1110")];
        let group = LengthClusters::new(&messages).get(4).cloned().unwrap();
        assert!(group.is_stable(BitRange::new(0, 2)));
        assert!(!group.is_stable(BitRange::new(0, 3)));
        assert!(!group.is_stable(BitRange::new(2, 5)));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn stability_bounded_and_idempotent(
                raw in prop::collection::vec(prop::collection::vec(0u8..2, 1..12), 0..20)
            ) {
                let messages: Vec<BitSequence> = raw.into_iter().map(BitSequence::new).collect();
                let first = LengthClusters::new(&messages);
                let second = LengthClusters::new(&messages);
                prop_assert_eq!(&first, &second);

                for (len, group) in first.iter() {
                    prop_assert_eq!(group.bit_len(), *len);
                    prop_assert!(group.count >= MIN_BLOCKS_PER_CLUSTER);
                    for &s in &group.stability {
                        prop_assert!((0.5..=1.0).contains(&s));
                    }
                }
            }
        }
    }
}
