//! Pairwise XOR signal matrix
//!
//! For every unordered pair of messages the XOR over their common prefix is
//! stored once. Bits that are 0 for all pairs sent by the same participant
//! and 1 for pairs sent by different participants point at address fields.

use std::time::Instant;

use awre_core::BitSequence;
use tracing::debug;

/// Upper-triangular matrix of pairwise XOR vectors
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignalMatrix {
    /// Number of messages
    size: usize,
    /// Row-major upper triangle without the diagonal
    entries: Vec<Vec<u8>>,
}

impl SignalMatrix {
    /// Build the matrix for `messages`. Pure and order-stable.
    pub fn build(messages: &[BitSequence]) -> Self {
        let started = Instant::now();
        let size = messages.len();
        let mut entries = Vec::with_capacity(size * size.saturating_sub(1) / 2);

        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                entries.push(a.xor_prefix(b));
            }
        }

        debug!(
            messages = size,
            pairs = entries.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "XOR matrix built"
        );

        SignalMatrix { size, entries }
    }

    /// Number of messages the matrix was built from
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored pairs
    #[inline]
    pub fn pair_count(&self) -> usize {
        self.entries.len()
    }

    /// XOR of messages `i` and `j` over their common prefix.
    /// Symmetric; `None` on the diagonal or out of range.
    pub fn xor(&self, i: usize, j: usize) -> Option<&[u8]> {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        if lo == hi || hi >= self.size {
            return None;
        }

        self.entries.get(self.index(lo, hi)).map(Vec::as_slice)
    }

    /// XOR bit at `position` for a pair, `None` past the shorter message
    #[inline]
    pub fn xor_bit(&self, i: usize, j: usize, position: usize) -> Option<u8> {
        self.xor(i, j).and_then(|v| v.get(position).copied())
    }

    #[inline]
    fn index(&self, lo: usize, hi: usize) -> usize {
        lo * self.size - lo * (lo + 1) / 2 + (hi - lo - 1)
    }
}
