//! Bit sequences and half-open bit ranges
//!
//! Bits are stored one per byte (0 or 1) in transmission order: bit 0 is the
//! first bit received.

use std::fmt;
use std::str::FromStr;

use crate::{AwreError, AwreResult};

/// Half-open bit range `[start, end)`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BitRange {
    pub start: usize,
    pub end: usize,
}

impl BitRange {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        BitRange { start, end }
    }

    /// Number of bits covered
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if a bit position lies inside the range
    #[inline]
    pub fn contains(&self, bit: usize) -> bool {
        self.start <= bit && bit < self.end
    }

    /// Check if two ranges share at least one bit
    #[inline]
    pub fn overlaps(&self, other: &BitRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if `other` lies completely inside this range
    #[inline]
    pub fn contains_range(&self, other: &BitRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Debug for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Decoded bits of one captured message
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitSequence(Vec<u8>);

impl BitSequence {
    /// Create from raw bits. Any non-zero value counts as 1.
    pub fn new(bits: Vec<u8>) -> Self {
        BitSequence(bits.into_iter().map(|b| (b != 0) as u8).collect())
    }

    /// Create from booleans
    pub fn from_bools(bits: &[bool]) -> Self {
        BitSequence(bits.iter().map(|&b| b as u8).collect())
    }

    /// Expand bytes MSB-first
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for byte in bytes {
            for shift in (0..8).rev() {
                bits.push((byte >> shift) & 1);
            }
        }
        BitSequence(bits)
    }

    /// Parse a plain-bits string such as `"1010 0011"`.
    /// Whitespace is skipped, `line` is reported on error.
    pub fn parse_line(text: &str, line: usize) -> AwreResult<Self> {
        let mut bits = Vec::with_capacity(text.len());
        for character in text.chars() {
            match character {
                '0' => bits.push(0),
                '1' => bits.push(1),
                c if c.is_whitespace() => {}
                c => return Err(AwreError::InvalidBitString { line, character: c }),
            }
        }
        Ok(BitSequence(bits))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a single bit
    #[inline]
    pub fn bit(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Check if the message is long enough to hold `range`
    #[inline]
    pub fn covers(&self, range: &BitRange) -> bool {
        range.end <= self.0.len()
    }

    /// Read `range` as an unsigned MSB-first value (max 64 bits)
    pub fn read_value(&self, range: BitRange) -> Option<u64> {
        if range.len() > 64 || !self.covers(&range) {
            return None;
        }

        Some(
            self.0[range.start..range.end]
                .iter()
                .fold(0u64, |acc, &bit| (acc << 1) | bit as u64),
        )
    }

    /// XOR with another sequence over the common prefix
    pub fn xor_prefix(&self, other: &BitSequence) -> Vec<u8> {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a ^ b)
            .collect()
    }
}

impl FromStr for BitSequence {
    type Err = AwreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BitSequence::parse_line(s, 1)
    }
}

impl fmt::Debug for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bits({})", self)
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.0 {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

impl From<Vec<u8>> for BitSequence {
    fn from(bits: Vec<u8>) -> Self {
        BitSequence::new(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_bits() {
        let seq: BitSequence = "1010 0011".parse().unwrap();
        assert_eq!(seq.len(), 8);
        assert_eq!(seq.as_slice(), &[1, 0, 1, 0, 0, 0, 1, 1]);
        assert_eq!(seq.to_string(), "10100011");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = BitSequence::parse_line("10x1", 4).unwrap_err();
        assert_eq!(err, AwreError::InvalidBitString { line: 4, character: 'x' });
    }

    #[test]
    fn test_from_bytes_msb_first() {
        let seq = BitSequence::from_bytes(&[0xA0]);
        assert_eq!(seq.as_slice(), &[1, 0, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_value() {
        let seq = BitSequence::from_bytes(&[0x12, 0x34]);
        assert_eq!(seq.read_value(BitRange::new(0, 8)), Some(0x12));
        assert_eq!(seq.read_value(BitRange::new(4, 12)), Some(0x23));
        assert_eq!(seq.read_value(BitRange::new(8, 17)), None);
    }

    #[test]
    fn test_xor_prefix_uses_shorter_length() {
        let a: BitSequence = "1100".parse().unwrap();
        let b: BitSequence = "101".parse().unwrap();
        assert_eq!(a.xor_prefix(&b), vec![0, 1, 1]);
    }

    #[test]
    fn test_range_relations() {
        let outer = BitRange::new(8, 32);
        assert!(outer.contains(8));
        assert!(!outer.contains(32));
        assert!(outer.overlaps(&BitRange::new(31, 40)));
        assert!(!outer.overlaps(&BitRange::new(32, 40)));
        assert!(outer.contains_range(&BitRange::new(8, 16)));
        assert!(!outer.contains_range(&BitRange::new(4, 16)));
        assert_eq!(outer.len(), 24);
    }
}
