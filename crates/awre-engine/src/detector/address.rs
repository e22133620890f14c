//! Address field detection
//!
//! Messages from the same participant carry the same source address, so
//! their XOR is zero on the address bits; messages from different
//! participants differ there. A bit is an address bit when both hold for
//! every pair. The label covers the first consistent stretch of address bits
//! widened to the alignment, but never over a bit that varies within one
//! sender.

use std::sync::Arc;

use awre_core::{BitRange, BitSequence, FieldType, Label, ParticipantId};
use awre_stats::SignalMatrix;

use crate::detector::FieldDetector;
use crate::{DetectorConfig, DetectorSettings, IncludeRanges};

#[derive(Debug)]
pub struct AddressDetector {
    settings: DetectorSettings,
    participants: Vec<Option<ParticipantId>>,
    matrix: Arc<SignalMatrix>,
    alignment: usize,
}

/// Member pairs split by whether they share a sender
struct PairSets {
    same: Vec<(usize, usize)>,
    cross: Vec<(usize, usize)>,
}

impl AddressDetector {
    pub fn new(
        settings: DetectorSettings,
        participants: Vec<Option<ParticipantId>>,
        matrix: Arc<SignalMatrix>,
        config: &DetectorConfig,
    ) -> Self {
        AddressDetector {
            settings,
            participants,
            matrix,
            alignment: config.address_alignment.max(1),
        }
    }

    fn pair_sets(&self, members: &[usize]) -> Option<PairSets> {
        let senders: Vec<(usize, ParticipantId)> = members
            .iter()
            .filter_map(|&i| self.participants.get(i).copied().flatten().map(|p| (i, p)))
            .collect();

        let mut sets = PairSets {
            same: Vec::new(),
            cross: Vec::new(),
        };
        for (n, &(i, pi)) in senders.iter().enumerate() {
            for &(j, pj) in &senders[n + 1..] {
                if pi == pj {
                    sets.same.push((i, j));
                } else {
                    sets.cross.push((i, j));
                }
            }
        }

        // at least two senders, at least one of them seen twice
        if sets.same.is_empty() || sets.cross.is_empty() {
            None
        } else {
            Some(sets)
        }
    }

    /// Same-participant pairs agree on `position`
    fn is_consistent(&self, pairs: &PairSets, position: usize) -> bool {
        pairs
            .same
            .iter()
            .all(|&(i, j)| self.matrix.xor_bit(i, j, position) == Some(0))
    }

    /// Consistent per participant and different across participants
    fn is_address_bit(&self, pairs: &PairSets, position: usize) -> bool {
        self.is_consistent(pairs, position)
            && pairs
                .cross
                .iter()
                .all(|&(i, j)| self.matrix.xor_bit(i, j, position) == Some(1))
    }

    fn search_range(&self, pairs: &PairSets, range: BitRange) -> Option<BitRange> {
        let first = (range.start..range.end).find(|&pos| self.is_address_bit(pairs, pos))?;

        let consistent_end = (first..range.end)
            .find(|&pos| !self.is_consistent(pairs, pos))
            .unwrap_or(range.end);
        let last = (first..consistent_end)
            .rev()
            .find(|&pos| self.is_address_bit(pairs, pos))?;

        let offset = first - range.start;
        let widened_start = range.start + offset - offset % self.alignment;
        let span = last + 1 - range.start;
        let widened_end =
            (range.start + span.div_ceil(self.alignment) * self.alignment).min(range.end);

        // widening must not pull in bits that vary within one sender
        let start = (widened_start..first)
            .rev()
            .find(|&pos| !self.is_consistent(pairs, pos))
            .map_or(widened_start, |pos| pos + 1);
        let end = (last + 1..widened_end)
            .find(|&pos| !self.is_consistent(pairs, pos))
            .unwrap_or(widened_end);

        Some(BitRange::new(start, end))
    }
}

impl FieldDetector for AddressDetector {
    fn field_type(&self) -> FieldType {
        FieldType::Address
    }

    fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut DetectorSettings {
        &mut self.settings
    }

    fn find_field(
        &self,
        _messages: &[BitSequence],
        include: &IncludeRanges,
        members: &[usize],
    ) -> Option<Label> {
        let pairs = self.pair_sets(members)?;

        include
            .iter()
            .find_map(|range| self.search_range(&pairs, range))
            .map(|range| Label::new(FieldType::Address, range, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::testing::{all_members, message};

    const ALICE: u64 = 0xA1A1;
    const BOB: u64 = 0x5E5E;

    fn conversation(count: u64) -> (Vec<BitSequence>, Vec<Option<ParticipantId>>) {
        let mut messages = Vec::new();
        let mut participants = Vec::new();
        for seq in 0..count {
            let from_alice = seq % 2 == 0;
            let (dst, src) = if from_alice { (BOB, ALICE) } else { (ALICE, BOB) };
            messages.push(message(&[(0x2DD4, 16), (dst, 16), (src, 16), (seq, 8)]));
            participants.push(Some(ParticipantId::new(if from_alice { 1 } else { 2 })));
        }
        (messages, participants)
    }

    fn detector(
        messages: &[BitSequence],
        participants: Vec<Option<ParticipantId>>,
    ) -> AddressDetector {
        AddressDetector::new(
            DetectorSettings::for_field(FieldType::Address),
            participants,
            Arc::new(SignalMatrix::build(messages)),
            &DetectorConfig::default(),
        )
    }

    #[test]
    fn test_finds_address_block() {
        let (messages, participants) = conversation(8);
        let address = detector(&messages, participants);

        let mut include = IncludeRanges::new(56);
        include.exclude(BitRange::new(0, 16)).unwrap();

        let label = address
            .find_field(&messages, &include, &all_members(&messages))
            .unwrap();
        assert_eq!(label.range, BitRange::new(16, 48));
    }

    #[test]
    fn test_span_widened_to_alignment() {
        // addresses differ only in the low nibble of each byte
        let mut messages = Vec::new();
        let mut participants = Vec::new();
        for seq in 0..6u64 {
            let sender = seq % 2;
            messages.push(message(&[(0xF0, 8), (0x30 | (sender + 1), 8), (seq * 41 % 256, 8)]));
            participants.push(Some(ParticipantId::new(sender as u32)));
        }
        let address = detector(&messages, participants);

        let label = address
            .find_field(&messages, &IncludeRanges::new(24), &all_members(&messages))
            .unwrap();
        assert_eq!(label.range, BitRange::new(8, 16));
    }

    #[test]
    fn test_widening_stops_at_sender_noise() {
        // low nibble varies within each sender, high nibble is the address
        let noise = [0b0001u64, 0b0110, 0b1000, 0b0111, 0b0100, 0b0001];
        let mut messages = Vec::new();
        let mut participants = Vec::new();
        for (seq, &n) in noise.iter().enumerate() {
            let sender = seq as u64 % 2;
            let nibble = if sender == 0 { 0xA } else { 0x5 };
            messages.push(message(&[(n, 4), (nibble, 4), (0x55, 8)]));
            participants.push(Some(ParticipantId::new(sender as u32)));
        }
        let address = detector(&messages, participants);

        let label = address
            .find_field(&messages, &IncludeRanges::new(16), &all_members(&messages))
            .unwrap();
        assert_eq!(label.range, BitRange::new(4, 8));

        let pairs = address.pair_sets(&all_members(&messages)).unwrap();
        for pos in label.start()..label.end() {
            assert!(address.is_consistent(&pairs, pos), "bit {pos} varies within a sender");
        }
    }

    #[test]
    fn test_needs_two_participants() {
        let (messages, _) = conversation(6);
        let single = vec![Some(ParticipantId::new(1)); messages.len()];
        let address = detector(&messages, single);
        assert!(address
            .find_field(&messages, &IncludeRanges::new(56), &all_members(&messages))
            .is_none());
    }

    #[test]
    fn test_unassigned_messages_ignored() {
        let (messages, _) = conversation(4);
        let address = detector(&messages, vec![None; 4]);
        assert!(address
            .find_field(&messages, &IncludeRanges::new(56), &all_members(&messages))
            .is_none());
    }
}
