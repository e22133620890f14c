//! Sequence number detection
//!
//! A counter increments by one from each message to the next (modulo its
//! width). Leading bytes that never change are trimmed off: with few
//! messages the high byte of a 16 bit counter cannot be told apart from a
//! constant neighbour.

use awre_core::{BitRange, BitSequence, FieldType, Label};

use crate::detector::{is_constant, stepped_windows, window_values, FieldDetector};
use crate::{DetectorConfig, DetectorSettings, IncludeRanges};

#[derive(Debug)]
pub struct SequenceNumberDetector {
    settings: DetectorSettings,
    widths: Vec<usize>,
    threshold: f64,
    step: usize,
    min_messages: usize,
}

impl SequenceNumberDetector {
    pub fn new(settings: DetectorSettings, config: &DetectorConfig) -> Self {
        let mut widths = config.sequence_widths.clone();
        widths.sort_unstable();
        SequenceNumberDetector {
            settings,
            widths,
            threshold: config.sequence_threshold,
            step: config.field_step.max(1),
            min_messages: config.min_messages.max(2),
        }
    }

    /// Fraction of consecutive values that increment by one
    fn increment_ratio(values: &[u64], width: usize) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        let hits = values
            .windows(2)
            .filter(|pair| pair[1] == pair[0].wrapping_add(1) & mask)
            .count();
        hits as f64 / (values.len() - 1) as f64
    }

    fn trim_constant_prefix(
        &self,
        messages: &[BitSequence],
        members: &[usize],
        mut window: BitRange,
    ) -> BitRange {
        while window.len() > self.step
            && is_constant(
                messages,
                members,
                BitRange::new(window.start, window.start + self.step),
            )
        {
            window.start += self.step;
        }
        window
    }
}

impl FieldDetector for SequenceNumberDetector {
    fn field_type(&self) -> FieldType {
        FieldType::SequenceNumber
    }

    fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut DetectorSettings {
        &mut self.settings
    }

    fn find_field(
        &self,
        messages: &[BitSequence],
        include: &IncludeRanges,
        members: &[usize],
    ) -> Option<Label> {
        for range in include.iter() {
            for start in stepped_windows(range, self.step, self.step).map(|w| w.start) {
                for &width in &self.widths {
                    let window = BitRange::new(start, start + width);
                    if !range.contains_range(&window) {
                        continue;
                    }

                    let values = window_values(messages, members, window);
                    if values.len() < self.min_messages {
                        continue;
                    }
                    if Self::increment_ratio(&values, width) >= self.threshold {
                        let window = self.trim_constant_prefix(messages, members, window);
                        return Some(Label::new(FieldType::SequenceNumber, window, 0));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::testing::{all_members, message};

    fn detector() -> SequenceNumberDetector {
        SequenceNumberDetector::new(
            DetectorSettings::for_field(FieldType::SequenceNumber),
            &DetectorConfig::default(),
        )
    }

    #[test]
    fn test_increment_ratio() {
        assert_eq!(SequenceNumberDetector::increment_ratio(&[1, 2, 3, 4], 8), 1.0);
        assert_eq!(SequenceNumberDetector::increment_ratio(&[254, 255, 0], 8), 1.0);
        assert_eq!(SequenceNumberDetector::increment_ratio(&[1, 2, 9], 8), 0.5);
        assert_eq!(SequenceNumberDetector::increment_ratio(&[1], 8), 0.0);
    }

    #[test]
    fn test_finds_counter_after_random_byte() {
        let messages: Vec<_> = (0..10u64)
            .map(|seq| message(&[(seq * 73 % 256, 8), (seq + 40, 8), (0x55, 8)]))
            .collect();
        let label = detector()
            .find_field(&messages, &IncludeRanges::new(24), &all_members(&messages))
            .unwrap();
        assert_eq!(label.range, BitRange::new(8, 16));
    }

    #[test]
    fn test_constant_high_byte_trimmed() {
        let messages: Vec<_> = (0..6u64)
            .map(|seq| message(&[(0x12, 8), (0x00, 8), (seq + 10, 8)]))
            .collect();
        let label = detector()
            .find_field(&messages, &IncludeRanges::new(24), &all_members(&messages))
            .unwrap();
        assert_eq!(label.range, BitRange::new(16, 24));
    }

    #[test]
    fn test_tolerates_missing_messages() {
        let mut seqs: Vec<u64> = (0..12).collect();
        seqs.remove(5);
        let messages: Vec<_> = seqs.iter().map(|&s| message(&[(s, 8)])).collect();
        let label = detector()
            .find_field(&messages, &IncludeRanges::new(8), &all_members(&messages))
            .unwrap();
        assert_eq!(label.range, BitRange::new(0, 8));
    }

    #[test]
    fn test_no_counter() {
        let messages: Vec<_> = (0..8u64).map(|i| message(&[(i * 97 % 256, 8)])).collect();
        assert!(detector()
            .find_field(&messages, &IncludeRanges::new(8), &all_members(&messages))
            .is_none());
    }
}
