//! Flags field detection
//!
//! Flags toggle single bits, so every observed value stays within a small
//! Hamming distance of the most common one.

use std::cmp::Reverse;

use awre_core::{BitSequence, FieldType, Label};

use crate::detector::{stepped_windows, value_histogram, window_values, FieldDetector};
use crate::{DetectorConfig, DetectorSettings, IncludeRanges};

#[derive(Debug)]
pub struct FlagsDetector {
    settings: DetectorSettings,
    width: usize,
    step: usize,
    max_distance: u32,
    min_messages: usize,
}

impl FlagsDetector {
    pub fn new(settings: DetectorSettings, config: &DetectorConfig) -> Self {
        FlagsDetector {
            settings,
            width: config.small_field_bits,
            step: config.field_step.max(1),
            max_distance: config.max_flag_distance,
            min_messages: config.min_messages,
        }
    }

    fn is_flags_window(&self, values: &[u64]) -> bool {
        if values.len() < self.min_messages {
            return false;
        }
        let histogram = value_histogram(values);
        if histogram.len() < 2 {
            return false;
        }

        // most common value, ties go to the smaller one
        let Some((&common, _)) = histogram
            .iter()
            .max_by_key(|&(&value, &count)| (count, Reverse(value)))
        else {
            return false;
        };
        histogram
            .keys()
            .all(|&value| (value ^ common).count_ones() <= self.max_distance)
    }
}

impl FieldDetector for FlagsDetector {
    fn field_type(&self) -> FieldType {
        FieldType::Flags
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
        include
            .iter()
            .flat_map(|range| stepped_windows(range, self.width, self.step))
            .find(|&window| self.is_flags_window(&window_values(messages, members, window)))
            .map(|window| Label::new(FieldType::Flags, window, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::testing::{all_members, message};
    use awre_core::BitRange;

    fn detector() -> FlagsDetector {
        FlagsDetector::new(
            DetectorSettings::for_field(FieldType::Flags),
            &DetectorConfig::default(),
        )
    }

    #[test]
    fn test_finds_flags_byte() {
        let flags = [0x00u64, 0x01, 0x00, 0x80, 0x81, 0x00];
        let messages: Vec<_> = flags
            .iter()
            .enumerate()
            .map(|(i, &f)| message(&[(i as u64 * 0x5B % 256, 8), (f, 8)]))
            .collect();
        let label = detector()
            .find_field(&messages, &IncludeRanges::new(16), &all_members(&messages))
            .unwrap();
        assert_eq!(label.range, BitRange::new(8, 16));
    }

    #[test]
    fn test_distant_values_rejected() {
        let messages: Vec<_> = [0x00u64, 0xFF, 0x00]
            .iter()
            .map(|&f| message(&[(f, 8)]))
            .collect();
        assert!(detector()
            .find_field(&messages, &IncludeRanges::new(8), &all_members(&messages))
            .is_none());
    }
}
