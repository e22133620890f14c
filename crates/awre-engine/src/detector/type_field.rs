//! Message type field detection
//!
//! A type field takes a handful of values, each of them repeatedly.

use awre_core::{BitRange, BitSequence, FieldType, Label};

use crate::detector::{stepped_windows, value_histogram, window_values, FieldDetector};
use crate::{DetectorConfig, DetectorSettings, IncludeRanges};

#[derive(Debug)]
pub struct TypeDetector {
    settings: DetectorSettings,
    width: usize,
    step: usize,
    max_values: usize,
    min_messages: usize,
}

impl TypeDetector {
    pub fn new(settings: DetectorSettings, config: &DetectorConfig) -> Self {
        TypeDetector {
            settings,
            width: config.small_field_bits,
            step: config.field_step.max(1),
            max_values: config.max_type_values,
            min_messages: config.min_messages,
        }
    }

    fn is_type_window(&self, values: &[u64]) -> bool {
        if values.len() < self.min_messages {
            return false;
        }
        let histogram = value_histogram(values);
        (2..=self.max_values).contains(&histogram.len()) && histogram.values().all(|&n| n >= 2)
    }
}

impl FieldDetector for TypeDetector {
    fn field_type(&self) -> FieldType {
        FieldType::Type
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
            .find(|&window| self.is_type_window(&window_values(messages, members, window)))
            .map(|window: BitRange| Label::new(FieldType::Type, window, 0))
    }
}
