//! Synchronization word detection
//!
//! The sync word is the stretch right after the preamble on which every
//! member agrees. Fields after it may be constant too, so the run is capped
//! at the longest plausible sync word and cut to the alignment.

use awre_core::{BitRange, BitSequence, FieldType, Label};

use crate::detector::{member_messages, FieldDetector};
use crate::{DetectorConfig, DetectorSettings, IncludeRanges};

#[derive(Debug)]
pub struct SynchronizationDetector {
    settings: DetectorSettings,
    min_messages: usize,
    min_bits: usize,
    max_bits: usize,
    alignment: usize,
}

impl SynchronizationDetector {
    pub fn new(settings: DetectorSettings, config: &DetectorConfig) -> Self {
        SynchronizationDetector {
            settings,
            min_messages: config.min_messages,
            min_bits: config.min_sync_bits,
            max_bits: config.max_sync_bits,
            alignment: config.sync_alignment.max(1),
        }
    }
}

impl FieldDetector for SynchronizationDetector {
    fn field_type(&self) -> FieldType {
        FieldType::Synchronization
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
        let range = include.first()?;

        let candidates: Vec<&BitSequence> = member_messages(messages, members)
            .filter(|m| m.len() >= range.start + self.min_bits)
            .collect();
        if candidates.len() < self.min_messages.max(1) {
            return None;
        }

        let shortest = candidates.iter().map(|m| m.len()).min()?;
        let limit = range.end.min(shortest).min(range.start + self.max_bits);

        let reference = candidates[0].as_slice();
        let run = (range.start..limit)
            .take_while(|&pos| candidates.iter().all(|m| m.bit(pos) == Some(reference[pos])))
            .count();

        let len = run - run % self.alignment;
        if len < self.min_bits {
            return None;
        }

        Some(Label::new(
            FieldType::Synchronization,
            BitRange::new(range.start, range.start + len),
            0,
        ))
    }
}
