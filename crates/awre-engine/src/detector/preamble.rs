//! Preamble detection
//!
//! A preamble is an alternating `1010…` run at the very start of a frame. The
//! most common run length over all members is taken and cut down to the
//! alignment, since a sync word may continue the alternation for a bit or two.

use awre_core::{BitRange, BitSequence, FieldType, Label};

use crate::detector::{member_messages, value_histogram, FieldDetector};
use crate::{DetectorConfig, DetectorSettings, IncludeRanges};

#[derive(Debug)]
pub struct PreambleDetector {
    settings: DetectorSettings,
    min_bits: usize,
    alignment: usize,
}

impl PreambleDetector {
    pub fn new(settings: DetectorSettings, config: &DetectorConfig) -> Self {
        PreambleDetector {
            settings,
            min_bits: config.min_preamble_bits,
            alignment: config.preamble_alignment.max(1),
        }
    }
}

impl FieldDetector for PreambleDetector {
    fn field_type(&self) -> FieldType {
        FieldType::Preamble
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

        let runs: Vec<u64> = member_messages(messages, members)
            .map(|m| alternating_run(m.as_slice(), range) as u64)
            .filter(|&run| run > 0)
            .collect();

        let (&run, _) = value_histogram(&runs)
            .iter()
            .max_by_key(|&(&run, &count)| (count, run))?;

        let len = run as usize - run as usize % self.alignment;
        if len < self.min_bits {
            return None;
        }

        Some(Label::new(
            FieldType::Preamble,
            BitRange::new(range.start, range.start + len),
            0,
        ))
    }
}

/// Number of alternating bits from the start of `range`
fn alternating_run(bits: &[u8], range: BitRange) -> usize {
    let limit = range.end.min(bits.len());
    if range.start >= limit {
        return 0;
    }

    1 + bits[range.start..limit]
        .windows(2)
        .take_while(|pair| pair[0] != pair[1])
        .count()
}
