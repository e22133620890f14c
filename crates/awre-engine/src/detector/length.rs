//! Length field detection
//!
//! Length fields conventionally follow the synchronization word, so the
//! search starts where the last preamble/sync label ended (delivered through
//! [`DetectorEvent::SyncEnd`]). Within one length cluster a length field is
//! constant; across clusters it tracks the message length in bytes.

use std::sync::Arc;

use awre_core::{BitRange, BitSequence, FieldType, Label};
use awre_stats::LengthClusters;
use tracing::trace;

use crate::detector::{member_messages, DetectorEvent, FieldDetector};
use crate::{DetectorConfig, DetectorSettings, IncludeRanges};

#[derive(Debug)]
pub struct LengthDetector {
    settings: DetectorSettings,
    clusters: Arc<LengthClusters>,
    widths: Vec<usize>,
    sync_end: Option<usize>,
}

impl LengthDetector {
    pub fn new(
        settings: DetectorSettings,
        clusters: Arc<LengthClusters>,
        config: &DetectorConfig,
    ) -> Self {
        LengthDetector {
            settings,
            clusters,
            widths: config.length_field_widths.clone(),
            sync_end: None,
        }
    }

    /// Where the synchronization region ended, if known
    pub fn sync_end(&self) -> Option<usize> {
        self.sync_end
    }

    /// Check `window` against every cluster that has member messages.
    fn is_length_window(
        &self,
        messages: &[BitSequence],
        members: &[usize],
        window: BitRange,
    ) -> bool {
        // (message length in bytes, field value) per cluster
        let mut observations: Vec<(i64, i64)> = Vec::new();

        for (&len, group) in self.clusters.iter() {
            let Some(sample) = member_messages(messages, members).find(|m| m.len() == len) else {
                continue;
            };
            if !group.is_stable(window) {
                return false;
            }
            let Some(value) = sample.read_value(window) else {
                return false;
            };
            observations.push(((len / 8) as i64, value as i64));
        }

        match observations.as_slice() {
            [] => false,
            [(len_bytes, value)] => *value > 0 && value <= len_bytes,
            [(first_len, first_value), rest @ ..] => {
                let offset = first_len - first_value;
                rest.iter().all(|(len, value)| len - value == offset)
            }
        }
    }
}

impl FieldDetector for LengthDetector {
    fn field_type(&self) -> FieldType {
        FieldType::Length
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
        let start = match self.sync_end {
            Some(end) => end,
            None => include.first()?.start,
        };
        let range = include.containing(start)?;

        self.widths
            .iter()
            .map(|&width| BitRange::new(start, start + width))
            .filter(|window| range.contains_range(window))
            .find(|&window| {
                let hit = self.is_length_window(messages, members, window);
                trace!(%window, hit, "length candidate");
                hit
            })
            .map(|window| Label::new(FieldType::Length, window, 0))
    }

    fn handle_event(&mut self, event: DetectorEvent) {
        match event {
            DetectorEvent::RunStarted => self.sync_end = None,
            DetectorEvent::SyncEnd(end) => self.sync_end = Some(end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::testing::{all_members, message};

    fn detector(messages: &[BitSequence]) -> LengthDetector {
        LengthDetector::new(
            DetectorSettings::for_field(FieldType::Length),
            Arc::new(LengthClusters::new(messages)),
            &DetectorConfig::default(),
        )
    }

    #[test]
    fn test_sync_end_event() {
        let mut length = detector(&[]);
        assert_eq!(length.sync_end(), None);

        length.handle_event(DetectorEvent::SyncEnd(32));
        assert_eq!(length.sync_end(), Some(32));

        length.handle_event(DetectorEvent::SyncEnd(64));
        assert_eq!(length.sync_end(), Some(64));

        length.handle_event(DetectorEvent::RunStarted);
        assert_eq!(length.sync_end(), None);
    }

    #[test]
    fn test_single_cluster() {
        // 16 bit sync, length byte = 3 payload bytes, 3 varying payload bytes
        let messages: Vec<_> = (0..4)
            .map(|i| message(&[(0x2DD4, 16), (3, 8), (i * 0x010203, 24)]))
            .collect();
        let mut length = detector(&messages);
        length.handle_event(DetectorEvent::SyncEnd(16));

        let mut include = IncludeRanges::new(48);
        include.exclude(BitRange::new(0, 16)).unwrap();

        let label = length
            .find_field(&messages, &include, &all_members(&messages))
            .unwrap();
        assert_eq!(label.range, BitRange::new(16, 24));
    }

    #[test]
    fn test_tracks_length_across_clusters() {
        let mut messages = Vec::new();
        for payload_bytes in [2u64, 4] {
            for i in 0..3u64 {
                let mut chunks = vec![(0x2DD4, 16), (payload_bytes, 8)];
                chunks.extend((0..payload_bytes).map(|b| ((i + b) * 17 % 256, 8)));
                messages.push(message(&chunks));
            }
        }
        let mut length = detector(&messages);
        length.handle_event(DetectorEvent::SyncEnd(16));

        let mut include = IncludeRanges::new(56);
        include.exclude(BitRange::new(0, 16)).unwrap();

        let label = length
            .find_field(&messages, &include, &all_members(&messages))
            .unwrap();
        assert_eq!(label.range, BitRange::new(16, 24));
    }

    #[test]
    fn test_inconsistent_across_clusters() {
        // same value for different lengths is no length field
        let mut messages = Vec::new();
        for payload_bytes in [2u64, 4] {
            for i in 0..2u64 {
                let mut chunks = vec![(0x2DD4, 16), (7, 8)];
                chunks.extend((0..payload_bytes).map(|b| ((i + b) * 31 % 256, 8)));
                messages.push(message(&chunks));
            }
        }
        let mut length = detector(&messages);
        length.handle_event(DetectorEvent::SyncEnd(16));

        let mut include = IncludeRanges::new(56);
        include.exclude(BitRange::new(0, 16)).unwrap();
        assert!(length
            .find_field(&messages, &include, &all_members(&messages))
            .is_none());
    }

    #[test]
    fn test_sync_end_outside_include_ranges() {
        let messages: Vec<_> = (0..2).map(|_| message(&[(0x2DD4, 16), (2, 8)])).collect();
        let mut length = detector(&messages);
        length.handle_event(DetectorEvent::SyncEnd(8));

        let mut include = IncludeRanges::new(24);
        include.exclude(BitRange::new(0, 16)).unwrap();
        assert!(length
            .find_field(&messages, &include, &all_members(&messages))
            .is_none());
    }
}
