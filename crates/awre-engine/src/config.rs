//! Discovery configuration

use std::collections::BTreeMap;

use awre_core::FieldType;
use awre_stats::MIN_BLOCKS_PER_CLUSTER;

/// Scheduling attributes of one detector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectorSettings {
    /// Slot request; the scheduler uses `priority mod N`
    pub priority: i64,
    /// Detectors that must run earlier
    pub predecessors: Vec<FieldType>,
    /// Disabled detectors are neither scheduled nor run
    pub enabled: bool,
}

impl DetectorSettings {
    pub fn new(priority: i64, predecessors: Vec<FieldType>) -> Self {
        DetectorSettings {
            priority,
            predecessors,
            enabled: true,
        }
    }

    /// Reference settings for a field type.
    /// Everything after the synchronization word waits for preamble and sync.
    pub fn for_field(kind: FieldType) -> Self {
        let predecessors = match kind {
            FieldType::Preamble => vec![],
            FieldType::Synchronization => vec![FieldType::Preamble],
            _ => vec![FieldType::Preamble, FieldType::Synchronization],
        };
        DetectorSettings::new(kind.default_priority(), predecessors)
    }
}

/// Tunables of the shipped detection heuristics
#[derive(Clone, Debug)]
pub struct DetectorConfig {
    /// Messages needed before a window is judged at all
    pub min_messages: usize,
    /// Shortest accepted preamble
    pub min_preamble_bits: usize,
    /// Preamble length is truncated to a multiple of this
    pub preamble_alignment: usize,
    /// Shortest accepted synchronization word
    pub min_sync_bits: usize,
    /// Longest accepted synchronization word
    pub max_sync_bits: usize,
    /// Sync length is truncated to a multiple of this
    pub sync_alignment: usize,
    /// Candidate length field widths, tried in order
    pub length_field_widths: Vec<usize>,
    /// Address span is widened to multiples of this (relative to its range)
    pub address_alignment: usize,
    /// Candidate sequence number widths, tried in order
    pub sequence_widths: Vec<usize>,
    /// Fraction of consecutive messages that must increment by one
    pub sequence_threshold: f64,
    /// Window step for sequence, type and flags searches
    pub field_step: usize,
    /// Width of type and flags windows
    pub small_field_bits: usize,
    /// Most distinct values a type field may take
    pub max_type_values: usize,
    /// Most bits a flags value may differ from the common value
    pub max_flag_distance: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            min_messages: 2,
            min_preamble_bits: 8,
            preamble_alignment: 4,
            min_sync_bits: 8,
            max_sync_bits: 32,
            sync_alignment: 8,
            length_field_widths: vec![8, 16],
            address_alignment: 8,
            sequence_widths: vec![8, 16],
            sequence_threshold: 0.75,
            field_step: 8,
            small_field_bits: 8,
            max_type_values: 4,
            max_flag_distance: 2,
        }
    }
}

impl DetectorConfig {
    /// Conservative heuristics for noisy captures
    pub fn strict() -> Self {
        DetectorConfig {
            min_messages: 4,
            min_preamble_bits: 16,
            min_sync_bits: 16,
            sequence_threshold: 0.9,
            max_type_values: 3,
            max_flag_distance: 1,
            ..DetectorConfig::default()
        }
    }
}

/// Discovery engine configuration
#[derive(Clone, Debug)]
pub struct DiscoveryConfig {
    /// Lengths with fewer messages are dropped from the length clusters
    pub min_blocks_per_cluster: usize,
    /// Scheduling attributes per field type
    pub settings: BTreeMap<FieldType, DetectorSettings>,
    /// Heuristic tunables
    pub detectors: DetectorConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            min_blocks_per_cluster: MIN_BLOCKS_PER_CLUSTER,
            settings: FieldType::ALL
                .iter()
                .map(|&kind| (kind, DetectorSettings::for_field(kind)))
                .collect(),
            detectors: DetectorConfig::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Configuration with conservative heuristics
    pub fn strict() -> Self {
        DiscoveryConfig {
            detectors: DetectorConfig::strict(),
            ..DiscoveryConfig::default()
        }
    }

    /// Settings for a field type, reference settings when not configured
    pub fn settings_for(&self, kind: FieldType) -> DetectorSettings {
        self.settings
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| DetectorSettings::for_field(kind))
    }

    /// Exclude a detector from scheduling
    pub fn disable(mut self, kind: FieldType) -> Self {
        self.settings
            .entry(kind)
            .or_insert_with(|| DetectorSettings::for_field(kind))
            .enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_settings() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.settings.len(), 7);

        let length = config.settings_for(FieldType::Length);
        assert_eq!(length.priority, 2);
        assert_eq!(
            length.predecessors,
            vec![FieldType::Preamble, FieldType::Synchronization]
        );
        assert!(config.settings_for(FieldType::Preamble).predecessors.is_empty());
    }

    #[test]
    fn test_disable() {
        let config = DiscoveryConfig::default().disable(FieldType::Flags);
        assert!(!config.settings_for(FieldType::Flags).enabled);
        assert!(config.settings_for(FieldType::Type).enabled);
    }

    #[test]
    fn test_strict_is_tighter() {
        let strict = DetectorConfig::strict();
        let default = DetectorConfig::default();
        assert!(strict.sequence_threshold > default.sequence_threshold);
        assert!(strict.min_preamble_bits > default.min_preamble_bits);
    }
}
