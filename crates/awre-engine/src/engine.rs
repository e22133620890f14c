//! Discovery engine - one pass of field discovery over a corpus
//!
//! The statistics are computed once when the engine is built. A run then
//! visits every scheduled detector once per message type, records what it
//! finds and cuts the found bits out of that message type's include ranges.
//! There is no fixed-point iteration: earlier detectors never see the
//! results of later ones.

use std::collections::BTreeMap;
use std::sync::Arc;

use awre_core::{AwreError, AwreResult, Corpus, FieldType, Label, MessageTypeId};
use awre_stats::{LengthClusters, SignalMatrix};
use tracing::{debug, info};

use crate::{
    AddressDetector, DetectorEvent, DetectorScheduler, DiscoveryConfig, FieldDetector,
    FlagsDetector, IncludeRanges, LengthDetector, PreambleDetector, PrioritySlotScheduler,
    SequenceNumberDetector, SynchronizationDetector, TypeDetector,
};

/// Discovered labels per message type
pub type DiscoveryResult = BTreeMap<MessageTypeId, Vec<Label>>;

/// Messages of one message type and the bits still unassigned there
#[derive(Debug)]
struct Partition {
    members: Vec<usize>,
    include: IncludeRanges,
}

/// Field discovery engine
#[derive(Debug)]
pub struct DiscoveryEngine {
    /// Messages and participants
    corpus: Corpus,
    /// Per-length bit stability
    clusters: Arc<LengthClusters>,
    /// Pairwise XOR signals
    matrix: Arc<SignalMatrix>,
    /// One detector per field type
    detectors: Vec<Box<dyn FieldDetector>>,
    /// Execution order policy
    scheduler: Box<dyn DetectorScheduler>,
}

impl DiscoveryEngine {
    /// Create an engine with the default configuration
    pub fn new(corpus: Corpus) -> Self {
        Self::with_config(corpus, DiscoveryConfig::default())
    }

    /// Create an engine with a custom configuration
    pub fn with_config(corpus: Corpus, config: DiscoveryConfig) -> Self {
        let clusters = Arc::new(LengthClusters::build(
            corpus.messages(),
            config.min_blocks_per_cluster,
        ));
        let matrix = Arc::new(SignalMatrix::build(corpus.messages()));
        let tunables = &config.detectors;

        let detectors: Vec<Box<dyn FieldDetector>> = vec![
            Box::new(PreambleDetector::new(
                config.settings_for(FieldType::Preamble),
                tunables,
            )),
            Box::new(SynchronizationDetector::new(
                config.settings_for(FieldType::Synchronization),
                tunables,
            )),
            Box::new(LengthDetector::new(
                config.settings_for(FieldType::Length),
                Arc::clone(&clusters),
                tunables,
            )),
            Box::new(AddressDetector::new(
                config.settings_for(FieldType::Address),
                corpus.participants().to_vec(),
                Arc::clone(&matrix),
                tunables,
            )),
            Box::new(SequenceNumberDetector::new(
                config.settings_for(FieldType::SequenceNumber),
                tunables,
            )),
            Box::new(TypeDetector::new(config.settings_for(FieldType::Type), tunables)),
            Box::new(FlagsDetector::new(config.settings_for(FieldType::Flags), tunables)),
        ];

        DiscoveryEngine {
            corpus,
            clusters,
            matrix,
            detectors,
            scheduler: Box::new(PrioritySlotScheduler),
        }
    }

    /// Replace the scheduling policy
    pub fn with_scheduler(mut self, scheduler: impl DetectorScheduler + 'static) -> Self {
        self.scheduler = Box::new(scheduler);
        self
    }

    /// Install a detector, replacing the one with the same field type.
    /// Returns the replaced detector.
    pub fn register(&mut self, detector: Box<dyn FieldDetector>) -> Option<Box<dyn FieldDetector>> {
        let kind = detector.field_type();
        match self.detectors.iter().position(|d| d.field_type() == kind) {
            Some(index) => Some(std::mem::replace(&mut self.detectors[index], detector)),
            None => {
                self.detectors.push(detector);
                None
            }
        }
    }

    /// Messages and participants the engine was built on
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Length clusters computed at construction
    pub fn length_clusters(&self) -> &LengthClusters {
        &self.clusters
    }

    /// Pairwise XOR signals computed at construction
    pub fn signal_matrix(&self) -> &SignalMatrix {
        &self.matrix
    }

    /// Get the detector for a field type
    pub fn detector(&self, kind: FieldType) -> Option<&(dyn FieldDetector + 'static)> {
        self.detectors
            .iter()
            .find(|d| d.field_type() == kind)
            .map(|d| &**d)
    }

    /// Get the detector for a field type, e.g. to change its priority
    pub fn detector_mut(&mut self, kind: FieldType) -> Option<&mut (dyn FieldDetector + 'static)> {
        self.detectors
            .iter_mut()
            .find(|d| d.field_type() == kind)
            .map(|d| &mut **d)
    }

    /// Execution order of the enabled detectors
    pub fn build_schedule(&self) -> AwreResult<Vec<FieldType>> {
        let order = self.scheduler.order(&self.detectors)?;
        Ok(order
            .into_iter()
            .map(|i| self.detectors[i].field_type())
            .collect())
    }

    /// Run one discovery pass
    pub fn run(&mut self) -> AwreResult<DiscoveryResult> {
        if self.corpus.is_empty() {
            return Err(AwreError::EmptyCorpus);
        }

        let order = self.scheduler.order(&self.detectors)?;
        self.broadcast(DetectorEvent::RunStarted);

        let max_len = self.corpus.max_len();
        let mut partitions: BTreeMap<MessageTypeId, Partition> = BTreeMap::new();
        partitions.insert(
            MessageTypeId::DEFAULT,
            Partition {
                members: (0..self.corpus.len()).collect(),
                include: IncludeRanges::new(max_len),
            },
        );
        // TODO: split partitions when an address field implies several formats
        let mut result: DiscoveryResult = BTreeMap::new();
        result.insert(MessageTypeId::DEFAULT, Vec::new());

        for index in order {
            let kind = self.detectors[index].field_type();

            for (&message_type, partition) in partitions.iter_mut() {
                let found = self.detectors[index].find_field(
                    self.corpus.messages(),
                    &partition.include,
                    &partition.members,
                );
                let Some(label) = found else {
                    debug!(detector = %kind, %message_type, "no field found");
                    continue;
                };

                let labels = result.entry(message_type).or_default();
                let label = label.with_color(labels.len());

                let split = partition
                    .include
                    .exclude(label.range)
                    .ok_or(AwreError::MissingOverlap {
                        message_type,
                        range: label.range,
                    })?;
                debug!(
                    %message_type,
                    %label,
                    from = %split,
                    remaining = partition.include.unassigned_bits(),
                    "field found"
                );
                labels.push(label);

                if kind.ends_sync_region() {
                    self.notify(FieldType::Length, DetectorEvent::SyncEnd(label.end()));
                }
            }
        }

        info!(
            message_types = result.len(),
            labels = result.values().map(Vec::len).sum::<usize>(),
            messages = self.corpus.len(),
            "discovery pass complete"
        );

        Ok(result)
    }

    /// Deliver an event to the detectors of one field type
    fn notify(&mut self, kind: FieldType, event: DetectorEvent) {
        for detector in self.detectors.iter_mut().filter(|d| d.field_type() == kind) {
            detector.handle_event(event);
        }
    }

    fn broadcast(&mut self, event: DetectorEvent) {
        for detector in self.detectors.iter_mut() {
            detector.handle_event(event);
        }
    }
}
