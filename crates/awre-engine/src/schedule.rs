//! Detector scheduling
//!
//! The reference scheduler treats priorities as slots in a dense array: with
//! N enabled detectors, a detector with priority `p` runs at position
//! `p mod N`. Two detectors on the same slot are rejected, as is any detector
//! placed before one of its predecessors. No reordering is attempted.
//!
//! Adding or removing a detector moves every slot. Callers that need a
//! different policy can plug in their own [`DetectorScheduler`].

use awre_core::{AwreError, AwreResult};
use tracing::debug;

use crate::FieldDetector;

/// Produces the execution order of detectors
pub trait DetectorScheduler: std::fmt::Debug {
    /// Indices into `detectors` in execution order. Disabled detectors are left out.
    fn order(&self, detectors: &[Box<dyn FieldDetector>]) -> AwreResult<Vec<usize>>;
}

/// Priority-as-slot scheduler
#[derive(Clone, Copy, Debug, Default)]
pub struct PrioritySlotScheduler;

impl DetectorScheduler for PrioritySlotScheduler {
    fn order(&self, detectors: &[Box<dyn FieldDetector>]) -> AwreResult<Vec<usize>> {
        let enabled: Vec<usize> = detectors
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_enabled())
            .map(|(i, _)| i)
            .collect();

        let n = enabled.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut slots: Vec<Option<usize>> = vec![None; n];
        for &i in &enabled {
            let detector = &detectors[i];
            let priority = detector.priority();
            let slot = priority.rem_euclid(n as i64) as usize;

            if slots[slot].is_some() {
                return Err(AwreError::DuplicatePriority {
                    detector: detector.field_type(),
                    priority,
                    slot,
                });
            }
            slots[slot] = Some(i);
        }

        // n distinct slots for n detectors: every slot is taken
        let order: Vec<usize> = slots.into_iter().flatten().collect();

        for (position, &i) in order.iter().enumerate() {
            let detector = &detectors[i];
            for &predecessor in detector.predecessors() {
                let placed = order
                    .iter()
                    .position(|&j| detectors[j].field_type() == predecessor);
                if matches!(placed, Some(p) if p > position) {
                    return Err(AwreError::InvalidPredecessorOrder {
                        detector: detector.field_type(),
                        predecessor,
                    });
                }
            }
        }

        debug!(
            order = ?order.iter().map(|&i| detectors[i].field_type()).collect::<Vec<_>>(),
            "detector schedule built"
        );

        Ok(order)
    }
}
