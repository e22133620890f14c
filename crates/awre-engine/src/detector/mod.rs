//! Field detectors
//!
//! Every field type has one detector behind the [`FieldDetector`] trait.
//! A detector looks only at the messages of one message type and only inside
//! the include ranges it is given; it never mutates them. The engine owns all
//! bookkeeping and talks back to detectors through [`DetectorEvent`]s.

mod address;
mod flags;
mod length;
mod preamble;
mod sequence;
mod sync;
mod type_field;

pub use address::AddressDetector;
pub use flags::FlagsDetector;
pub use length::LengthDetector;
pub use preamble::PreambleDetector;
pub use sequence::SequenceNumberDetector;
pub use sync::SynchronizationDetector;
pub use type_field::TypeDetector;

use std::collections::BTreeMap;
use std::fmt;

use awre_core::{BitRange, BitSequence, FieldType, Label};

use crate::{DetectorSettings, IncludeRanges};

/// Notifications the engine sends to detectors during a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorEvent {
    /// A new discovery pass begins
    RunStarted,
    /// A preamble or synchronization label ended at this bit
    SyncEnd(usize),
}

/// One field detection heuristic with its scheduling attributes
pub trait FieldDetector: fmt::Debug {
    /// Field type this detector recognizes
    fn field_type(&self) -> FieldType;

    fn settings(&self) -> &DetectorSettings;

    fn settings_mut(&mut self) -> &mut DetectorSettings;

    /// Search for the field.
    ///
    /// `members` are indices into `messages` belonging to the message type;
    /// only bits inside `include` may be claimed.
    fn find_field(
        &self,
        messages: &[BitSequence],
        include: &IncludeRanges,
        members: &[usize],
    ) -> Option<Label>;

    /// React to an engine event. Detectors ignore events they do not need.
    fn handle_event(&mut self, _event: DetectorEvent) {}

    #[inline]
    fn priority(&self) -> i64 {
        self.settings().priority
    }

    #[inline]
    fn set_priority(&mut self, priority: i64) {
        self.settings_mut().priority = priority;
    }

    #[inline]
    fn predecessors(&self) -> &[FieldType] {
        &self.settings().predecessors
    }

    #[inline]
    fn is_enabled(&self) -> bool {
        self.settings().enabled
    }

    #[inline]
    fn set_enabled(&mut self, enabled: bool) {
        self.settings_mut().enabled = enabled;
    }
}

/// Member messages in member order, skipping stale indices
pub(crate) fn member_messages<'a>(
    messages: &'a [BitSequence],
    members: &'a [usize],
) -> impl Iterator<Item = &'a BitSequence> + 'a {
    members.iter().filter_map(move |&i| messages.get(i))
}

/// Values of `window` in every member long enough to hold it
pub(crate) fn window_values(
    messages: &[BitSequence],
    members: &[usize],
    window: BitRange,
) -> Vec<u64> {
    member_messages(messages, members)
        .filter_map(|m| m.read_value(window))
        .collect()
}

/// Windows of `width` bits starting every `step` bits inside `range`
pub(crate) fn stepped_windows(
    range: BitRange,
    width: usize,
    step: usize,
) -> impl Iterator<Item = BitRange> {
    let step = step.max(1);
    (range.start..range.end)
        .step_by(step)
        .map(move |start| BitRange::new(start, start + width))
        .filter(move |w| width > 0 && w.end <= range.end)
}

/// Occurrence count per value
pub(crate) fn value_histogram(values: &[u64]) -> BTreeMap<u64, usize> {
    let mut histogram = BTreeMap::new();
    for &value in values {
        *histogram.entry(value).or_insert(0) += 1;
    }
    histogram
}

/// Check if every member holding `window` has the same bits there
pub(crate) fn is_constant(messages: &[BitSequence], members: &[usize], window: BitRange) -> bool {
    let values = window_values(messages, members, window);
    values.windows(2).all(|w| w[0] == w[1])
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepped_windows_stay_inside() {
        let windows: Vec<_> = stepped_windows(BitRange::new(4, 28), 8, 8).collect();
        assert_eq!(
            windows,
            vec![BitRange::new(4, 12), BitRange::new(12, 20), BitRange::new(20, 28)]
        );
        assert_eq!(stepped_windows(BitRange::new(0, 7), 8, 8).count(), 0);
    }

    #[test]
    fn test_window_values_skip_short_messages() {
        let messages = vec![
            testing::message(&[(0xAB, 8), (0x01, 8)]),
            testing::message(&[(0xCD, 8)]),
        ];
        let members = testing::all_members(&messages);
        assert_eq!(window_values(&messages, &members, BitRange::new(0, 8)), vec![0xAB, 0xCD]);
        assert_eq!(window_values(&messages, &members, BitRange::new(8, 16)), vec![0x01]);
    }

    #[test]
    fn test_histogram() {
        let histogram = value_histogram(&[3, 1, 3, 3]);
        assert_eq!(histogram.get(&3), Some(&3));
        assert_eq!(histogram.get(&1), Some(&1));
    }
}
