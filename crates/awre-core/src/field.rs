//! Field type definitions
//!
//! AWRE knows seven kinds of protocol fields. Each kind has exactly one
//! detector in a discovery engine:
//! - Preamble: alternating bit pattern for receiver clock recovery
//! - Synchronization: fixed word marking the start of a frame
//! - Length: payload or frame length
//! - Address: sender / receiver identity
//! - SequenceNumber: per-message counter
//! - Type: message kind selector
//! - Flags: independent option bits

use std::fmt;

/// Field type tag for labels and detectors
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FieldType {
    Preamble = 0,
    Synchronization = 1,
    Length = 2,
    Address = 3,
    SequenceNumber = 4,
    Type = 5,
    Flags = 6,
}

impl FieldType {
    /// All field types in their default priority order
    pub const ALL: [FieldType; 7] = [
        FieldType::Preamble,
        FieldType::Synchronization,
        FieldType::Length,
        FieldType::Address,
        FieldType::SequenceNumber,
        FieldType::Type,
        FieldType::Flags,
    ];

    /// Human readable name, used as the label name
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Preamble => "Preamble",
            FieldType::Synchronization => "Synchronization",
            FieldType::Length => "Length",
            FieldType::Address => "Address",
            FieldType::SequenceNumber => "Sequence Number",
            FieldType::Type => "Type",
            FieldType::Flags => "Flags",
        }
    }

    /// Does finding this field tell the length detector where to start?
    pub fn ends_sync_region(self) -> bool {
        matches!(self, FieldType::Preamble | FieldType::Synchronization)
    }

    /// Default priority slot
    #[inline]
    pub fn default_priority(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
