//! Error types for AWRE

use thiserror::Error;

use crate::{BitRange, FieldType, MessageTypeId};

/// Core AWRE errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AwreError {
    // Scheduling errors
    #[error("Duplicate priority: {detector} has priority {priority} which maps to occupied slot {slot}")]
    DuplicatePriority {
        detector: FieldType,
        priority: i64,
        slot: usize,
    },

    #[error("Detector {detector} comes before its predecessor {predecessor}")]
    InvalidPredecessorOrder {
        detector: FieldType,
        predecessor: FieldType,
    },

    // Range bookkeeping errors
    #[error("Label {range} does not lie inside any include range of message type {message_type}")]
    MissingOverlap {
        message_type: MessageTypeId,
        range: BitRange,
    },

    // Corpus errors
    #[error("Corpus contains no messages")]
    EmptyCorpus,

    #[error("Invalid character {character:?} in bit string on line {line}")]
    InvalidBitString { line: usize, character: char },

    #[error("Participant lookup covers {participants} messages, corpus has {messages}")]
    ParticipantCountMismatch { messages: usize, participants: usize },
}

/// Result type for AWRE operations
pub type AwreResult<T> = Result<T, AwreError>;
