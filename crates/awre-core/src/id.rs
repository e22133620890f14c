//! Identity types for AWRE
//!
//! Message types and participants are small integer handles. Their meaning
//! (names, addresses) lives with whoever assigned them.

use std::fmt;

/// Message type identity - a partition of messages sharing one format
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MessageTypeId(pub u32);

impl MessageTypeId {
    /// The partition every run starts with
    pub const DEFAULT: MessageTypeId = MessageTypeId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        MessageTypeId(id)
    }
}

impl fmt::Debug for MessageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageType({})", self.0)
    }
}

impl fmt::Display for MessageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Participant identity - the sender a message was attributed to
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    #[inline]
    pub fn new(id: u32) -> Self {
        ParticipantId(id)
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Participant({})", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
