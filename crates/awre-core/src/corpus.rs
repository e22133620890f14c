//! Corpus - the captured messages a discovery run works on

use crate::{AwreError, AwreResult, BitSequence, ParticipantId};

/// Ordered messages plus the optional sender of each one
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    messages: Vec<BitSequence>,
    participants: Vec<Option<ParticipantId>>,
}

impl Corpus {
    /// Create a corpus without participant information
    pub fn new(messages: Vec<BitSequence>) -> Self {
        let participants = vec![None; messages.len()];
        Corpus {
            messages,
            participants,
        }
    }

    /// Parse one message per non-empty line of plain bits
    pub fn from_plain_bits(text: &str) -> AwreResult<Self> {
        let messages = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| BitSequence::parse_line(line, i + 1))
            .collect::<AwreResult<Vec<_>>>()?;

        Ok(Corpus::new(messages))
    }

    /// Attach a participant lookup (one entry per message)
    pub fn with_participants(mut self, participants: Vec<Option<ParticipantId>>) -> AwreResult<Self> {
        self.assign_participants(participants)?;
        Ok(self)
    }

    /// Replace the participant lookup
    pub fn assign_participants(&mut self, participants: Vec<Option<ParticipantId>>) -> AwreResult<()> {
        if participants.len() != self.messages.len() {
            return Err(AwreError::ParticipantCountMismatch {
                messages: self.messages.len(),
                participants: participants.len(),
            });
        }
        self.participants = participants;
        Ok(())
    }

    /// Add a message with its sender
    pub fn push(&mut self, message: BitSequence, participant: Option<ParticipantId>) {
        self.messages.push(message);
        self.participants.push(participant);
    }

    pub fn messages(&self) -> &[BitSequence] {
        &self.messages
    }

    pub fn participants(&self) -> &[Option<ParticipantId>] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Length of the longest message in bits
    pub fn max_len(&self) -> usize {
        self.messages.iter().map(BitSequence::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_plain_bits_skips_blank_lines() {
        let corpus = Corpus::from_plain_bits("1010\n\n110011\n").unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.max_len(), 6);
        assert!(corpus.participants().iter().all(Option::is_none));
    }

    #[test]
    fn test_from_plain_bits_reports_line() {
        let err = Corpus::from_plain_bits("1010\n\n10a0").unwrap_err();
        assert_eq!(err, AwreError::InvalidBitString { line: 3, character: 'a' });
    }

    #[test]
    fn test_participant_count_checked() {
        let corpus = Corpus::from_plain_bits("10\n01").unwrap();
        let err = corpus
            .with_participants(vec![Some(ParticipantId::new(1))])
            .unwrap_err();
        assert_eq!(
            err,
            AwreError::ParticipantCountMismatch {
                messages: 2,
                participants: 1
            }
        );
    }
}
