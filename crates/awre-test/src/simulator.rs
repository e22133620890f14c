//! Synthetic frame simulator
//!
//! Generates captures of a small framed protocol whose layout is known, so
//! discovery results can be checked against ground truth:
//!
//! ```text
//! | preamble 32 | sync 32 | length 8 | dst 16 | src 16 | seq 8 | type 8 | flags 8 | payload |
//! ```
//!
//! The length byte counts payload bytes. Two stations take turns sending
//! unless participants are switched off, in which case every frame is a
//! beacon from the first station.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use awre_core::{BitRange, BitSequence, Corpus, FieldType, Label, ParticipantId};

/// Alternating preamble bytes
pub const PREAMBLE: [u8; 4] = [0xAA; 4];

/// Sync word; starts with a 0 bit so the preamble alternation stops at byte 4
pub const SYNC_WORD: [u8; 4] = [0x2D, 0xD4, 0x2D, 0xD4];

/// Message type values, each used for two consecutive frames
pub const TYPE_VALUES: [u8; 3] = [0x01, 0x02, 0x03];

/// Flag combinations: ack bit and urgent bit
pub const FLAG_VALUES: [u8; 4] = [0x00, 0x01, 0x80, 0x81];

/// Simulator configuration
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    /// Number of frames in a capture
    pub message_count: usize,
    /// Payload sizes in bytes, cycled over frames. Capped at 255.
    pub payload_lengths: Vec<usize>,
    /// Station addresses
    pub addresses: [u16; 2],
    /// Attribute frames to senders and let both stations send
    pub with_participants: bool,
    /// RNG seed
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            message_count: 24,
            payload_lengths: vec![4],
            addresses: [0xA1A1, 0x5E5E],
            with_participants: true,
            seed: 0x5EED,
        }
    }
}

impl SimulatorConfig {
    /// Two payload sizes, so the capture has two length clusters
    pub fn mixed_lengths() -> Self {
        SimulatorConfig {
            payload_lengths: vec![2, 6],
            ..Self::default()
        }
    }

    /// Single station, no sender attribution
    pub fn beacon() -> Self {
        SimulatorConfig {
            with_participants: false,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_message_count(mut self, count: usize) -> Self {
        self.message_count = count;
        self
    }
}

/// One generated frame
#[derive(Clone, Debug)]
pub struct SimulatedFrame {
    /// Frame bytes, MSB first on the wire
    pub bytes: Vec<u8>,
    /// Sending station
    pub sender: ParticipantId,
}

impl SimulatedFrame {
    pub fn bits(&self) -> BitSequence {
        BitSequence::from_bytes(&self.bytes)
    }
}

/// Seeded generator of synthetic captures
pub struct ProtocolSimulator {
    config: SimulatorConfig,
    rng: StdRng,
    /// Next sequence number
    seq: u8,
    /// Frames generated so far
    emitted: usize,
}

impl ProtocolSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let seq = rng.gen();
        ProtocolSimulator {
            config,
            rng,
            seq,
            emitted: 0,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Generate the next frame
    pub fn next_frame(&mut self) -> SimulatedFrame {
        let index = self.emitted;
        self.emitted += 1;

        let requested = if self.config.payload_lengths.is_empty() {
            0
        } else {
            self.config.payload_lengths[index % self.config.payload_lengths.len()]
        };
        // the length field is one byte
        let length_byte = u8::try_from(requested).unwrap_or(u8::MAX);
        let payload_len = usize::from(length_byte);
        let sender = if self.config.with_participants { index % 2 } else { 0 };
        let src = self.config.addresses[sender];
        let dst = self.config.addresses[1 - sender];

        let mut bytes = Vec::with_capacity(16 + payload_len);
        bytes.extend_from_slice(&PREAMBLE);
        bytes.extend_from_slice(&SYNC_WORD);
        bytes.push(length_byte);
        bytes.extend_from_slice(&dst.to_be_bytes());
        bytes.extend_from_slice(&src.to_be_bytes());
        bytes.push(self.seq);
        bytes.push(TYPE_VALUES[(index / 2) % TYPE_VALUES.len()]);
        bytes.push(FLAG_VALUES[self.rng.gen_range(0..FLAG_VALUES.len())]);
        bytes.extend((0..payload_len).map(|_| self.rng.gen::<u8>()));

        self.seq = self.seq.wrapping_add(1);

        SimulatedFrame {
            bytes,
            sender: ParticipantId::new(sender as u32),
        }
    }

    /// Generate a full capture
    pub fn corpus(&mut self) -> Corpus {
        let mut corpus = Corpus::default();
        for _ in 0..self.config.message_count {
            let frame = self.next_frame();
            let sender = self.config.with_participants.then_some(frame.sender);
            corpus.push(frame.bits(), sender);
        }
        corpus
    }

    /// Labels discovery should produce for this layout, in discovery order
    pub fn ground_truth(&self) -> Vec<Label> {
        let mut layout = vec![
            (FieldType::Preamble, 0, 32),
            (FieldType::Synchronization, 32, 64),
            (FieldType::Length, 64, 72),
        ];
        // a lone station has nothing to tell its address apart from
        if self.config.with_participants {
            layout.push((FieldType::Address, 72, 104));
        }
        layout.extend([
            (FieldType::SequenceNumber, 104, 112),
            (FieldType::Type, 112, 120),
            (FieldType::Flags, 120, 128),
        ]);

        layout
            .into_iter()
            .enumerate()
            .map(|(color, (kind, start, end))| Label::new(kind, BitRange::new(start, end), color))
            .collect()
    }
}
