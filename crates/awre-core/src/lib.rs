//! AWRE Core - Fundamental types for protocol field discovery
//!
//! This crate defines the core types used throughout AWRE:
//! - Bit sequences and half-open bit ranges
//! - Corpus loading from plain-bits text
//! - Identifiers (MessageTypeId, ParticipantId)
//! - Field types and discovered labels
//! - The shared error type

pub mod bits;
pub mod corpus;
pub mod error;
pub mod field;
pub mod id;
pub mod label;

pub use bits::*;
pub use corpus::*;
pub use error::*;
pub use field::*;
pub use id::*;
pub use label::*;
