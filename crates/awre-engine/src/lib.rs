//! AWRE Engine - Field discovery over a message corpus
//!
//! This crate implements the discovery pipeline:
//! - Field detectors (one per field type)
//! - Priority slot scheduling with predecessor validation
//! - Include range bookkeeping per message type
//! - The single-pass discovery engine

pub mod config;
pub mod detector;
pub mod engine;
pub mod ranges;
pub mod schedule;

pub use config::*;
pub use detector::*;
pub use engine::*;
pub use ranges::*;
pub use schedule::*;
