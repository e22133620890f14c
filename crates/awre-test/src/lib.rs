//! AWRE Test Harness - synthetic corpora and end-to-end discovery checks
//!
//! This crate provides:
//! - A seeded frame simulator with known ground truth
//! - End-to-end discovery scenarios

pub mod integration;
pub mod simulator;

pub use integration::*;
pub use simulator::*;
