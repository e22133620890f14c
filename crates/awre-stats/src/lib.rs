//! AWRE Stats - Statistical preprocessing for field discovery
//!
//! Both products are pure functions of the message corpus and are computed
//! once before a discovery run:
//! - Length clusters with per-bit stability scores
//! - Pairwise XOR signal matrix

pub mod cluster;
pub mod signal;

pub use cluster::*;
pub use signal::*;
