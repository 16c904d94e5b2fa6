//! # Domain Models
//!
//! This crate contains pure domain types with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O, no build-time switches, and no heavy logic. It names the optional
//! capabilities and describes configuration, but never decides whether a capability is present;
//! that decision belongs to the `asp` facade alone.

pub mod capabilities;
pub mod config;
pub mod constants;
