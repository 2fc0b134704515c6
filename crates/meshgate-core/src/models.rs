//! Domain models for meshgate.
//!
//! These are the core types shared across all crates.

pub mod account;
pub mod activity;
pub mod group;
pub mod peer;
