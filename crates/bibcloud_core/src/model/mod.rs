//! Domain model shared by every pipeline stage.
//!
//! # Responsibility
//! - Define the record shape persisted by the store and produced by import.
//! - Define the term frequency mapping consumed by rendering.
//!
//! # Invariants
//! - Every record is identified by a non-empty `RecordId`.
//! - Frequency counts are non-negative and never stored as zero.

pub mod frequency;
pub mod record;
