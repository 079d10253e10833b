//! Record store layer.
//!
//! # Responsibility
//! - Define the persistence contract for the record collection.
//! - Keep CSV details inside the store boundary.
//!
//! # Invariants
//! - No two records share an id after a merge.
//! - There is no delete or update path.

pub mod record_store;
