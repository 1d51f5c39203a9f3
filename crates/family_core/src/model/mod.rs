//! Family tree domain model.
//!
//! # Responsibility
//! - Define the person record, its ancestor path and the relation catalog.
//! - Keep everything here pure: no store access, no logging.
//!
//! # Invariants
//! - Every persisted person is identified by a stable `PersonId`.
//! - Persons are never deleted; only `children` and `spouse_id` change.

pub mod person;
pub mod projection;
pub mod relation;
