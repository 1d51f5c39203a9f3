//! Record store contracts and implementations.
//!
//! # Responsibility
//! - Define the person store contract used by the relationship engine.
//! - Provide an in-memory store (default) and a SQLite store.
//!
//! # Invariants
//! - Store writes enforce `Person::validate()` before persistence.
//! - Store APIs return semantic errors (`NotFound`, `MissingId`) in addition
//!   to transport errors.

pub mod memory_repo;
pub mod person_repo;
