//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into family tree use-cases.
//! - Host the relationship engine on top of the store contract.
//!
//! # Invariants
//! - Services never bypass store validation/persistence contracts.
//! - Services stay storage-agnostic (`R: PersonRepository`).

pub mod family_service;
mod relation_query;
