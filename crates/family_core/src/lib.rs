//! Core domain logic for the family tree relationship engine.
//! This crate is the single source of truth for lineage invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::person::{
    AncestorPath, Gender, LineageError, ParentPair, Person, PersonId, PersonValidationError,
};
pub use model::projection::{FamilyTreeNode, PersonSummary};
pub use model::relation::{RelationKey, RelationType, RelationTypeError};
pub use repo::memory_repo::InMemoryPersonRepository;
pub use repo::person_repo::{PersonRepository, RepoError, RepoResult, SqlitePersonRepository};
pub use seed::tree_builder::{SeedError, SeedSummary, TreeBuilder};
pub use seed::{build_family_tree, seed_default_family, DEFAULT_SEED};
pub use service::family_service::{FamilyError, FamilyResult, FamilyService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
