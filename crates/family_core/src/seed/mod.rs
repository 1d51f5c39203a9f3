//! Seed data for populating a family store.
//!
//! # Responsibility
//! - Parse the indentation-based seed format into persisted persons.
//! - Ship King Shan's family as the default seed.

pub mod tree_builder;

use crate::repo::person_repo::PersonRepository;
use crate::service::family_service::FamilyService;
use tree_builder::{SeedError, SeedSummary, TreeBuilder};

/// King Shan's family: 29 people, King Shan = id 1 through Misa = id 29 on
/// an empty store.
pub const DEFAULT_SEED: &str = include_str!("lengaburu.txt");

/// Builds the tree described by `source` into the service's store.
pub fn build_family_tree<R: PersonRepository>(
    service: &FamilyService<R>,
    source: &str,
) -> Result<SeedSummary, SeedError> {
    TreeBuilder::new(service).build(source)
}

/// Builds `DEFAULT_SEED` into the service's store.
pub fn seed_default_family<R: PersonRepository>(
    service: &FamilyService<R>,
) -> Result<SeedSummary, SeedError> {
    build_family_tree(service, DEFAULT_SEED)
}
