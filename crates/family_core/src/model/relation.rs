//! Relation-type catalog.
//!
//! # Responsibility
//! - Define the closed, ordered catalog of supported relation types.
//! - Validate external relation labels and indices at the boundary.
//!
//! # Invariants
//! - Catalog order is fixed; `index()` is stable across releases.
//! - Unknown labels and out-of-range indices are rejected, never guessed.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One entry of the relation catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    Father,
    Mother,
    Spouse,
    Siblings,
    Brothers,
    Sisters,
    Children,
    Sons,
    Daughters,
    GrandChildren,
    GrandSons,
    GrandDaughters,
    GreatGrandChildren,
    GreatGrandSons,
    GreatGrandDaughters,
    Cousins,
    MaleCousins,
    FemaleCousins,
    BrothersInLaw,
    SistersInLaw,
    PaternalUncles,
    MaternalUncles,
    PaternalAunts,
    MaternalAunts,
    GrandFather,
    GrandMother,
    GreatGrandFather,
    GreatGrandMother,
}

/// Rejected relation label or index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationTypeError {
    InvalidLabel(String),
    InvalidIndex(usize),
}

impl Display for RelationTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLabel(label) => write!(f, "invalid relation type: `{label}`"),
            Self::InvalidIndex(index) => write!(
                f,
                "invalid relation type index {index}; expected 0..{}",
                RelationType::ALL.len()
            ),
        }
    }
}

impl Error for RelationTypeError {}

impl RelationType {
    /// The full catalog in its fixed order.
    pub const ALL: [RelationType; 28] = [
        Self::Father,
        Self::Mother,
        Self::Spouse,
        Self::Siblings,
        Self::Brothers,
        Self::Sisters,
        Self::Children,
        Self::Sons,
        Self::Daughters,
        Self::GrandChildren,
        Self::GrandSons,
        Self::GrandDaughters,
        Self::GreatGrandChildren,
        Self::GreatGrandSons,
        Self::GreatGrandDaughters,
        Self::Cousins,
        Self::MaleCousins,
        Self::FemaleCousins,
        Self::BrothersInLaw,
        Self::SistersInLaw,
        Self::PaternalUncles,
        Self::MaternalUncles,
        Self::PaternalAunts,
        Self::MaternalAunts,
        Self::GrandFather,
        Self::GrandMother,
        Self::GreatGrandFather,
        Self::GreatGrandMother,
    ];

    /// Catalog label, plural marker included (e.g. `Sibling(s)`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Father => "Father",
            Self::Mother => "Mother",
            Self::Spouse => "Spouse",
            Self::Siblings => "Sibling(s)",
            Self::Brothers => "Brother(s)",
            Self::Sisters => "Sister(s)",
            Self::Children => "Child(ren)",
            Self::Sons => "Son(s)",
            Self::Daughters => "Daughter(s)",
            Self::GrandChildren => "Grand Child(ren)",
            Self::GrandSons => "Grand Son(s)",
            Self::GrandDaughters => "Grand Daughter(s)",
            Self::GreatGrandChildren => "Great Grand Child(ren)",
            Self::GreatGrandSons => "Great Grand Son(s)",
            Self::GreatGrandDaughters => "Great Grand Daughter(s)",
            Self::Cousins => "Cousin(s)",
            Self::MaleCousins => "Male Cousin(s)",
            Self::FemaleCousins => "Female Cousin(s)",
            Self::BrothersInLaw => "Brother-in-law(s)",
            Self::SistersInLaw => "Sister-in-law(s)",
            Self::PaternalUncles => "Paternal Uncle(s)",
            Self::MaternalUncles => "Maternal Uncle(s)",
            Self::PaternalAunts => "Paternal Aunt(s)",
            Self::MaternalAunts => "Maternal Aunt(s)",
            Self::GrandFather => "Grand Father",
            Self::GrandMother => "Grand Mother",
            Self::GreatGrandFather => "Great Grand Father",
            Self::GreatGrandMother => "Great Grand Mother",
        }
    }

    /// Label without the plural marker: `Sibling(s)` -> `Sibling`.
    pub fn singular_label(self) -> &'static str {
        let label = self.label();
        match label.find('(') {
            Some(end) => &label[..end],
            None => label,
        }
    }

    /// Position in `ALL` (declaration order).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self, RelationTypeError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(RelationTypeError::InvalidIndex(index))
    }

    /// Resolves a catalog label, ignoring ASCII case and surrounding whitespace.
    pub fn from_label(label: &str) -> Result<Self, RelationTypeError> {
        let needle = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| RelationTypeError::InvalidLabel(needle.to_string()))
    }
}

impl Display for RelationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RelationType {
    type Err = RelationTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_label(value)
    }
}

/// Caller-facing relation selector: a catalog label or a catalog index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKey<'a> {
    Label(&'a str),
    Index(usize),
    Type(RelationType),
}

impl RelationKey<'_> {
    pub fn resolve(self) -> Result<RelationType, RelationTypeError> {
        match self {
            Self::Label(label) => RelationType::from_label(label),
            Self::Index(index) => RelationType::from_index(index),
            Self::Type(relation) => Ok(relation),
        }
    }
}

impl<'a> From<&'a str> for RelationKey<'a> {
    fn from(value: &'a str) -> Self {
        Self::Label(value)
    }
}

impl From<usize> for RelationKey<'_> {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl From<RelationType> for RelationKey<'_> {
    fn from(value: RelationType) -> Self {
        Self::Type(value)
    }
}
