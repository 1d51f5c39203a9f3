//! Person domain model and ancestor-path encoding.
//!
//! # Responsibility
//! - Define the canonical person record owned by the record store.
//! - Derive a new person's ancestor path from its resolved parents.
//!
//! # Invariants
//! - `id` is assigned by the store on first persist and never reused.
//! - A root or married-in person has a path of exactly one `{None, None}` entry.
//! - A blood descendant's path is its blood parent's path plus one entry
//!   holding its own `{father_id, mother_id}`.
//! - Two people share a generation-k ancestor iff their paths agree on the
//!   first k entries.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned person identifier (positive, monotonically increasing).
pub type PersonId = i64;

/// Binary gender as recorded in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    /// Single-letter wire form (`m` / `f`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }

    /// Parses `m`/`f` (also `male`/`female`), ignoring case and padding.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Self::Male),
            "f" | "female" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation of an ancestor path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentPair {
    pub father_id: Option<PersonId>,
    pub mother_id: Option<PersonId>,
}

impl ParentPair {
    /// Entry used by roots and married-in persons.
    pub const UNKNOWN: Self = Self {
        father_id: None,
        mother_id: None,
    };

    pub fn new(father_id: PersonId, mother_id: PersonId) -> Self {
        Self {
            father_id: Some(father_id),
            mother_id: Some(mother_id),
        }
    }
}

/// Materialized path of parent pairs from the tree root down to one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AncestorPath(Vec<ParentPair>);

impl AncestorPath {
    /// Path of a root or married-in person.
    pub fn root() -> Self {
        Self(vec![ParentPair::UNKNOWN])
    }

    /// Rebuilds a path from persisted entries (generation order).
    pub fn from_entries(entries: Vec<ParentPair>) -> Self {
        Self(entries)
    }

    /// Returns a copy of this path with one more generation appended.
    pub fn extended(&self, entry: ParentPair) -> Self {
        let mut entries = Vec::with_capacity(self.0.len() + 1);
        entries.extend_from_slice(&self.0);
        entries.push(entry);
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Blood descendants carry more than the single root entry.
    pub fn is_blood_line(&self) -> bool {
        self.0.len() > 1
    }

    pub fn entries(&self) -> &[ParentPair] {
        &self.0
    }

    /// The last entry: this person's own parents.
    pub fn parents(&self) -> ParentPair {
        self.0.last().copied().unwrap_or_default()
    }

    /// Number of leading generations shared with `other`.
    pub fn common_prefix_len(&self, other: &Self) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .take_while(|(own, theirs)| own == theirs)
            .count()
    }
}

impl Default for AncestorPath {
    fn default() -> Self {
        Self::root()
    }
}

/// Model-level validation errors for `Person`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    BlankName,
    EmptyAncestorPath,
    SelfSpouse(PersonId),
    SelfChild(PersonId),
    DuplicateChild(PersonId),
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "person name must not be blank"),
            Self::EmptyAncestorPath => write!(f, "ancestor path must hold at least one entry"),
            Self::SelfSpouse(id) => write!(f, "person {id} cannot be their own spouse"),
            Self::SelfChild(id) => write!(f, "person {id} cannot be their own child"),
            Self::DuplicateChild(id) => write!(f, "child {id} is listed more than once"),
        }
    }
}

impl Error for PersonValidationError {}

/// Failure to decide which parent carries the blood line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineageError {
    /// A parent record has not been persisted yet.
    UnsavedParent,
    /// Both parents descend from the family.
    AmbiguousBloodLine {
        father_id: PersonId,
        mother_id: PersonId,
    },
    /// Neither parent descends from the family and they are not the founding couple.
    NoBloodLine {
        father_id: PersonId,
        mother_id: PersonId,
    },
}

impl Display for LineageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsavedParent => write!(f, "parents must be persisted before their children"),
            Self::AmbiguousBloodLine {
                father_id,
                mother_id,
            } => write!(
                f,
                "both parents ({father_id}, {mother_id}) are blood descendants"
            ),
            Self::NoBloodLine {
                father_id,
                mother_id,
            } => write!(
                f,
                "neither parent ({father_id}, {mother_id}) is a blood descendant and they are not a founding couple"
            ),
        }
    }
}

impl Error for LineageError {}

/// Canonical person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// `None` until the record store assigns an id.
    pub id: Option<PersonId>,
    pub name: String,
    pub gender: Gender,
    /// Symmetric once both sides are saved.
    pub spouse_id: Option<PersonId>,
    /// Birth order, no duplicates.
    pub children: Vec<PersonId>,
    pub ancestors: AncestorPath,
}

impl Person {
    /// Creates a root person (no recorded parents, no spouse).
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: None,
            name: name.into(),
            gender,
            spouse_id: None,
            children: Vec::new(),
            ancestors: AncestorPath::root(),
        }
    }

    /// Creates a person joining the family through marriage to `spouse_id`.
    pub fn married_into(name: impl Into<String>, gender: Gender, spouse_id: PersonId) -> Self {
        let mut person = Self::new(name, gender);
        person.spouse_id = Some(spouse_id);
        person
    }

    /// Creates a child of two resolved parents.
    ///
    /// The parent whose path is longer than the root entry is the blood
    /// parent and its path prefixes the child's. When both parents hold only
    /// the root entry they must be each other's spouse (the founding couple).
    ///
    /// # Errors
    /// - `LineageError::UnsavedParent` when a parent has no id.
    /// - `LineageError::AmbiguousBloodLine` / `NoBloodLine` when the blood
    ///   parent cannot be determined.
    pub fn descendant_of(
        name: impl Into<String>,
        gender: Gender,
        father: &Person,
        mother: &Person,
    ) -> Result<Self, LineageError> {
        let (father_id, mother_id) = match (father.id, mother.id) {
            (Some(father_id), Some(mother_id)) => (father_id, mother_id),
            _ => return Err(LineageError::UnsavedParent),
        };

        let blood_path = match (
            father.ancestors.is_blood_line(),
            mother.ancestors.is_blood_line(),
        ) {
            (true, false) => &father.ancestors,
            (false, true) => &mother.ancestors,
            (true, true) => {
                return Err(LineageError::AmbiguousBloodLine {
                    father_id,
                    mother_id,
                })
            }
            (false, false) => {
                let founding_couple = father.spouse_id == Some(mother_id)
                    && mother.spouse_id == Some(father_id);
                if !founding_couple {
                    return Err(LineageError::NoBloodLine {
                        father_id,
                        mother_id,
                    });
                }
                &father.ancestors
            }
        };

        let mut child = Self::new(name, gender);
        child.ancestors = blood_path.extended(ParentPair::new(father_id, mother_id));
        Ok(child)
    }

    pub fn father_id(&self) -> Option<PersonId> {
        self.ancestors.parents().father_id
    }

    pub fn mother_id(&self) -> Option<PersonId> {
        self.ancestors.parents().mother_id
    }

    /// Whether this person descends from the family by blood.
    pub fn is_blood_line(&self) -> bool {
        self.ancestors.is_blood_line()
    }

    /// Appends a child id unless already present. Returns whether it changed.
    pub fn add_child(&mut self, child_id: PersonId) -> bool {
        if self.children.contains(&child_id) {
            return false;
        }
        self.children.push(child_id);
        true
    }

    /// Case-insensitive name comparison used by lookups.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }

    /// Short `Name(g)` label used by text rendering.
    pub fn label(&self) -> String {
        format!("{}({})", self.name, self.gender)
    }

    /// Checks record-level invariants enforced before every store write.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.name.trim().is_empty() {
            return Err(PersonValidationError::BlankName);
        }
        if self.ancestors.is_empty() {
            return Err(PersonValidationError::EmptyAncestorPath);
        }
        if let Some(id) = self.id {
            if self.spouse_id == Some(id) {
                return Err(PersonValidationError::SelfSpouse(id));
            }
            if self.children.contains(&id) {
                return Err(PersonValidationError::SelfChild(id));
            }
        }
        for (index, child_id) in self.children.iter().enumerate() {
            if self.children[..index].contains(child_id) {
                return Err(PersonValidationError::DuplicateChild(*child_id));
            }
        }
        Ok(())
    }
}
