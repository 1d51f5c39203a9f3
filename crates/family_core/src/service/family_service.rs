//! Family tree use-case service.
//!
//! # Responsibility
//! - Construct persons with a correctly derived ancestor path.
//! - Own the two mutation points: appending children and linking spouses.
//! - Provide name lookup, births, census queries and tree projections.
//!
//! # Invariants
//! - Every read re-fetches from the store by id; no stale copies are used.
//! - Spouse links are written on both sides before a call returns.
//! - Names are unique case-insensitively for births; lookups never guess.

use crate::model::person::{Gender, LineageError, Person, PersonId};
use crate::model::projection::{FamilyTreeNode, PersonSummary};
use crate::model::relation::RelationTypeError;
use crate::repo::person_repo::{PersonRepository, RepoError};
use log::{debug, info};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type FamilyResult<T> = Result<T, FamilyError>;

/// Errors from family service operations.
#[derive(Debug)]
pub enum FamilyError {
    /// Relation label or index is outside the catalog.
    InvalidRelationType(RelationTypeError),
    /// Id lookup failed (stale reference or bad seed data).
    NotFound(PersonId),
    /// Name lookup matched nobody.
    NameNotFound(String),
    /// Name lookup matched more than one person.
    AmbiguousName {
        name: String,
        matches: Vec<PersonId>,
    },
    /// The blood-line parent cannot be determined, or parentage is partial.
    StructuralInvariantViolation(String),
    /// Birth requested for someone who is not a married woman.
    NotAMother(PersonId),
    /// A person with this name already exists.
    DuplicateName(String),
    /// Person already has a spouse.
    AlreadyMarried(PersonId),
    /// Name is blank after trim.
    InvalidName,
    /// Store-level failure.
    Repo(RepoError),
}

impl Display for FamilyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRelationType(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::NameNotFound(name) => write!(f, "{name} does not exist in the family tree"),
            Self::AmbiguousName { name, matches } => write!(
                f,
                "{} family members are named {name}: {matches:?}",
                matches.len()
            ),
            Self::StructuralInvariantViolation(details) => {
                write!(f, "structural invariant violated: {details}")
            }
            Self::NotAMother(id) => write!(f, "person {id} is not a married woman"),
            Self::DuplicateName(name) => {
                write!(f, "{name} already exists in the family tree")
            }
            Self::AlreadyMarried(id) => write!(f, "person {id} is already married"),
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FamilyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRelationType(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FamilyError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<RelationTypeError> for FamilyError {
    fn from(value: RelationTypeError) -> Self {
        Self::InvalidRelationType(value)
    }
}

impl From<LineageError> for FamilyError {
    fn from(value: LineageError) -> Self {
        Self::StructuralInvariantViolation(value.to_string())
    }
}

/// Family tree service facade over a person store.
pub struct FamilyService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> FamilyService<R> {
    /// Creates a service over the provided store.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Loads one person by id.
    pub fn person(&self, id: PersonId) -> FamilyResult<Person> {
        self.repo.require_person(id).map_err(Into::into)
    }

    /// Builds (but does not persist) a person with its ancestor path.
    ///
    /// # Contract
    /// - No parents: root or married-in path `[{None, None}]`.
    /// - Both parents: resolved through the store; the blood parent's path
    ///   prefixes the new one.
    /// - Only one parent: `StructuralInvariantViolation`.
    pub fn construct_person(
        &self,
        name: impl Into<String>,
        gender: Gender,
        father_id: Option<PersonId>,
        mother_id: Option<PersonId>,
        spouse_id: Option<PersonId>,
    ) -> FamilyResult<Person> {
        let mut person = match (father_id, mother_id) {
            (None, None) => Person::new(name, gender),
            (Some(father_id), Some(mother_id)) => {
                let father = self.person(father_id)?;
                let mother = self.person(mother_id)?;
                Person::descendant_of(name, gender, &father, &mother)?
            }
            (father_id, mother_id) => {
                return Err(FamilyError::StructuralInvariantViolation(format!(
                    "incomplete parentage: father={father_id:?} mother={mother_id:?}"
                )))
            }
        };
        person.spouse_id = spouse_id;
        Ok(person)
    }

    /// Creates the record on first call, overwrites it afterwards.
    ///
    /// Sets `person.id` when a new id is assigned.
    pub fn save(&self, person: &mut Person) -> FamilyResult<PersonId> {
        if let Some(id) = person.id {
            self.repo.update_person(person)?;
            return Ok(id);
        }
        let id = self.repo.create_person(person)?;
        person.id = Some(id);
        debug!(
            "event=person_save module=service status=ok id={id} generation={}",
            person.ancestors.len()
        );
        Ok(id)
    }

    /// Appends `child_id` to the parent's children (no-op when present).
    pub fn add_child(&self, parent_id: PersonId, child_id: PersonId) -> FamilyResult<()> {
        self.person(child_id)?;
        let mut parent = self.person(parent_id)?;
        if parent.add_child(child_id) {
            self.repo.update_person(&parent)?;
        }
        Ok(())
    }

    /// Creates a married-in spouse for `member_id` and links both sides.
    pub fn marry_into(
        &self,
        member_id: PersonId,
        name: impl Into<String>,
        gender: Gender,
    ) -> FamilyResult<Person> {
        let name = normalize_name(name.into())?;
        let mut member = self.person(member_id)?;
        if member.spouse_id.is_some() {
            return Err(FamilyError::AlreadyMarried(member_id));
        }

        let mut spouse = Person::married_into(name, gender, member_id);
        let spouse_id = self.save(&mut spouse)?;
        member.spouse_id = Some(spouse_id);
        self.repo.update_person(&member)?;

        info!("event=marriage module=service status=ok member_id={member_id} spouse_id={spouse_id}");
        Ok(spouse)
    }

    /// Records a new birth to a married mother.
    ///
    /// # Contract
    /// - Mother must be female and married (`NotAMother`).
    /// - Child name is title-cased and must be unique (`DuplicateName`).
    /// - The father is the mother's spouse; the child is appended to both.
    pub fn add_child_to_mother(
        &self,
        mother_id: PersonId,
        name: impl Into<String>,
        gender: Gender,
    ) -> FamilyResult<Person> {
        let mut mother = self.person(mother_id)?;
        if mother.gender != Gender::Female {
            return Err(FamilyError::NotAMother(mother_id));
        }
        let father_id = mother.spouse_id.ok_or(FamilyError::NotAMother(mother_id))?;

        let name = title_case(&normalize_name(name.into())?);
        let taken = self.repo.filter_persons(&|person: &Person| person.matches_name(&name))?;
        if !taken.is_empty() {
            return Err(FamilyError::DuplicateName(name));
        }

        let mut child =
            self.construct_person(name, gender, Some(father_id), Some(mother_id), None)?;
        let child_id = self.save(&mut child)?;

        if mother.add_child(child_id) {
            self.repo.update_person(&mother)?;
        }
        self.add_child(father_id, child_id)?;

        info!(
            "event=birth module=service status=ok child_id={child_id} mother_id={mother_id} father_id={father_id} gender={gender}"
        );
        Ok(child)
    }

    /// Case-insensitive name lookup.
    ///
    /// Returns `Ok(None)` when nobody matches and `AmbiguousName` when more
    /// than one person does.
    pub fn find_by_name(&self, name: &str) -> FamilyResult<Option<Person>> {
        let needle = name.trim();
        let mut matches = self
            .repo
            .filter_persons(&|person: &Person| person.matches_name(needle))?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ => Err(FamilyError::AmbiguousName {
                name: needle.to_string(),
                matches: matches.iter().filter_map(|person| person.id).collect(),
            }),
        }
    }

    /// Like `find_by_name`, but nobody matching is an error.
    pub fn require_by_name(&self, name: &str) -> FamilyResult<Person> {
        self.find_by_name(name)?
            .ok_or_else(|| FamilyError::NameNotFound(name.trim().to_string()))
    }

    /// The person with the smallest id (the tree root once seeded).
    pub fn first_person(&self) -> FamilyResult<Option<Person>> {
        Ok(self.repo.list_persons()?.into_iter().next())
    }

    /// Mothers tied for the most children of `gender` (all children when `None`).
    ///
    /// A mother is a married woman with at least one child. Results follow
    /// store order; empty when no mother has a matching child.
    pub fn mothers_with_most_children(&self, gender: Option<Gender>) -> FamilyResult<Vec<Person>> {
        let mut mothers = Vec::new();
        self.repo.for_each_person(&mut |person: &Person| {
            if person.gender == Gender::Female
                && person.spouse_id.is_some()
                && !person.children.is_empty()
            {
                mothers.push(person.clone());
            }
        })?;

        let mut best = 0;
        let mut winners = Vec::new();
        for mother in mothers {
            let count = self.children(&mother, gender, &[])?.len();
            if count == 0 {
                continue;
            }
            match count.cmp(&best) {
                Ordering::Greater => {
                    best = count;
                    winners = vec![mother];
                }
                Ordering::Equal => winners.push(mother),
                Ordering::Less => {}
            }
        }
        Ok(winners)
    }

    /// Builds the read-only projection rooted at `root_id`.
    pub fn family_tree(&self, root_id: PersonId) -> FamilyResult<FamilyTreeNode> {
        let person = self.person(root_id)?;
        let spouse = match person.spouse_id {
            Some(spouse_id) => Some(PersonSummary::new(&self.person(spouse_id)?, spouse_id)),
            None => None,
        };
        let children = person
            .children
            .iter()
            .map(|child_id| self.family_tree(*child_id))
            .collect::<FamilyResult<Vec<_>>>()?;

        Ok(FamilyTreeNode {
            name: person.name,
            gender: person.gender,
            id: root_id,
            spouse,
            children,
        })
    }

    /// Renders `Name(g) - Spouse(g)` lines, one tab per generation.
    pub fn render_tree(&self, root_id: PersonId) -> FamilyResult<String> {
        let mut lines = Vec::new();
        self.render_into(root_id, 0, &mut lines)?;
        Ok(lines.join("\n"))
    }

    fn render_into(&self, id: PersonId, depth: usize, lines: &mut Vec<String>) -> FamilyResult<()> {
        let person = self.person(id)?;
        let mut line = format!("{}{}", "\t".repeat(depth), person.label());
        if let Some(spouse_id) = person.spouse_id {
            line.push_str(" - ");
            line.push_str(&self.person(spouse_id)?.label());
        }
        lines.push(line);
        for child_id in &person.children {
            self.render_into(*child_id, depth + 1, lines)?;
        }
        Ok(())
    }
}

/// Id of a record that came back from the store.
pub(crate) fn persisted_id(person: &Person) -> FamilyResult<PersonId> {
    person.id.ok_or(FamilyError::Repo(RepoError::MissingId))
}

fn normalize_name(value: String) -> FamilyResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FamilyError::InvalidName);
    }
    Ok(trimmed.to_string())
}

/// `sAtYa  priya` -> `Satya Priya`.
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, title_case, FamilyError};

    #[test]
    fn title_case_normalizes_each_word() {
        assert_eq!(title_case("priya"), "Priya");
        assert_eq!(title_case("sAtYa  PRIYA"), "Satya Priya");
    }

    #[test]
    fn normalize_name_rejects_blank() {
        assert!(matches!(
            normalize_name("   ".to_string()),
            Err(FamilyError::InvalidName)
        ));
        assert_eq!(normalize_name("  Ish ".to_string()).unwrap(), "Ish");
    }
}
