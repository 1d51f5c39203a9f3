//! Relationship queries over the family tree.
//!
//! # Responsibility
//! - Descendant and ancestor traversal primitives.
//! - Derived relations (siblings, cousins, in-laws, uncles, aunts), built
//!   only from the traversal primitives.
//! - Relation-type dispatch and pairwise relation inference.
//!
//! # Invariants
//! - Every query is a pure read over the store.
//! - Public queries re-load the person by id and read links from that
//!   record, never from the caller's copy.
//! - Inference narrows candidates by ancestor-path shape first and only
//!   then confirms each candidate by exact lookup, in catalog priority.

use crate::model::person::{AncestorPath, Gender, Person, PersonId};
use crate::model::relation::{RelationKey, RelationType};
use crate::repo::person_repo::PersonRepository;
use crate::service::family_service::{persisted_id, FamilyError, FamilyResult, FamilyService};
use log::debug;
use std::collections::HashSet;

const SAME_GENERATION: &[RelationType] = &[
    RelationType::Spouse,
    RelationType::Siblings,
    RelationType::BrothersInLaw,
    RelationType::SistersInLaw,
];
const CHILD_GENERATION: &[RelationType] = &[RelationType::Sons, RelationType::Daughters];
const GRAND_CHILD_GENERATION: &[RelationType] =
    &[RelationType::GrandSons, RelationType::GrandDaughters];
const GREAT_GRAND_CHILD_GENERATION: &[RelationType] = &[
    RelationType::GreatGrandSons,
    RelationType::GreatGrandDaughters,
];
const COUSIN_GENERATION: &[RelationType] = &[RelationType::Cousins];
const PARENT_GENERATION: &[RelationType] = &[
    RelationType::Father,
    RelationType::Mother,
    RelationType::PaternalUncles,
    RelationType::MaternalUncles,
    RelationType::PaternalAunts,
    RelationType::MaternalAunts,
];
const GRAND_PARENT_GENERATION: &[RelationType] =
    &[RelationType::GrandFather, RelationType::GrandMother];
const GREAT_GRAND_PARENT_GENERATION: &[RelationType] = &[
    RelationType::GreatGrandFather,
    RelationType::GreatGrandMother,
];

impl<R: PersonRepository> FamilyService<R> {
    pub fn father(&self, person: &Person) -> FamilyResult<Option<Person>> {
        self.current(person)?
            .father_id()
            .map(|id| self.person(id))
            .transpose()
    }

    pub fn mother(&self, person: &Person) -> FamilyResult<Option<Person>> {
        self.current(person)?
            .mother_id()
            .map(|id| self.person(id))
            .transpose()
    }

    pub fn spouse(&self, person: &Person) -> FamilyResult<Option<Person>> {
        self.current(person)?
            .spouse_id
            .map(|id| self.person(id))
            .transpose()
    }

    /// Descendants `level + 1` generations down (0 = children).
    ///
    /// `gender` and `exclude` filter the last generation only. Order follows
    /// each parent's birth order, concatenated in traversal order.
    pub fn descendants(
        &self,
        person: &Person,
        level: usize,
        gender: Option<Gender>,
        exclude: &[PersonId],
    ) -> FamilyResult<Vec<Person>> {
        let person = self.current(person)?;
        self.descendants_of(&person, level, gender, exclude)
    }

    pub fn children(
        &self,
        person: &Person,
        gender: Option<Gender>,
        exclude: &[PersonId],
    ) -> FamilyResult<Vec<Person>> {
        self.descendants(person, 0, gender, exclude)
    }

    /// Ancestors `level + 1` generations up (0 = parents).
    ///
    /// Empty for roots and married-in persons. Fathers come before mothers at
    /// every generation.
    pub fn ancestors(
        &self,
        person: &Person,
        level: usize,
        gender: Option<Gender>,
    ) -> FamilyResult<Vec<Person>> {
        let person = self.current(person)?;
        self.ancestors_of(&person, level, gender)
    }

    /// Father's children other than `person`.
    pub fn siblings(&self, person: &Person, gender: Option<Gender>) -> FamilyResult<Vec<Person>> {
        match self.father(person)? {
            Some(father) => self.descendants_of(&father, 0, gender, &[persisted_id(person)?]),
            None => Ok(Vec::new()),
        }
    }

    /// Children of the father's siblings, then of the mother's siblings.
    pub fn cousins(&self, person: &Person, gender: Option<Gender>) -> FamilyResult<Vec<Person>> {
        let mut result = Vec::new();
        let parents = [self.father(person)?, self.mother(person)?];
        for parent in parents.iter().flatten() {
            for parent_sibling in self.siblings(parent, None)? {
                result.extend(self.children(&parent_sibling, gender, &[])?);
            }
        }
        Ok(result)
    }

    pub fn brothers_in_law(&self, person: &Person) -> FamilyResult<Vec<Person>> {
        self.in_laws(person, Gender::Male)
    }

    pub fn sisters_in_law(&self, person: &Person) -> FamilyResult<Vec<Person>> {
        self.in_laws(person, Gender::Female)
    }

    pub fn paternal_uncles(&self, person: &Person) -> FamilyResult<Vec<Person>> {
        self.parent_siblings(self.father(person)?, Gender::Male)
    }

    pub fn maternal_uncles(&self, person: &Person) -> FamilyResult<Vec<Person>> {
        self.parent_siblings(self.mother(person)?, Gender::Male)
    }

    pub fn paternal_aunts(&self, person: &Person) -> FamilyResult<Vec<Person>> {
        self.parent_siblings(self.father(person)?, Gender::Female)
    }

    pub fn maternal_aunts(&self, person: &Person) -> FamilyResult<Vec<Person>> {
        self.parent_siblings(self.mother(person)?, Gender::Female)
    }

    /// Relatives of `person` for a catalog label, index or type.
    ///
    /// # Errors
    /// - `FamilyError::InvalidRelationType` for keys outside the catalog.
    pub fn relatives<'k>(
        &self,
        person: &Person,
        key: impl Into<RelationKey<'k>>,
    ) -> FamilyResult<Vec<Person>> {
        let relation = key.into().resolve()?;
        self.relatives_of_type(person, relation)
    }

    pub fn relatives_of_type(
        &self,
        person: &Person,
        relation: RelationType,
    ) -> FamilyResult<Vec<Person>> {
        use RelationType::*;

        let male = Some(Gender::Male);
        let female = Some(Gender::Female);
        match relation {
            Father => Ok(self.father(person)?.into_iter().collect()),
            Mother => Ok(self.mother(person)?.into_iter().collect()),
            Spouse => Ok(self.spouse(person)?.into_iter().collect()),
            Siblings => self.siblings(person, None),
            Brothers => self.siblings(person, male),
            Sisters => self.siblings(person, female),
            Children => self.children(person, None, &[]),
            Sons => self.children(person, male, &[]),
            Daughters => self.children(person, female, &[]),
            GrandChildren => self.descendants(person, 1, None, &[]),
            GrandSons => self.descendants(person, 1, male, &[]),
            GrandDaughters => self.descendants(person, 1, female, &[]),
            GreatGrandChildren => self.descendants(person, 2, None, &[]),
            GreatGrandSons => self.descendants(person, 2, male, &[]),
            GreatGrandDaughters => self.descendants(person, 2, female, &[]),
            Cousins => self.cousins(person, None),
            MaleCousins => self.cousins(person, male),
            FemaleCousins => self.cousins(person, female),
            BrothersInLaw => self.brothers_in_law(person),
            SistersInLaw => self.sisters_in_law(person),
            PaternalUncles => self.paternal_uncles(person),
            MaternalUncles => self.maternal_uncles(person),
            PaternalAunts => self.paternal_aunts(person),
            MaternalAunts => self.maternal_aunts(person),
            GrandFather => self.ancestors(person, 1, male),
            GrandMother => self.ancestors(person, 1, female),
            GreatGrandFather => self.ancestors(person, 2, male),
            GreatGrandMother => self.ancestors(person, 2, female),
        }
    }

    /// Which catalog relation `other` is to `person`, if any.
    ///
    /// Candidates are narrowed from the shape of both effective ancestor
    /// paths, then confirmed in priority order; the first confirmed
    /// candidate wins. The same person yields `None`.
    pub fn relation_of(
        &self,
        person: &Person,
        other: &Person,
    ) -> FamilyResult<Option<RelationType>> {
        let person = self.current(person)?;
        let other = self.current(other)?;
        let person_id = persisted_id(&person)?;
        let other_id = persisted_id(&other)?;
        if person_id == other_id {
            return Ok(None);
        }

        let own_path = self.effective_path(&person)?;
        let other_path = self.effective_path(&other)?;
        let shared = own_path.common_prefix_len(&other_path);
        let candidates = candidate_relations(own_path.len(), other_path.len(), shared);

        for relation in candidates {
            let relatives = self.relatives_of_type(&person, *relation)?;
            if relatives.iter().any(|relative| relative.id == Some(other_id)) {
                debug!(
                    "event=relation_inferred module=service status=ok person_id={person_id} other_id={other_id} relation={relation}"
                );
                return Ok(Some(*relation));
            }
        }
        Ok(None)
    }

    /// Singular relation label (`Son`, `Sister-in-law`, ...) or `None`.
    pub fn describe_relation(&self, person: &Person, other: &Person) -> FamilyResult<String> {
        Ok(self
            .relation_of(person, other)?
            .map_or_else(|| "None".to_string(), |relation| relation.singular_label().to_string()))
    }

    /// Stored record for `person`; links on the caller's copy may be stale.
    fn current(&self, person: &Person) -> FamilyResult<Person> {
        self.person(persisted_id(person)?)
    }

    fn descendants_of(
        &self,
        person: &Person,
        level: usize,
        gender: Option<Gender>,
        exclude: &[PersonId],
    ) -> FamilyResult<Vec<Person>> {
        let mut result = Vec::new();
        for child_id in &person.children {
            let child = self.person(*child_id)?;
            if level == 0 {
                if matches_gender(&child, gender) && !exclude.contains(child_id) {
                    result.push(child);
                }
            } else {
                result.extend(self.descendants_of(&child, level - 1, gender, exclude)?);
            }
        }
        Ok(result)
    }

    fn ancestors_of(
        &self,
        person: &Person,
        level: usize,
        gender: Option<Gender>,
    ) -> FamilyResult<Vec<Person>> {
        let Some(father_id) = person.father_id() else {
            return Ok(Vec::new());
        };
        let mother_id = person.mother_id().ok_or_else(|| {
            FamilyError::StructuralInvariantViolation(format!(
                "person {:?} has father {father_id} but no mother",
                person.id
            ))
        })?;
        let father = self.person(father_id)?;
        let mother = self.person(mother_id)?;

        if level == 0 {
            let mut parents = Vec::with_capacity(2);
            if gender != Some(Gender::Female) {
                parents.push(father);
            }
            if gender != Some(Gender::Male) {
                parents.push(mother);
            }
            return Ok(parents);
        }

        let mut result = self.ancestors_of(&father, level - 1, gender)?;
        result.extend(self.ancestors_of(&mother, level - 1, gender)?);
        Ok(result)
    }

    /// A married-in or root person takes their spouse's blood-line path.
    fn effective_path(&self, person: &Person) -> FamilyResult<AncestorPath> {
        if !person.is_blood_line() {
            if let Some(spouse) = self.spouse(person)? {
                return Ok(spouse.ancestors);
            }
        }
        Ok(person.ancestors.clone())
    }

    /// Spouse's siblings of `gender`, then the spouses of own siblings of
    /// the opposite gender.
    fn in_laws(&self, person: &Person, gender: Gender) -> FamilyResult<Vec<Person>> {
        let mut result = match self.spouse(person)? {
            Some(spouse) => self.siblings(&spouse, Some(gender))?,
            None => Vec::new(),
        };
        for sibling in self.siblings(person, Some(gender.opposite()))? {
            if let Some(sibling_spouse) = self.spouse(&sibling)? {
                result.push(sibling_spouse);
            }
        }
        Ok(dedup_by_id(result))
    }

    /// A parent's siblings of `gender` plus that parent's in-laws of `gender`.
    fn parent_siblings(&self, parent: Option<Person>, gender: Gender) -> FamilyResult<Vec<Person>> {
        let Some(parent) = parent else {
            return Ok(Vec::new());
        };
        let mut result = self.siblings(&parent, Some(gender))?;
        result.extend(self.in_laws(&parent, gender)?);
        Ok(dedup_by_id(result))
    }
}

/// Relation types worth confirming for two effective path lengths and their
/// shared prefix. Deeper than great-grand generations yields nothing.
fn candidate_relations(own_len: usize, other_len: usize, shared: usize) -> &'static [RelationType] {
    if shared == own_len {
        return match other_len.checked_sub(own_len) {
            Some(0) => SAME_GENERATION,
            Some(1) => CHILD_GENERATION,
            Some(2) => GRAND_CHILD_GENERATION,
            Some(3) => GREAT_GRAND_CHILD_GENERATION,
            _ => &[],
        };
    }
    if other_len == own_len {
        return COUSIN_GENERATION;
    }
    match own_len.checked_sub(other_len) {
        Some(1) => PARENT_GENERATION,
        Some(2) => GRAND_PARENT_GENERATION,
        Some(3) => GREAT_GRAND_PARENT_GENERATION,
        _ => &[],
    }
}

fn matches_gender(person: &Person, gender: Option<Gender>) -> bool {
    gender.map_or(true, |gender| person.gender == gender)
}

fn dedup_by_id(people: Vec<Person>) -> Vec<Person> {
    let mut seen = HashSet::new();
    people
        .into_iter()
        .filter(|person| seen.insert(person.id))
        .collect()
}
