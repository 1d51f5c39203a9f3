//! Read-only tree projection for printing and external inspection.
//!
//! # Invariants
//! - The projection mirrors the live graph: each node lists its children in
//!   birth order and carries its spouse as a flat summary.
//! - It is not a storage format; nothing is ever loaded back into the store
//!   from it.

use crate::model::person::{Gender, Person, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat `{name, gender, id}` view of one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub name: String,
    pub gender: Gender,
    pub id: PersonId,
}

impl PersonSummary {
    pub fn new(person: &Person, id: PersonId) -> Self {
        Self {
            name: person.name.clone(),
            gender: person.gender,
            id,
        }
    }
}

/// Nested family tree rooted at one blood-line member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTreeNode {
    pub name: String,
    pub gender: Gender,
    pub id: PersonId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse: Option<PersonSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FamilyTreeNode>,
}

impl FamilyTreeNode {
    /// Re-derives `person id -> child ids` for every person in the projection.
    ///
    /// Spouses share the node's children, matching how births are recorded
    /// on both parents.
    pub fn parent_child_map(&self) -> BTreeMap<PersonId, Vec<PersonId>> {
        let mut map = BTreeMap::new();
        self.collect_children(&mut map);
        map
    }

    /// Number of people (members and spouses) in the projection.
    pub fn person_count(&self) -> usize {
        1 + usize::from(self.spouse.is_some())
            + self
                .children
                .iter()
                .map(FamilyTreeNode::person_count)
                .sum::<usize>()
    }

    fn collect_children(&self, map: &mut BTreeMap<PersonId, Vec<PersonId>>) {
        let child_ids: Vec<PersonId> = self.children.iter().map(|child| child.id).collect();
        if let Some(spouse) = &self.spouse {
            map.insert(spouse.id, child_ids.clone());
        }
        map.insert(self.id, child_ids);
        for child in &self.children {
            child.collect_children(map);
        }
    }
}
