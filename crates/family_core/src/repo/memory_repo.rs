//! In-memory person store.
//!
//! # Responsibility
//! - Provide the default record store: an explicit object owning the
//!   `id -> Person` table, injected into services instead of global state.
//!
//! # Invariants
//! - Ids start at 1 and increase by one per create; `reset()` restarts them.
//! - Callers only ever receive clones; the table owns the canonical records.
//! - Single-threaded: the store is `!Sync` by construction.

use crate::model::person::{Person, PersonId};
use crate::repo::person_repo::{ensure_fixed_fields, PersonRepository, RepoError, RepoResult};
use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

const FIRST_ID: PersonId = 1;

/// `BTreeMap`-backed record store; iteration is in id order.
#[derive(Debug)]
pub struct InMemoryPersonRepository {
    rows: RefCell<BTreeMap<PersonId, Person>>,
    next_id: Cell<PersonId>,
}

impl Default for InMemoryPersonRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self {
            rows: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(FIRST_ID),
        }
    }

    /// Drops every record and restarts id assignment.
    ///
    /// Intended between independent scenarios; ids handed out before the
    /// reset must not be used afterwards.
    pub fn reset(&self) {
        self.rows.borrow_mut().clear();
        self.next_id.set(FIRST_ID);
        debug!("event=store_reset module=repo status=ok store=memory");
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }
}

impl PersonRepository for InMemoryPersonRepository {
    fn create_person(&self, person: &Person) -> RepoResult<PersonId> {
        if let Some(id) = person.id {
            return Err(RepoError::AlreadyPersisted(id));
        }
        person.validate()?;

        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let mut stored = person.clone();
        stored.id = Some(id);
        self.rows.borrow_mut().insert(id, stored);

        debug!("event=person_create module=repo status=ok store=memory id={id}");
        Ok(id)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        let id = person.id.ok_or(RepoError::MissingId)?;
        person.validate()?;

        let mut rows = self.rows.borrow_mut();
        let slot = rows.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        ensure_fixed_fields(id, slot, person)?;
        slot.spouse_id = person.spouse_id;
        slot.children = person.children.clone();
        Ok(())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        Ok(self.rows.borrow().get(&id).cloned())
    }

    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        Ok(self.rows.borrow().values().cloned().collect())
    }

    fn filter_persons(&self, predicate: &dyn Fn(&Person) -> bool) -> RepoResult<Vec<Person>> {
        Ok(self
            .rows
            .borrow()
            .values()
            .filter(|person| predicate(person))
            .cloned()
            .collect())
    }
}
