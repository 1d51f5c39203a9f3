//! Person record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/update/get/filter/iterate over person records.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Person::validate()` before touching storage.
//! - Ids are assigned on create, strictly increasing, never reused.
//! - Updates only change the spouse link and the children list; name,
//!   gender and ancestor path are fixed at create.
//! - Listing is always in ascending id order.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::person::{AncestorPath, Gender, ParentPair, Person, PersonId, PersonValidationError};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Record store errors.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    Db(DbError),
    /// No record with this id.
    NotFound(PersonId),
    /// Update requested for a record that was never persisted.
    MissingId,
    /// Create requested for a record that already has an id.
    AlreadyPersisted(PersonId),
    /// Update would change a field that is fixed once created.
    ImmutableField { id: PersonId, field: &'static str },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::MissingId => write!(f, "person has not been persisted yet"),
            Self::AlreadyPersisted(id) => write!(f, "person {id} is already persisted"),
            Self::ImmutableField { id, field } => {
                write!(f, "person {id}: {field} cannot change after creation")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "person store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record store for persons, keyed by auto-assigned id.
pub trait PersonRepository {
    /// Persists a new record and returns its freshly assigned id.
    fn create_person(&self, person: &Person) -> RepoResult<PersonId>;
    /// Overwrites an existing record.
    fn update_person(&self, person: &Person) -> RepoResult<()>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// All records in ascending id order.
    fn list_persons(&self) -> RepoResult<Vec<Person>>;

    /// Like `get_person`, but a missing record is an error.
    fn require_person(&self, id: PersonId) -> RepoResult<Person> {
        self.get_person(id)?.ok_or(RepoError::NotFound(id))
    }

    fn filter_persons(&self, predicate: &dyn Fn(&Person) -> bool) -> RepoResult<Vec<Person>> {
        Ok(self
            .list_persons()?
            .into_iter()
            .filter(|person| predicate(person))
            .collect())
    }

    fn for_each_person(&self, visitor: &mut dyn FnMut(&Person)) -> RepoResult<()> {
        for person in self.list_persons()? {
            visitor(&person);
        }
        Ok(())
    }
}

impl<T: PersonRepository + ?Sized> PersonRepository for &T {
    fn create_person(&self, person: &Person) -> RepoResult<PersonId> {
        (**self).create_person(person)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        (**self).update_person(person)
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        (**self).get_person(id)
    }

    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        (**self).list_persons()
    }
}

/// SQLite-backed person store.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

struct PersonRow {
    id: PersonId,
    name: String,
    gender: String,
    spouse_id: Option<PersonId>,
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &Person) -> RepoResult<PersonId> {
        if let Some(id) = person.id {
            return Err(RepoError::AlreadyPersisted(id));
        }
        person.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO persons (name, gender, spouse_id) VALUES (?1, ?2, ?3);",
            params![person.name.as_str(), person.gender.as_str(), person.spouse_id],
        )?;
        let id = tx.last_insert_rowid();
        write_ancestors(&tx, id, &person.ancestors)?;
        write_children(&tx, id, &person.children)?;
        tx.commit()?;

        debug!("event=person_create module=repo status=ok store=sqlite id={id}");
        Ok(id)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        let id = person.id.ok_or(RepoError::MissingId)?;
        person.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let stored = self.require_person(id)?;
        ensure_fixed_fields(id, &stored, person)?;

        tx.execute(
            "UPDATE persons
             SET
                spouse_id = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, person.spouse_id],
        )?;
        tx.execute("DELETE FROM person_children WHERE person_id = ?1;", [id])?;
        write_children(&tx, id, &person.children)?;
        tx.commit()?;

        debug!("event=person_update module=repo status=ok store=sqlite id={id}");
        Ok(())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, gender, spouse_id FROM persons WHERE id = ?1;",
                [id],
                |row| {
                    Ok(PersonRow {
                        id: row.get("id")?,
                        name: row.get("name")?,
                        gender: row.get("gender")?,
                        spouse_id: row.get("spouse_id")?,
                    })
                },
            )
            .optional()?;

        row.map(|row| hydrate_person(self.conn, row)).transpose()
    }

    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, gender, spouse_id FROM persons ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut person_rows = Vec::new();
        while let Some(row) = rows.next()? {
            person_rows.push(PersonRow {
                id: row.get("id")?,
                name: row.get("name")?,
                gender: row.get("gender")?,
                spouse_id: row.get("spouse_id")?,
            });
        }

        person_rows
            .into_iter()
            .map(|row| hydrate_person(self.conn, row))
            .collect()
    }
}

/// Rejects an update that touches a field fixed at create.
pub(crate) fn ensure_fixed_fields(
    id: PersonId,
    stored: &Person,
    update: &Person,
) -> RepoResult<()> {
    let field = if stored.name != update.name {
        "name"
    } else if stored.gender != update.gender {
        "gender"
    } else if stored.ancestors != update.ancestors {
        "ancestor path"
    } else {
        return Ok(());
    };
    Err(RepoError::ImmutableField { id, field })
}

fn hydrate_person(conn: &Connection, row: PersonRow) -> RepoResult<Person> {
    let gender = Gender::parse(&row.gender).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid gender `{}` in persons.gender for id {}",
            row.gender, row.id
        ))
    })?;

    let ancestors = load_ancestors(conn, row.id)?;
    if ancestors.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "person {} has no ancestor path",
            row.id
        )));
    }

    let person = Person {
        id: Some(row.id),
        name: row.name,
        gender,
        spouse_id: row.spouse_id,
        children: load_children(conn, row.id)?,
        ancestors,
    };
    person.validate()?;
    Ok(person)
}

fn load_ancestors(conn: &Connection, person_id: PersonId) -> RepoResult<AncestorPath> {
    let mut stmt = conn.prepare(
        "SELECT father_id, mother_id
         FROM person_ancestors
         WHERE person_id = ?1
         ORDER BY generation ASC;",
    )?;
    let mut rows = stmt.query([person_id])?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(ParentPair {
            father_id: row.get("father_id")?,
            mother_id: row.get("mother_id")?,
        });
    }
    Ok(AncestorPath::from_entries(entries))
}

fn load_children(conn: &Connection, person_id: PersonId) -> RepoResult<Vec<PersonId>> {
    let mut stmt = conn.prepare(
        "SELECT child_id
         FROM person_children
         WHERE person_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([person_id])?;
    let mut children = Vec::new();
    while let Some(row) = rows.next()? {
        children.push(row.get("child_id")?);
    }
    Ok(children)
}

fn write_ancestors(tx: &Transaction<'_>, person_id: PersonId, path: &AncestorPath) -> RepoResult<()> {
    for (generation, entry) in path.entries().iter().enumerate() {
        tx.execute(
            "INSERT INTO person_ancestors (person_id, generation, father_id, mother_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![person_id, generation as i64, entry.father_id, entry.mother_id],
        )?;
    }
    Ok(())
}

fn write_children(tx: &Transaction<'_>, person_id: PersonId, children: &[PersonId]) -> RepoResult<()> {
    for (position, child_id) in children.iter().enumerate() {
        tx.execute(
            "INSERT INTO person_children (person_id, position, child_id) VALUES (?1, ?2, ?3);",
            params![person_id, position as i64, child_id],
        )?;
    }
    Ok(())
}
