//! Indentation-based family tree builder.
//!
//! # Responsibility
//! - Parse the seed text format and populate a store through `FamilyService`.
//!
//! # Format
//! - One person or couple per line: `name[:gender]` or
//!   `name[:gender] - spouse[:gender]`. The separator needs a space on
//!   each side, so hyphenated names are single members.
//! - Gender defaults to `m`; a spouse's gender is the opposite of the first
//!   member's.
//! - Leading tabs give the generation; a line one tab deeper than the
//!   previous couple lists that couple's children.
//! - Lines starting with `//` and blank lines are ignored.
//!
//! # Invariants
//! - Each person is persisted before the next line is read, so ids follow
//!   line order (member first, then spouse).
//! - Children are appended to both parents.

use crate::model::person::{Gender, PersonId};
use crate::repo::person_repo::PersonRepository;
use crate::service::family_service::{persisted_id, FamilyError, FamilyService};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Seed input errors; `line` is 1-based.
#[derive(Debug)]
pub enum SeedError {
    /// Indentation jumps forward by more than one generation.
    InvalidIndentation {
        line: usize,
        depth: usize,
        max_depth: usize,
    },
    /// Indented children under a line that is not a couple.
    MissingCouple { line: usize },
    InvalidGender { line: usize, value: String },
    BlankName { line: usize },
    TooManyMembers { line: usize },
    Family { line: usize, source: FamilyError },
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIndentation {
                line,
                depth,
                max_depth,
            } => write!(
                f,
                "line {line}: invalid number of tabs ({depth}); expected at most {max_depth}"
            ),
            Self::MissingCouple { line } => {
                write!(f, "line {line}: children listed under a person without a spouse")
            }
            Self::InvalidGender { line, value } => {
                write!(f, "line {line}: invalid gender `{value}`; expected m|f")
            }
            Self::BlankName { line } => write!(f, "line {line}: name must not be blank"),
            Self::TooManyMembers { line } => {
                write!(f, "line {line}: at most two members (a couple) per line")
            }
            Self::Family { line, source } => write!(f, "line {line}: {source}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Family { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// First person created, if any.
    pub root_id: Option<PersonId>,
    /// Persons created, spouses included.
    pub people: usize,
    /// Deepest generation seen (1 = root line only).
    pub generations: usize,
}

#[derive(Debug, Clone, Copy)]
struct Couple {
    father_id: PersonId,
    mother_id: PersonId,
}

#[derive(Debug, PartialEq, Eq)]
struct SeedMember {
    name: String,
    gender: Gender,
}

#[derive(Debug, PartialEq, Eq)]
struct SeedLine {
    member: SeedMember,
    spouse: Option<SeedMember>,
}

/// Streams seed lines into a `FamilyService`.
pub struct TreeBuilder<'s, R: PersonRepository> {
    service: &'s FamilyService<R>,
    parents: Vec<Couple>,
    last_couple: Option<Couple>,
    summary: SeedSummary,
}

impl<'s, R: PersonRepository> TreeBuilder<'s, R> {
    pub fn new(service: &'s FamilyService<R>) -> Self {
        Self {
            service,
            parents: Vec::new(),
            last_couple: None,
            summary: SeedSummary {
                root_id: None,
                people: 0,
                generations: 0,
            },
        }
    }

    /// Parses `source` and persists every person it describes.
    pub fn build(mut self, source: &str) -> Result<SeedSummary, SeedError> {
        for (index, raw_line) in source.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }

            let depth = raw_line.chars().take_while(|c| *c == '\t').count();
            self.enter_generation(line, depth)?;
            let entry = parse_line(line, &raw_line[depth..])?;
            self.last_couple = self
                .add_entry(entry)
                .map_err(|source| SeedError::Family { line, source })?;
            self.summary.generations = self.summary.generations.max(depth + 1);
        }

        info!(
            "event=seed_build module=seed status=ok people={} generations={}",
            self.summary.people, self.summary.generations
        );
        Ok(self.summary)
    }

    fn enter_generation(&mut self, line: usize, depth: usize) -> Result<(), SeedError> {
        let current = self.parents.len();
        if depth == current + 1 {
            let couple = self.last_couple.ok_or(SeedError::MissingCouple { line })?;
            self.parents.push(couple);
        } else if depth <= current {
            self.parents.truncate(depth);
        } else {
            return Err(SeedError::InvalidIndentation {
                line,
                depth,
                max_depth: current + 1,
            });
        }
        Ok(())
    }

    fn add_entry(&mut self, entry: SeedLine) -> Result<Option<Couple>, FamilyError> {
        let parents = self.parents.last().copied();
        let mut member = self.service.construct_person(
            entry.member.name,
            entry.member.gender,
            parents.map(|couple| couple.father_id),
            parents.map(|couple| couple.mother_id),
            None,
        )?;
        let member_id = self.service.save(&mut member)?;
        if self.summary.root_id.is_none() {
            self.summary.root_id = Some(member_id);
        }
        self.summary.people += 1;

        if let Some(couple) = parents {
            self.service.add_child(couple.father_id, member_id)?;
            self.service.add_child(couple.mother_id, member_id)?;
        }

        let Some(spouse) = entry.spouse else {
            return Ok(None);
        };
        let spouse = self
            .service
            .marry_into(member_id, spouse.name, spouse.gender)?;
        let spouse_id = persisted_id(&spouse)?;
        self.summary.people += 1;

        Ok(Some(match member.gender {
            Gender::Male => Couple {
                father_id: member_id,
                mother_id: spouse_id,
            },
            Gender::Female => Couple {
                father_id: spouse_id,
                mother_id: member_id,
            },
        }))
    }
}

const COUPLE_SEPARATOR: &str = " - ";

fn parse_line(line: usize, text: &str) -> Result<SeedLine, SeedError> {
    let members: Vec<&str> = text.split(COUPLE_SEPARATOR).map(str::trim).collect();
    match members.as_slice() {
        [member] => Ok(SeedLine {
            member: parse_member(line, member, Gender::Male)?,
            spouse: None,
        }),
        [member, spouse] => {
            let member = parse_member(line, member, Gender::Male)?;
            let spouse_gender = member.gender.opposite();
            let spouse = parse_member(line, spouse, spouse_gender)?;
            if spouse.gender != spouse_gender {
                return Err(SeedError::InvalidGender {
                    line,
                    value: spouse.gender.to_string(),
                });
            }
            Ok(SeedLine {
                member,
                spouse: Some(spouse),
            })
        }
        _ => Err(SeedError::TooManyMembers { line }),
    }
}

fn parse_member(line: usize, text: &str, default_gender: Gender) -> Result<SeedMember, SeedError> {
    let (name, gender) = match text.split_once(':') {
        Some((name, token)) => {
            let gender = Gender::parse(token).ok_or_else(|| SeedError::InvalidGender {
                line,
                value: token.trim().to_string(),
            })?;
            (name.trim(), gender)
        }
        None => (text.trim(), default_gender),
    };
    if name.is_empty() {
        return Err(SeedError::BlankName { line });
    }
    Ok(SeedMember {
        name: name.to_string(),
        gender,
    })
}
