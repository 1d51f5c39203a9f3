//! Command-line front end for the family tree engine.
//!
//! # Responsibility
//! - Seed a store (in-memory by default, SQLite with `--db`) and answer
//!   relationship queries against it.
//! - Keep output line-oriented so results can be diffed in scripts.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use family_core::{
    build_family_tree, default_log_level, init_logging, open_db, FamilyService, Gender,
    InMemoryPersonRepository, Person, PersonRepository, RelationKey, SqlitePersonRepository,
    DEFAULT_SEED,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "family")]
#[command(about = "Query relationships in a family tree")]
struct Cli {
    /// trace|debug|info|warn|error (defaults to the build mode's level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// SQLite database file; an in-memory store is used when omitted
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Seed file loaded into an empty store (bundled tree when omitted)
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tree, one generation per tab
    Tree,
    /// Print the tree as JSON
    Json,
    /// List relatives of a person for a relation label or 1-based catalog index
    Relatives { name: String, relation: String },
    /// Name how `relative` is related to `name`
    Relation { name: String, relative: String },
    /// Record a child born to a married mother
    Birth {
        mother: String,
        child: String,
        gender: String,
    },
    /// Mothers with the most children
    Mothers {
        /// Count only sons (m) or daughters (f)
        #[arg(long)]
        gender: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run_cli(cli) {
        log::error!("event=cli_command module=cli status=error error={err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(level, log_dir)?;
    }

    let seed = match &cli.seed {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file `{}`", path.display()))?,
        None => DEFAULT_SEED.to_string(),
    };

    match &cli.db {
        Some(path) => {
            let conn = open_db(path)?;
            let repo = SqlitePersonRepository::try_new(&conn)?;
            run(FamilyService::new(repo), &seed, &cli.command)
        }
        None => run(
            FamilyService::new(InMemoryPersonRepository::new()),
            &seed,
            &cli.command,
        ),
    }
}

fn run<R: PersonRepository>(service: FamilyService<R>, seed: &str, command: &Command) -> Result<()> {
    if service.first_person()?.is_none() {
        build_family_tree(&service, seed)?;
    }
    let Some(root) = service.first_person()? else {
        bail!("the family tree is empty");
    };
    let root_id = root.id.context("root person has no id")?;

    match command {
        Command::Tree => println!("{}", service.render_tree(root_id)?),
        Command::Json => {
            let tree = service.family_tree(root_id)?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Command::Relatives { name, relation } => {
            let person = service.require_by_name(name)?;
            let relatives = service.relatives(&person, parse_relation_key(relation)?)?;
            println!("{}", join_names(&relatives));
        }
        Command::Relation { name, relative } => {
            let person = service.require_by_name(name)?;
            let other = service.require_by_name(relative)?;
            println!("{}", service.describe_relation(&person, &other)?);
        }
        Command::Birth {
            mother,
            child,
            gender,
        } => {
            let mother = service.require_by_name(mother)?;
            let mother_id = mother.id.context("mother has no id")?;
            let child = service.add_child_to_mother(mother_id, child.as_str(), parse_gender(gender)?)?;
            println!("{}", child.label());
        }
        Command::Mothers { gender } => {
            let gender = gender.as_deref().map(parse_gender).transpose()?;
            println!("{}", join_names(&service.mothers_with_most_children(gender)?));
        }
    }
    Ok(())
}

/// `"3"` selects the third catalog entry; anything else is a label.
fn parse_relation_key(value: &str) -> Result<RelationKey<'_>> {
    match value.trim().parse::<usize>() {
        Ok(0) => bail!("relation index is 1-based"),
        Ok(position) => Ok(RelationKey::Index(position - 1)),
        Err(_) => Ok(RelationKey::Label(value)),
    }
}

fn parse_gender(value: &str) -> Result<Gender> {
    Gender::parse(value).with_context(|| format!("invalid gender `{value}`; expected m|f"))
}

fn join_names(persons: &[Person]) -> String {
    if persons.is_empty() {
        return "None".to_string();
    }
    persons
        .iter()
        .map(|person| person.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
