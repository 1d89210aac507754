//! CLI entry point for SkillSwap.
//!
//! This binary provides the `skillswap` command with subcommands for
//! listing users, registering users, and editing their skill sets in the
//! JSON data file the store is bound to.

mod cli;
mod config;

use anyhow::{Context, Result, bail};
use clap::Parser;
use skillswap_store::{Location, Skill, UserRecord, UserStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::{CliConfig, DATA_PATH_ENV};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let config = CliConfig::resolve(&cli.config, cli.data, std::env::var(DATA_PATH_ENV).ok());

    init_tracing(&config.log_level);

    let store = UserStore::open(&config.data_path)
        .with_context(|| format!("failed to open store at {}", config.data_path.display()))?;
    info!(path = %config.data_path.display(), "store opened");

    match cli.command {
        Commands::List { json } => cmd_list(&store, json),
        Commands::AddUser {
            name,
            city,
            lat,
            long,
            photo,
            skills,
            interests,
        } => {
            let location = match (lat, long) {
                (Some(lat), Some(long)) => Location::new(lat, long),
                _ => None,
            };
            let record = UserRecord::builder(name)
                .location_name(city)
                .location(location)
                .photo(photo)
                .skills(skills)
                .interests(interests)
                .build();
            cmd_add_user(&store, record)
        }
        Commands::AddSkill { user, skill } => {
            let id = lookup(&store, &user)?;
            let updated = store.add_skill_and_write(&id, Skill::new(skill))?;
            print_user(&updated);
            Ok(())
        }
        Commands::RemoveSkill { user, skill } => {
            let id = lookup(&store, &user)?;
            let updated = store.remove_skill_and_write(&id, &skill)?;
            print_user(&updated);
            Ok(())
        }
        Commands::AddInterest { user, skill } => {
            let id = lookup(&store, &user)?;
            let updated = store.add_interest_and_write(&id, Skill::new(skill))?;
            print_user(&updated);
            Ok(())
        }
        Commands::RemoveInterest { user, skill } => {
            let id = lookup(&store, &user)?;
            let updated = store.remove_interest_and_write(&id, &skill)?;
            print_user(&updated);
            Ok(())
        }
        Commands::Match { have, want } => cmd_match(&store, &have, &want),
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn cmd_list(store: &UserStore, json: bool) -> Result<()> {
    if json {
        println!("{}", store.to_json()?);
        return Ok(());
    }

    let users = store.users()?;
    if users.is_empty() {
        println!("  No users yet. Add one with `skillswap add-user <name>`.");
        return Ok(());
    }

    println!();
    for user in &users {
        print_user(user);
    }
    println!("  {} user(s)", users.len());
    println!();
    Ok(())
}

fn cmd_add_user(store: &UserStore, record: UserRecord) -> Result<()> {
    if store.find_by_name(&record.name)?.is_some() {
        bail!("a user named '{}' already exists", record.name);
    }
    store.register_user(record.clone())?;
    store.flush().context("failed to persist store")?;
    info!(user_id = %record.id, name = %record.name, "user added");
    print_user(&record);
    Ok(())
}

fn cmd_match(store: &UserStore, have: &str, want: &str) -> Result<()> {
    let partners = store.swap_partners(have, want)?;
    if partners.is_empty() {
        println!("  No one offers '{want}' in exchange for '{have}' yet.");
        return Ok(());
    }
    println!();
    for user in &partners {
        print_user(user);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lookup(store: &UserStore, name: &str) -> Result<skillswap_store::UserId> {
    match store.find_by_name(name)? {
        Some(user) => Ok(user.id),
        None => bail!("no user named '{name}'"),
    }
}

fn print_user(user: &UserRecord) {
    let place = match (&user.location, user.location_name.as_str()) {
        (Some(loc), "") => format!("({:.4}, {:.4})", loc.lat, loc.long),
        (Some(loc), city) => format!("{city} ({:.4}, {:.4})", loc.lat, loc.long),
        (None, "") => "-".to_string(),
        (None, city) => city.to_string(),
    };
    println!("  {}  [{}]", user.name, place);
    println!("    offers: {}", user.skills.names().join(", "));
    println!("    wants:  {}", user.interests.names().join(", "));
}

/// Initialize the tracing subscriber with the given default log level.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
