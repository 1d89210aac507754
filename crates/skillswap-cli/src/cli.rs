//! CLI argument definitions for SkillSwap.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SkillSwap -- inspect and edit the user/skill store.
#[derive(Parser)]
#[command(
    name = "skillswap",
    version,
    about = "SkillSwap -- inspect and edit the user/skill store",
    long_about = "Operates on the JSON data file the store library is bound to. \
                  Every mutating command writes the whole store back atomically."
)]
pub struct Cli {
    /// Data file to operate on (overrides SKILLSWAP_DATA_PATH and config).
    #[arg(long, short, global = true)]
    pub data: Option<PathBuf>,

    /// Configuration file.
    #[arg(long, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all users.
    List {
        /// Print the raw JSON document instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Register a new user and persist the store.
    AddUser {
        /// Display name.
        name: String,
        /// City name.
        #[arg(long, default_value = "")]
        city: String,
        /// Latitude of the city.
        #[arg(long, requires = "long", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of the city.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        long: Option<f64>,
        /// Profile photo reference.
        #[arg(long, default_value = "")]
        photo: String,
        /// Skill offered (repeatable).
        #[arg(long = "skill")]
        skills: Vec<String>,
        /// Skill wanted (repeatable).
        #[arg(long = "interest")]
        interests: Vec<String>,
    },

    /// Add an offered skill to a user.
    AddSkill {
        /// The user's display name.
        user: String,
        /// The skill name.
        skill: String,
    },

    /// Remove an offered skill from a user.
    RemoveSkill {
        /// The user's display name.
        user: String,
        /// The skill name.
        skill: String,
    },

    /// Add a wanted skill to a user.
    AddInterest {
        /// The user's display name.
        user: String,
        /// The skill name.
        skill: String,
    },

    /// Remove a wanted skill from a user.
    RemoveInterest {
        /// The user's display name.
        user: String,
        /// The skill name.
        skill: String,
    },

    /// Find users who offer what you want and want what you offer.
    Match {
        /// A skill you can teach.
        have: String,
        /// A skill you want to learn.
        want: String,
    },
}
