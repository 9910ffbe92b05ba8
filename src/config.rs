// Command line settings

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches};
use std::{ffi::OsString, net::SocketAddr};

pub const DEFAULT_DATABASE: &str = "edition.db";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database: String,
    pub bind: SocketAddr,
    /// Run the bootstrap seeder at startup. Disable in production.
    pub seed: bool,
}

impl Settings {
    fn command() -> clap::Command {
        clap::Command::new("Edition")
            .about("Bookstore catalog server")
            .arg(
                Arg::new("database")
                    .short('d')
                    .long("database")
                    .value_name("DATABASE")
                    .help("Path to SQLite database file (:memory: for a throwaway database)")
                    .default_value(DEFAULT_DATABASE),
            )
            .arg(
                Arg::new("bind")
                    .short('b')
                    .long("bind")
                    .value_name("ADDR")
                    .help("Address to listen on")
                    .default_value(DEFAULT_BIND),
            )
            .arg(
                Arg::new("no_seed")
                    .long("no-seed")
                    .action(ArgAction::SetTrue)
                    .help("Skip creating the demo accounts and catalog at startup"),
            )
    }

    /// Parse settings from the process arguments; exits on --help or bad input.
    pub fn from_env() -> Result<Self> {
        Self::from_matches(&Self::command().get_matches())
    }

    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command()
            .try_get_matches_from(args)
            .context("Invalid command line arguments")?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let database = matches
            .get_one::<String>("database")
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let bind = matches
            .get_one::<String>("bind")
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_BIND)
            .parse::<SocketAddr>()
            .context("Invalid bind address")?;

        Ok(Settings {
            database,
            bind,
            seed: !matches.get_flag("no_seed"),
        })
    }

    /// In-memory, seeded settings used by tests.
    pub fn in_memory() -> Self {
        Settings {
            database: crate::db::MEMORY_DB.to_string(),
            bind: ([127, 0, 0, 1], 0).into(),
            seed: true,
        }
    }
}
