//! Command line definitions
//!
//! Only argument parsing lives here; the commands are run from `main.rs`.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::{models::report::ReturnCondition, services::history::FilterCriteria};

#[derive(Parser, Debug)]
#[command(name = "rental-desk", version, about = "Rental inventory desk client")]
pub struct Cli {
    /// Override the configured log level (e.g. debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and keep the session for later commands
    Login {
        email: String,
        /// Password; read from RENTAL_DESK_PASSWORD when omitted
        #[arg(long, env = "RENTAL_DESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the saved session
    Logout,

    /// Show the profile of the signed-in user
    Whoami,

    /// Mail a password reset link
    ForgotPassword { email: String },

    /// Show the returns history
    History {
        #[command(flatten)]
        filters: FilterArgs,
        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Print the table rows as HTML instead of text
        #[arg(long)]
        html: bool,
    },

    /// Export the (filtered) returns history as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output directory; defaults to history.export_dir
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Rate a password and check it against the password policy
    PasswordCheck { password: String },

    /// Read commands from stdin in one session; login lockouts and the
    /// inactivity timeout apply across lines
    Shell,
}

/// One line typed at the shell prompt
#[derive(Parser, Debug)]
#[command(name = "rental-desk", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

impl ShellLine {
    /// Parse a whitespace-separated command line, e.g. `history -c damaged`
    pub fn parse(line: &str) -> Result<Command, clap::Error> {
        ShellLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliCondition {
    Good,
    Damaged,
    Missing,
}

impl From<CliCondition> for ReturnCondition {
    fn from(condition: CliCondition) -> Self {
        match condition {
            CliCondition::Good => ReturnCondition::Good,
            CliCondition::Damaged => ReturnCondition::Damaged,
            CliCondition::Missing => ReturnCondition::Missing,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Earliest report date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Latest report date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    #[arg(short, long, value_enum)]
    pub condition: Option<CliCondition>,
    /// Case-insensitive match on client or item name
    #[arg(short, long)]
    pub search: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            date_from: args.from,
            date_to: args.to,
            condition: args.condition.map(ReturnCondition::from),
            search: args.search.filter(|s| !s.trim().is_empty()),
        }
    }
}
