//! CLI module - Command-line interface for Davarr
//!
//! This module provides a structured CLI using clap for argument parsing.

pub mod commands;

use clap::{Parser, Subcommand};

/// Davarr - groupware search & availability companion
/// Unified DAV search and out-of-office scheduling for a groupware server
#[derive(Parser)]
#[command(name = "davarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as background daemon with API server and job runner
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// Run a single drain pass over due one-shot jobs
    #[command(alias = "-c", alias = "--check")]
    Check,

    /// Search a provider from the command line
    #[command(alias = "s")]
    Search {
        /// Provider id: contacts, calendar or tasks
        provider: String,

        /// Search term
        #[arg(required = true)]
        term: Vec<String>,

        /// User to search as
        #[arg(long, short)]
        user: String,

        /// Page size
        #[arg(long)]
        limit: Option<u64>,

        /// Offset cursor from a previous page
        #[arg(long)]
        cursor: Option<u64>,
    },

    /// Manage out-of-office windows
    Absence {
        #[command(subcommand)]
        command: AbsenceCommands,
    },

    /// List pending one-shot jobs
    #[command(alias = "j")]
    Jobs,
}

#[derive(Subcommand)]
pub enum AbsenceCommands {
    /// Create or update a user's absence window
    Set {
        /// User id
        user: String,

        /// First day of the window (YYYY-MM-DD)
        first_day: String,

        /// Last day of the window (YYYY-MM-DD)
        last_day: String,

        /// One-line status shown to others
        #[arg(long, default_value = "")]
        short_message: String,

        /// Full out-of-office message
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Show a user's absence window
    Show {
        /// User id
        user: String,
    },

    /// Remove a user's absence window and its pending jobs
    Clear {
        /// User id
        user: String,
    },
}
