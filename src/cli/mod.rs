//! CLI module for Learning Buddy.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Learning Buddy - grounded FAQ answers and course recommendations
///
/// Answers learner questions from the FAQ knowledge base and recommends
/// catalog courses for a list of interests.
#[derive(Parser, Debug)]
#[command(name = "learning-buddy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "LEARNING_BUDDY_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check credentials and endpoint configuration
    Doctor,

    /// Ask a question and get an answer grounded in the FAQ
    Ask {
        /// The question to ask
        query: String,
    },

    /// Show the closest FAQ entries for a question
    Faq {
        /// The question to look up
        question: String,
    },

    /// Recommend courses for one or more interest areas
    Recommend {
        /// Interest areas, e.g. "machine learning" "databases"
        #[arg(required = true)]
        areas: Vec<String>,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
