//! Learning Buddy - grounded FAQ answers and course recommendations
//!
//! Answers learner questions by retrieving FAQ entries from a vector index
//! and asking a language model to respond from that evidence, and
//! recommends catalog courses for free-text interest areas.
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and prompt templates
//! - `embedding` - Text embedding
//! - `vector_store` - Nearest-neighbor search over the course and FAQ collections
//! - `rag` - Evidence filtering, prompt composition and response generation
//! - `orchestrator` - Per-request pipeline sequencing
//! - `cli` - Command line and HTTP front ends
//!
//! # Example
//!
//! ```rust,no_run
//! use learning_buddy::config::Settings;
//! use learning_buddy::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!
//!     let answer = orchestrator.answer("What is your refund policy?").await?;
//!     println!("{}", answer.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod vector_store;

pub use error::{BuddyError, Result};
