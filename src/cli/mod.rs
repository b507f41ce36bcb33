//! CLI definitions for the norma binary.
//!
//! Argument parsing only; command execution lives in `main.rs`. Connection
//! settings come from the environment (see [`crate::utils::config`]), not
//! from flags, so the commands stay small.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::consult::DEFAULT_SEARCH_LIMIT;
use crate::quiz::DEFAULT_QUESTION_COUNT;

/// NORMA - consultation engine over occupational-safety regulations.
#[derive(Parser, Debug)]
#[command(
    name = "norma",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Retrieval-augmented consultation over occupational-safety regulatory documents",
    after_help = "EXAMPLES:\n    \
                  norma ingest prikaz-782n.pdf          # Segment and index a document\n    \
                  norma ask \"Кто проводит инструктаж?\"  # Ask a question\n    \
                  norma quiz --count 5                  # Generate quiz questions\n    \
                  norma remove prikaz-782n              # Drop a document from the index"
)]
pub struct Cli {
    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Segment a document and index its sections
    Ingest {
        /// Path to the document (txt, md or pdf)
        file: PathBuf,

        /// Document id to index under (defaults to the file stem)
        #[arg(long)]
        document_id: Option<String>,

        /// Replace existing points of this document instead of adding
        #[arg(long)]
        reindex: bool,
    },

    /// Ask a question against the indexed corpus
    Ask {
        /// The question text
        question: String,

        /// How many sections to retrieve
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },

    /// Generate multiple-choice quiz questions from the corpus
    Quiz {
        /// Number of questions (clamped to 1..=20)
        #[arg(long, default_value_t = DEFAULT_QUESTION_COUNT)]
        count: usize,
    },

    /// Remove a document's sections from the index
    Remove {
        /// Id the document was indexed under
        document_id: String,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
