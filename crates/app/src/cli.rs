//! Command-line surface: bank location, shuffle seed, log filter and the
//! three screens (subjects, topics, test).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quiz_core::model::ALL_TOPICS;

/// Self-quiz runner over a multiple-choice question bank.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the question bank JSON file.
    #[arg(long, env = "QUIZ_BANK", default_value = "data/bank.json", global = true)]
    pub bank: PathBuf,

    /// Seed for a reproducible question order.
    #[arg(long, env = "QUIZ_SEED", global = true)]
    pub seed: Option<u64>,

    /// Log filter in `tracing` env-filter syntax.
    #[arg(long, env = "QUIZ_LOG", default_value = "warn", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Lists the subjects in the bank.
    Subjects,
    /// Lists the topics of a subject.
    #[command(arg_required_else_help = true)]
    Topics {
        /// Subject key, e.g. "microbiology".
        subject: String,
    },
    /// Runs a test over one topic, or over every topic with "all".
    #[command(arg_required_else_help = true)]
    Test {
        /// Subject key.
        subject: String,
        /// Topic name, or "all".
        #[arg(default_value = ALL_TOPICS)]
        topic: String,
    },
}
