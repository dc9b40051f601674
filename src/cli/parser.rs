//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// compliance-cli: deterministic compliance validation and correction for
/// UK regulatory documents.
///
/// Checks text against a catalogue of regulatory modules (FCA financial
/// promotions, UK GDPR, Scottish law, NDAs, UK tax) and, optionally,
/// deterministically rewrites it until every applicable gate passes.
#[derive(Parser, Debug)]
#[command(name = "compliance-cli")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to an external SQLite-backed result cache.
    ///
    /// Falls back to the in-memory cache when unset.
    #[arg(long, env = "RLMC_EXTERNAL_CACHE_PATH")]
    pub cache_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a document against one or more modules.
    Validate {
        /// Path to the document to validate. Reads stdin when omitted.
        file: Option<PathBuf>,

        /// Document type, e.g. `financial_promotion`, `privacy_notice`,
        /// `contract`, `nda`, `tax_disclosure`.
        #[arg(short = 't', long)]
        document_type: String,

        /// Module ids to check against. Defaults to every enabled module.
        #[arg(short, long, value_delimiter = ',')]
        modules: Vec<String>,
    },

    /// Validate, then deterministically correct a document until every
    /// applicable gate passes or the iteration budget is exhausted.
    Correct {
        /// Path to the document to correct. Reads stdin when omitted.
        file: Option<PathBuf>,

        /// Document type, e.g. `financial_promotion`, `privacy_notice`,
        /// `contract`, `nda`, `tax_disclosure`.
        #[arg(short = 't', long)]
        document_type: String,

        /// Module ids to check against. Defaults to every enabled module.
        #[arg(short, long, value_delimiter = ',')]
        modules: Vec<String>,

        /// Maximum detect/apply iterations. Defaults to the configured setting.
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Write the corrected text to this path instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every catalogued module and its enabled state.
    #[command(name = "list-modules", alias = "modules")]
    ListModules,

    /// Enable a module for future requests.
    EnableModule {
        /// Module id, e.g. `fca_uk`.
        module_id: String,
    },

    /// Disable a module for future requests.
    DisableModule {
        /// Module id, e.g. `fca_uk`.
        module_id: String,
    },

    /// Clear cached validation results.
    ClearCache {
        /// Restrict the clear to one cache namespace. Clears everything
        /// when omitted.
        namespace: Option<String>,
    },

    /// Report result-cache usage statistics.
    #[command(name = "cache-stats")]
    CacheStats,

    /// Report per-operation latency and throughput metrics.
    Metrics,

    /// Report the most recent audit log events.
    Audit {
        /// Maximum number of events to print, most recent last.
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
}
