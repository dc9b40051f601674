//! Error types for the compliance core.
//!
//! This module provides a comprehensive error hierarchy using `thiserror` for
//! every subsystem: engine orchestration, the result cache, the resilience
//! layer (circuit breaker / rate limiter), snippet synthesis, and CLI
//! command handling.

use thiserror::Error;

/// Result type alias for compliance-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type returned by public API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Engine-level errors (input validation, resource limits).
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Result cache errors.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Synthesis-loop errors.
    #[error("synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Chunker errors.
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// A named dependency's circuit breaker is open; the call was rejected
    /// without being attempted. Internal only — callers (gates, the
    /// provider router) must downgrade this to a `warning` finding rather
    /// than letting it escape to the engine's caller.
    #[error("circuit open for dependency: {dependency}")]
    CircuitOpen {
        /// Name of the dependency whose breaker is open.
        dependency: String,
    },

    /// A named dependency's rate limiter rejected the call. Internal only,
    /// same fallback policy as [`Error::CircuitOpen`].
    #[error("rate limited for dependency: {dependency}")]
    RateLimited {
        /// Name of the dependency that rejected the call.
        dependency: String,
    },

    /// A gate exceeded its per-call time budget. Internal only; converted
    /// to a `warning` finding before reaching the engine's caller.
    #[error("gate timeout: {module_id}/{gate_id}")]
    GateTimeout {
        /// Module the gate belongs to.
        module_id: String,
        /// Gate identifier.
        gate_id: String,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Any unexpected failure. Logged and audited; the rest of a
    /// validation run proceeds for unaffected gates.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Engine-specific errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The supplied text, document type, or module list was invalid.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input.
        message: String,
    },

    /// A configured resource cap was exceeded.
    #[error("resource exceeded: {message}")]
    ResourceExceeded {
        /// Description of the exceeded resource cap.
        message: String,
    },

    /// An unknown module was referenced.
    #[error("unknown module: {module_id}")]
    UnknownModule {
        /// The module id that was not recognized.
        module_id: String,
    },
}

/// Chunker-specific errors.
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// Chunk configuration is invalid (e.g. zero chunk size).
    #[error("invalid chunk configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration is invalid.
        reason: String,
    },

    /// Requested chunk size exceeds the hard cap.
    #[error("chunk size {size} exceeds maximum {max}")]
    ChunkTooLarge {
        /// Requested chunk size.
        size: usize,
        /// Hard cap on chunk size.
        max: usize,
    },

    /// Overlap is larger than (or equal to) the chunk size.
    #[error("overlap {overlap} is too large for chunk size {size}")]
    OverlapTooLarge {
        /// Requested overlap.
        overlap: usize,
        /// Chunk size the overlap was checked against.
        size: usize,
    },
}

/// Cache-specific errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying storage backend error (e.g. `SQLite`).
    #[error("backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization of a cached value failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Synthesis-loop errors.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// A snippet template referenced a variable with no value and no
    /// default. Recorded as `unresolved` in the synthesis trace; does not
    /// abort the synthesis loop.
    #[error("unresolved variable '{variable}' in snippet {snippet_id}")]
    UnresolvedVariable {
        /// Snippet that failed to render.
        snippet_id: String,
        /// Name of the missing placeholder.
        variable: String,
    },

    /// No snippet is registered for a failing `(module_id, gate_id)` pair.
    #[error("no snippet registered for {module_id}/{gate_id}")]
    NoSnippetRegistered {
        /// Module of the unresolved failure.
        module_id: String,
        /// Gate of the unresolved failure.
        gate_id: String,
    },
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Unknown command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Command(CommandError::ExecutionFailed(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Cache(CacheError::Backend(err.to_string()))
    }
}

impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
