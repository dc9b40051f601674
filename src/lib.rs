//! # compliance-core
//!
//! A deterministic compliance validation and correction engine for UK
//! regulatory documents: FCA financial promotions, UK GDPR privacy
//! notices, Scottish-law contract terminology, NDAs, and UK tax
//! disclosures.
//!
//! The crate is built from three tightly coupled subsystems:
//!
//! - The **gate engine** ([`engine`], [`gates`], [`registry`],
//!   [`patterns`], [`detectors`]) — a composable, lazily-loaded catalogue
//!   of detection rules that produce structured [`model::Finding`]s.
//! - The **synthesis engine** ([`synthesis`], [`snippets`]) — a
//!   deterministic, AI-free retry loop that maps failed gates to
//!   pre-approved correction snippets and re-runs the gate engine until
//!   convergence or bounded exhaustion.
//! - The **pipeline infrastructure** ([`cache`], [`resilience`],
//!   [`provider`], [`chunking`], [`profiler`], [`audit`]) — the
//!   fingerprint-keyed result cache, per-provider circuit breakers, the
//!   span-preserving chunker, and the per-operation profiler.
//!
//! [`platform::Platform`] is the single entry point tying these together;
//! it exposes the engine's external operations (`validate`, `correct`,
//! `list_modules`, `enable_module`/`disable_module`, `clear_cache`,
//! `metrics`).

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

pub mod audit;
pub mod cache;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod gates;
pub mod model;
pub mod patterns;
pub mod platform;
pub mod profiler;
#[cfg(feature = "llm-provider")]
pub mod provider;
pub mod registry;
pub mod resilience;
pub mod snippets;
pub mod synthesis;

// Re-export the top-level error type and the platform entry point.
pub use error::{Error, Result};
pub use platform::Platform;

// Re-export the data model at the crate root, the shape every
// subsystem's public API is built from.
pub use model::{
    AuditEvent, AuditEventType, Finding, Gate, InsertionPoint, RiskLevel, Severity, Snippet,
    Span, Status, ValidationResult,
};

// Re-export configuration.
pub use config::Settings;

// Re-export the synthesis outcome, the `correct` operation's return type.
pub use synthesis::CorrectionOutcome;

// Re-export the module registry's summary view, used by `list_modules`.
pub use registry::ModuleSummary;

// Re-export the CLI surface.
pub use cli::{Cli, Commands, OutputFormat};
