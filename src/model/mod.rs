//! Shared data model: findings, spans, gates, results, snippets, audit events.

pub mod audit;
pub mod finding;
pub mod gate;
pub mod result;
pub mod snippet;
pub mod span;

pub use audit::{AuditEvent, AuditEventType};
pub use finding::{Finding, Severity, Status};
pub use gate::{Gate, GateDescriptor, ModuleDescriptor};
pub use result::{RiskLevel, ValidationResult};
pub use snippet::{InsertionPoint, Snippet};
pub use span::Span;
