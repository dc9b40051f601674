//! Universal detectors shared by gates across every module: PII,
//! readability, and bias/toxicity. Each is pure, deterministic, and
//! shares the same [`crate::model::Span`] output contract so gates can
//! fold their output directly into a [`crate::model::Finding`].

pub mod bias;
pub mod pii;
pub mod readability;

pub use bias::{BiasScore, detect as detect_bias};
pub use pii::detect as detect_pii;
pub use readability::{ReadabilityScore, score as readability_score};
