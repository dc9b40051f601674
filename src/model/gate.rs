//! The `Gate` trait and module descriptors.

use crate::model::Finding;

/// A single detection rule. Gate identity is `(module_id, gate_id)`, unique
/// across the whole catalogue.
///
/// Implementations MUST be pure and deterministic: identical `(text,
/// document_type)` input always yields an identical [`Finding`]. Gates
/// never mutate shared state and never call other gates; they may consult
/// the universal detectors in [`crate::detectors`].
pub trait Gate: Send + Sync {
    /// Fast pre-filter. When this returns `false` the engine records a
    /// `not_applicable` finding without calling [`Gate::check`].
    fn is_relevant(&self, text: &str, document_type: &str) -> bool;

    /// Runs the gate's detection logic. Only called when
    /// [`Gate::is_relevant`] returned `true`.
    fn check(&self, text: &str, document_type: &str) -> Finding;

    /// Stable identifier of this gate within its module.
    fn gate_id(&self) -> &'static str;

    /// Whether this gate's `check` reasons about the presence or first
    /// occurrence of something *anywhere* in the document, rather than
    /// reporting every local instance it can find.
    ///
    /// Such gates cannot be run per-chunk: a presence/absence check run
    /// against one chunk in isolation can flip pass/fail relative to the
    /// whole document, and a first-match search run against each chunk
    /// independently yields one finding per chunk instead of one for the
    /// whole text. The chunker always runs these gates once against the
    /// full original text and merges the result directly, bypassing
    /// per-chunk dispatch (§4.7 chunk-equivalence invariant).
    ///
    /// Gates that flag every local occurrence via `find_iter` (or a
    /// universal detector that already does so) compose correctly across
    /// chunks and should leave this `false`, the default.
    fn is_whole_document(&self) -> bool {
        false
    }
}

/// Declares a single gate constructor plus its static identity, used to
/// build the catalogue in [`crate::registry`].
pub struct GateDescriptor {
    /// Gate identifier, unique within its module.
    pub gate_id: &'static str,
    /// Builds a boxed instance of this gate.
    pub build: fn() -> Box<dyn Gate>,
}

/// Declares one regulatory module: a display name plus its ordered,
/// lazily-constructed gates.
pub struct ModuleDescriptor {
    /// Stable identifier, e.g. `"fca_uk"`.
    pub module_id: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Gates in declaration order; this order is the engine's tie-break
    /// for deterministic finding ordering.
    pub gates: &'static [GateDescriptor],
}
