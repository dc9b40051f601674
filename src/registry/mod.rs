//! Static module catalogue and lazy gate construction.
//!
//! Modules are declared once, at compile time, as a `&'static` table of
//! `(module_id, gate constructors)` — there is no dynamic "import module
//! by name" step. "Lazy loading" here means deferring the *construction*
//! of a module's gates until the first request that actually enables it;
//! the code itself is always compiled in.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{EngineError, Result};
use crate::gates;
use crate::model::{Gate, GateDescriptor, ModuleDescriptor};

/// A module's gates, constructed once and shared across requests.
pub struct ConstructedModule {
    /// Stable module identifier.
    pub module_id: &'static str,
    /// Human-readable display name.
    pub display_name: &'static str,
    /// Gates in declaration order, the engine's ordering tie-break.
    pub gates: Vec<(&'static str, Arc<dyn Gate>)>,
}

macro_rules! descriptor {
    ($gate_id:expr, $ctor:path) => {
        GateDescriptor {
            gate_id: $gate_id,
            build: || Box::new($ctor),
        }
    };
}

static FCA_UK_GATES: &[GateDescriptor] = &[
    descriptor!("fair_clear_not_misleading", gates::fca_uk::FairClearNotMisleadingGate),
    descriptor!("fos_signposting", gates::fca_uk::FosSignpostingGate),
    descriptor!("pressure_selling", gates::fca_uk::PressureSellingGate),
];

static GDPR_UK_GATES: &[GateDescriptor] = &[
    descriptor!("lawful_basis", gates::gdpr_uk::LawfulBasisGate),
    descriptor!("data_subject_rights", gates::gdpr_uk::DataSubjectRightsGate),
    descriptor!("plain_language", gates::gdpr_uk::PlainLanguageGate),
];

static SCOTTISH_LAW_GATES: &[GateDescriptor] = &[
    descriptor!("property_terminology", gates::scottish_law::PropertyTerminologyGate),
    descriptor!("tribunal_terminology", gates::scottish_law::TribunalTerminologyGate),
    descriptor!("employment_bias", gates::scottish_law::EmploymentBiasGate),
];

static NDA_GATES: &[GateDescriptor] = &[
    descriptor!("confidentiality_term", gates::nda::ConfidentialityTermGate),
    descriptor!("carve_outs", gates::nda::CarveOutsGate),
    descriptor!("pii_exposure", gates::nda::PiiExposureGate),
];

static TAX_UK_GATES: &[GateDescriptor] = &[
    descriptor!("tax_disclaimer", gates::tax_uk::TaxDisclaimerGate),
    descriptor!("pii_exposure", gates::tax_uk::PiiExposureGate),
];

/// The compile-time module catalogue, in the order modules are iterated
/// during validation.
static CATALOGUE: &[ModuleDescriptor] = &[
    ModuleDescriptor {
        module_id: "fca_uk",
        display_name: "FCA UK Financial Promotions",
        gates: FCA_UK_GATES,
    },
    ModuleDescriptor {
        module_id: "gdpr_uk",
        display_name: "UK GDPR Privacy Notices",
        gates: GDPR_UK_GATES,
    },
    ModuleDescriptor {
        module_id: "scottish_law",
        display_name: "Scottish Law Terminology",
        gates: SCOTTISH_LAW_GATES,
    },
    ModuleDescriptor {
        module_id: "nda",
        display_name: "Non-Disclosure Agreements",
        gates: NDA_GATES,
    },
    ModuleDescriptor {
        module_id: "tax_uk",
        display_name: "UK Tax Disclosures",
        gates: TAX_UK_GATES,
    },
];

/// Summary view of a module, returned by [`ModuleRegistry::list_available`].
#[derive(Debug, Clone)]
pub struct ModuleSummary {
    /// Stable module identifier.
    pub module_id: &'static str,
    /// Human-readable display name.
    pub display_name: &'static str,
    /// Number of gates this module declares.
    pub gate_count: usize,
    /// Whether the module is currently enabled.
    pub enabled: bool,
}

/// Lazily-constructing module registry. Read-only after construction
/// except for the enable/disable toggle and the memoized gate cache,
/// both of which are internally synchronized so concurrent readers of a
/// warm module never block each other.
pub struct ModuleRegistry {
    disabled: RwLock<HashSet<&'static str>>,
    constructed: RwLock<HashMap<&'static str, Arc<ConstructedModule>>>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    /// Builds a registry with every catalogued module enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            disabled: RwLock::new(HashSet::new()),
            constructed: RwLock::new(HashMap::new()),
        }
    }

    /// Lists every catalogued module with its enabled state.
    #[must_use]
    pub fn list_available(&self) -> Vec<ModuleSummary> {
        let disabled = self.disabled.read();
        CATALOGUE
            .iter()
            .map(|m| ModuleSummary {
                module_id: m.module_id,
                display_name: m.display_name,
                gate_count: m.gates.len(),
                enabled: !disabled.contains(m.module_id),
            })
            .collect()
    }

    /// Enables a previously-disabled module. No-op if already enabled or
    /// unknown.
    pub fn enable(&self, module_id: &str) {
        self.disabled.write().remove(module_id);
    }

    /// Disables a module for future requests that resolve active modules
    /// through this registry's enabled set.
    pub fn disable(&self, module_id: &str) {
        if let Some(descriptor) = CATALOGUE.iter().find(|m| m.module_id == module_id) {
            self.disabled.write().insert(descriptor.module_id);
        }
    }

    /// Whether `module_id` is both catalogued and enabled.
    #[must_use]
    pub fn is_enabled(&self, module_id: &str) -> bool {
        CATALOGUE.iter().any(|m| m.module_id == module_id) && !self.disabled.read().contains(module_id)
    }

    /// Returns the constructed gates for `module_id`, in catalogue order,
    /// building them on first use and memoizing the result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownModule`] if `module_id` is not in the
    /// compile-time catalogue.
    pub fn module(&self, module_id: &str) -> Result<Arc<ConstructedModule>> {
        if let Some(existing) = self.constructed.read().get(module_id) {
            return Ok(Arc::clone(existing));
        }

        let descriptor = CATALOGUE
            .iter()
            .find(|m| m.module_id == module_id)
            .ok_or_else(|| EngineError::UnknownModule {
                module_id: module_id.to_string(),
            })?;

        let mut write = self.constructed.write();
        // Another thread may have raced us while we held no lock.
        if let Some(existing) = write.get(descriptor.module_id) {
            return Ok(Arc::clone(existing));
        }

        let gates = descriptor
            .gates
            .iter()
            .map(|gd| (gd.gate_id, Arc::from((gd.build)())))
            .collect();

        let constructed = Arc::new(ConstructedModule {
            module_id: descriptor.module_id,
            display_name: descriptor.display_name,
            gates,
        });
        write.insert(descriptor.module_id, Arc::clone(&constructed));
        Ok(constructed)
    }

    /// The catalogue's module ids in declaration order, used by the
    /// engine to establish deterministic module ordering.
    #[must_use]
    pub fn catalogue_order() -> &'static [&'static str] {
        static ORDER: std::sync::OnceLock<Vec<&'static str>> = std::sync::OnceLock::new();
        ORDER.get_or_init(|| CATALOGUE.iter().map(|m| m.module_id).collect())
    }

    /// The declaration-order position of `gate_id` within `module_id`,
    /// read directly from the static catalogue. Used to sort findings
    /// without constructing a module's gates.
    #[must_use]
    pub fn gate_rank(module_id: &str, gate_id: &str) -> usize {
        CATALOGUE
            .iter()
            .find(|m| m.module_id == module_id)
            .and_then(|m| m.gates.iter().position(|g| g.gate_id == gate_id))
            .unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_available_covers_all_five_modules() {
        let registry = ModuleRegistry::new();
        let modules = registry.list_available();
        assert_eq!(modules.len(), 5);
        assert!(modules.iter().all(|m| m.enabled));
    }

    #[test]
    fn test_module_lazy_construction_is_memoized() {
        let registry = ModuleRegistry::new();
        let a = registry.module("fca_uk").unwrap();
        let b = registry.module("fca_uk").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_unknown_module_errors() {
        let registry = ModuleRegistry::new();
        let err = registry.module("not_a_module").unwrap_err();
        assert!(matches!(err, crate::error::Error::Engine(EngineError::UnknownModule { .. })));
    }

    #[test]
    fn test_disable_then_enable() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_enabled("gdpr_uk"));
        registry.disable("gdpr_uk");
        assert!(!registry.is_enabled("gdpr_uk"));
        registry.enable("gdpr_uk");
        assert!(registry.is_enabled("gdpr_uk"));
    }

    #[test]
    fn test_gate_id_duplicated_across_modules_is_allowed() {
        let registry = ModuleRegistry::new();
        let nda_module = registry.module("nda").unwrap();
        let tax_module = registry.module("tax_uk").unwrap();
        assert!(nda_module.gates.iter().any(|(id, _)| *id == "pii_exposure"));
        assert!(tax_module.gates.iter().any(|(id, _)| *id == "pii_exposure"));
    }

    #[test]
    fn test_catalogue_order_stable() {
        let order = ModuleRegistry::catalogue_order();
        assert_eq!(order, &["fca_uk", "gdpr_uk", "scottish_law", "nda", "tax_uk"]);
    }
}
