//! Module tags for services.
//!
//! Every service declares the functional module it belongs to through
//! [`ModuleService`]. [`ServiceRegistry`] collects those tags when the
//! services are wired together, so callers can ask which services make up
//! a module without inspecting types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Functional area a service belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemModule {
    /// Cashboxes and cash vouchers.
    Treasury,
    /// Stock levels and adjustments.
    Inventory,
    /// Journal entries and balances.
    Ledger,
    /// Fiscal years and periods.
    Fiscal,
}

impl SystemModule {
    /// Every module, in display order.
    pub const ALL: [Self; 4] = [Self::Treasury, Self::Inventory, Self::Ledger, Self::Fiscal];

    /// Lowercase name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Treasury => "treasury",
            Self::Inventory => "inventory",
            Self::Ledger => "ledger",
            Self::Fiscal => "fiscal",
        }
    }
}

impl fmt::Display for SystemModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static module tag carried by a service type.
pub trait ModuleService {
    /// Module the service belongs to.
    const MODULE: SystemModule;
    /// Service name as registered.
    const NAME: &'static str;
}

/// Module to service-name index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceRegistry {
    modules: BTreeMap<SystemModule, Vec<&'static str>>,
}

impl ServiceRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `S` under its module. Registering twice is a no-op.
    pub fn register<S: ModuleService>(&mut self) -> &mut Self {
        let names = self.modules.entry(S::MODULE).or_default();
        if !names.contains(&S::NAME) {
            names.push(S::NAME);
        }
        self
    }

    /// Services registered for `module`, in registration order.
    #[must_use]
    pub fn services(&self, module: SystemModule) -> &[&'static str] {
        self.modules.get(&module).map(Vec::as_slice).unwrap_or_default()
    }

    /// The module `name` was registered under.
    #[must_use]
    pub fn module_of(&self, name: &str) -> Option<SystemModule> {
        self.modules
            .iter()
            .find(|(_, names)| names.contains(&name))
            .map(|(module, _)| *module)
    }

    /// Total number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.values().map(Vec::len).sum()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Payments;
    impl ModuleService for Payments {
        const MODULE: SystemModule = SystemModule::Treasury;
        const NAME: &'static str = "Payments";
    }

    struct Counts;
    impl ModuleService for Counts {
        const MODULE: SystemModule = SystemModule::Inventory;
        const NAME: &'static str = "Counts";
    }

    #[test]
    fn test_register_groups_by_module() {
        let mut registry = ServiceRegistry::new();
        registry.register::<Payments>().register::<Counts>().register::<Payments>();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.services(SystemModule::Treasury), ["Payments"]);
        assert_eq!(registry.module_of("Counts"), Some(SystemModule::Inventory));
        assert!(registry.services(SystemModule::Fiscal).is_empty());
        assert_eq!(registry.module_of("Missing"), None);
    }

    #[test]
    fn test_module_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SystemModule::Treasury).unwrap(),
            "\"treasury\""
        );
        assert_eq!(SystemModule::Ledger.to_string(), "ledger");
    }
}
