use super::{rack, rails2, rails3, ruby, AdapterDescriptor, AdapterId};
use crate::error::{PackError, Result};
use crate::oracle::DependencyOracle;
use tracing::{debug, warn};

/// Longest specialization chain the registry accepts
pub const MAX_CHAIN_DEPTH: usize = 8;

/// Ordered catalog of adapters
pub struct AdapterRegistry {
    adapters: Vec<AdapterDescriptor>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(rails3::descriptor());
        registry.register(rails2::descriptor());
        registry.register(rack::descriptor());
        registry.register(ruby::descriptor());

        registry
    }

    /// Adds an adapter, replacing any previous one with the same id in place
    pub fn register(&mut self, descriptor: AdapterDescriptor) {
        if let Some(existing) = self.adapters.iter_mut().find(|a| a.id == descriptor.id) {
            *existing = descriptor;
        } else {
            self.adapters.push(descriptor);
        }
    }

    pub fn get(&self, id: &AdapterId) -> Option<&AdapterDescriptor> {
        self.adapters.iter().find(|a| &a.id == id)
    }

    pub fn all(&self) -> impl Iterator<Item = &AdapterDescriptor> {
        self.adapters.iter()
    }

    /// Chain from the root down to `id`, root first
    pub fn ancestry(&self, id: &AdapterId) -> Result<Vec<&AdapterDescriptor>> {
        let mut chain = Vec::new();
        let mut current = self.get(id).ok_or_else(|| {
            PackError::InvariantViolation(format!("adapter '{}' is not registered", id))
        })?;

        loop {
            if chain.len() == MAX_CHAIN_DEPTH {
                return Err(PackError::InvariantViolation(format!(
                    "specialization chain of '{}' is longer than {} (cycle?)",
                    id, MAX_CHAIN_DEPTH
                )));
            }
            chain.push(current);

            let Some(parent_id) = &current.parent else {
                break;
            };
            if chain.iter().any(|a| &a.id == parent_id) {
                return Err(PackError::InvariantViolation(format!(
                    "specialization cycle through '{}'",
                    parent_id
                )));
            }
            current = self.get(parent_id).ok_or_else(|| {
                PackError::InvariantViolation(format!(
                    "adapter '{}' extends unregistered '{}'",
                    current.id, parent_id
                ))
            })?;
        }

        chain.reverse();
        Ok(chain)
    }

    /// Selectable adapters, deepest chains first, ties in registration order
    pub fn selection_order(&self) -> Result<Vec<&AdapterDescriptor>> {
        let mut ranked = Vec::new();
        for adapter in self.adapters.iter().filter(|a| a.is_selectable()) {
            ranked.push((self.ancestry(&adapter.id)?.len(), adapter));
        }
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(ranked.into_iter().map(|(_, adapter)| adapter).collect())
    }

    /// Every adapter whose detection matches, in selection order
    pub fn candidates(&self, oracle: &dyn DependencyOracle) -> Result<Vec<&AdapterDescriptor>> {
        Ok(self
            .selection_order()?
            .into_iter()
            .filter(|adapter| adapter.detect(oracle))
            .collect())
    }

    /// Picks the most specific adapter that matches the project's dependencies
    pub fn select(&self, oracle: &dyn DependencyOracle) -> Result<&AdapterDescriptor> {
        let candidates = self.candidates(oracle)?;

        let Some(selected) = candidates.first().copied() else {
            debug!("No adapter matched");
            return Err(PackError::NoAdapterFound);
        };

        let unrelated = self.competing(selected, &candidates)?;
        if !unrelated.is_empty() {
            let ids: Vec<&str> = unrelated.iter().map(|id| id.as_str()).collect();
            warn!(
                "Adapters outside the '{}' chain also matched ({}), using '{}'",
                selected.id,
                ids.join(", "),
                selected.id
            );
        }

        debug!(adapter = %selected.id, "Selected adapter");
        Ok(selected)
    }

    /// Matching adapters that are not `selected` or one of its ancestors
    fn competing(
        &self,
        selected: &AdapterDescriptor,
        candidates: &[&AdapterDescriptor],
    ) -> Result<Vec<AdapterId>> {
        let ancestry = self.ancestry(&selected.id)?;
        Ok(candidates
            .iter()
            .filter(|c| !ancestry.iter().any(|a| a.id == c.id))
            .map(|c| c.id.clone())
            .collect())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::DetectionRule;
    use crate::oracle::StaticOracle;

    fn ids(chain: &[&AdapterDescriptor]) -> Vec<AdapterId> {
        chain.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_default_chain() {
        let registry = AdapterRegistry::with_defaults();
        let chain = registry.ancestry(&AdapterId::Rails3).unwrap();

        assert_eq!(
            ids(&chain),
            vec![
                AdapterId::Ruby,
                AdapterId::Rack,
                AdapterId::Rails2,
                AdapterId::Rails3
            ]
        );
    }

    #[test]
    fn test_selection_order_most_specific_first() {
        let registry = AdapterRegistry::with_defaults();
        let order = registry.selection_order().unwrap();

        assert_eq!(
            ids(&order),
            vec![AdapterId::Rails3, AdapterId::Rails2, AdapterId::Rack]
        );
    }

    #[test]
    fn test_selection_order_independent_of_registration_order() {
        let mut registry = AdapterRegistry::new();
        registry.register(ruby::descriptor());
        registry.register(rack::descriptor());
        registry.register(rails2::descriptor());
        registry.register(rails3::descriptor());

        let order = registry.selection_order().unwrap();
        assert_eq!(order[0].id, AdapterId::Rails3);
        assert_eq!(order[2].id, AdapterId::Rack);
    }

    #[test]
    fn test_select_rails3_over_rack() {
        let registry = AdapterRegistry::with_defaults();
        let oracle = StaticOracle::new()
            .with_gem("railties", "3.2.1")
            .with_gem("rack", "1.4.1");

        assert_eq!(registry.select(&oracle).unwrap().id, AdapterId::Rails3);
    }

    #[test]
    fn test_no_adapter_found() {
        let registry = AdapterRegistry::with_defaults();
        let oracle = StaticOracle::new().with_gem("sinatra", "1.3.0");

        assert!(matches!(
            registry.select(&oracle),
            Err(PackError::NoAdapterFound)
        ));
    }

    #[test]
    fn test_candidates_lists_all_matches() {
        let registry = AdapterRegistry::with_defaults();
        let oracle = StaticOracle::new()
            .with_gem("rails", "2.3.8")
            .with_gem("rack", "1.1.0");

        let found = registry.candidates(&oracle).unwrap();
        assert_eq!(ids(&found), vec![AdapterId::Rails2, AdapterId::Rack]);
    }

    #[test]
    fn test_ancestor_matches_do_not_compete() {
        let registry = AdapterRegistry::with_defaults();
        let oracle = StaticOracle::new()
            .with_gem("rack", "1.4.1")
            .with_gem("railties", "3.2.1");

        let candidates = registry.candidates(&oracle).unwrap();
        let selected = registry.select(&oracle).unwrap();

        assert_eq!(candidates.len(), 2);
        assert!(registry.competing(selected, &candidates).unwrap().is_empty());
    }

    #[test]
    fn test_sibling_matches_compete() {
        let mut registry = AdapterRegistry::new();
        registry.register(ruby::descriptor());
        registry.register(
            AdapterDescriptor::new(AdapterId::Custom("first".to_string()))
                .extends(AdapterId::Ruby)
                .detected_by(DetectionRule::any_version("rack")),
        );
        registry.register(
            AdapterDescriptor::new(AdapterId::Custom("second".to_string()))
                .extends(AdapterId::Ruby)
                .detected_by(DetectionRule::any_version("rack")),
        );
        let oracle = StaticOracle::new().with_gem("rack", "1.0.0");

        let candidates = registry.candidates(&oracle).unwrap();
        let selected = registry.select(&oracle).unwrap();

        assert_eq!(
            registry.competing(selected, &candidates).unwrap(),
            vec![AdapterId::Custom("second".to_string())]
        );
    }

    #[test]
    fn test_tie_broken_by_registration_order() {
        let mut registry = AdapterRegistry::new();
        registry.register(ruby::descriptor());
        registry.register(
            AdapterDescriptor::new(AdapterId::Custom("first".to_string()))
                .extends(AdapterId::Ruby)
                .detected_by(DetectionRule::any_version("rack")),
        );
        registry.register(
            AdapterDescriptor::new(AdapterId::Custom("second".to_string()))
                .extends(AdapterId::Ruby)
                .detected_by(DetectionRule::any_version("rack")),
        );

        let oracle = StaticOracle::new().with_gem("rack", "1.0.0");
        assert_eq!(
            registry.select(&oracle).unwrap().id,
            AdapterId::Custom("first".to_string())
        );
    }

    #[test]
    fn test_unknown_parent_is_invariant_violation() {
        let mut registry = AdapterRegistry::new();
        registry.register(AdapterDescriptor::new(AdapterId::Rack).extends(AdapterId::Ruby));

        assert!(matches!(
            registry.ancestry(&AdapterId::Rack),
            Err(PackError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_cycle_is_invariant_violation() {
        let mut registry = AdapterRegistry::new();
        registry.register(AdapterDescriptor::new(AdapterId::Rack).extends(AdapterId::Rails2));
        registry.register(AdapterDescriptor::new(AdapterId::Rails2).extends(AdapterId::Rack));

        assert!(matches!(
            registry.ancestry(&AdapterId::Rails2),
            Err(PackError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = AdapterRegistry::with_defaults();
        registry.register(rack::descriptor().config_var("RACK_ENV", "staging"));

        assert_eq!(registry.all().count(), 4);
        assert_eq!(
            registry.get(&AdapterId::Rack).unwrap().config_vars["RACK_ENV"],
            "staging"
        );
    }
}
