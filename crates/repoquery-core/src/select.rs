//! Suitable-provider selection and the default provider

use std::sync::Arc;

use tracing::warn;

use crate::env::Environment;
use crate::provider::Provider;
use crate::registry::ProviderRegistry;

impl ProviderRegistry {
    /// Providers usable in this environment, in enumeration order.
    ///
    /// Test-only registrations are excluded. An empty registry asks the
    /// loader for everything first, like [`ProviderRegistry::list`].
    pub fn suitable_providers(&mut self) -> Vec<Arc<Provider>> {
        self.load_all_if_empty();
        self.providers
            .values()
            .filter(|provider| provider.is_suitable(&self.env) && !provider.is_test_only())
            .cloned()
            .collect()
    }

    /// The provider queries go to when none is named.
    ///
    /// Suitable providers claiming this OS as their default compete first;
    /// when none claims it, every suitable provider competes. The most
    /// specific candidate wins, and on a tie the earliest registered wins
    /// with a warning. The choice is memoized until the winning
    /// registration is replaced or removed.
    pub fn default_provider(&mut self) -> Option<Arc<Provider>> {
        if let Some(default) = &self.default {
            return Some(Arc::clone(default));
        }

        let suitable = self.suitable_providers();
        let chosen = choose_default(&suitable, &self.env)?;
        self.default = Some(Arc::clone(&chosen));
        Some(chosen)
    }
}

fn choose_default(suitable: &[Arc<Provider>], env: &Environment) -> Option<Arc<Provider>> {
    let defaults: Vec<&Arc<Provider>> = suitable
        .iter()
        .filter(|provider| provider.is_default_for(env))
        .collect();
    let pool: Vec<&Arc<Provider>> = if defaults.is_empty() {
        suitable.iter().collect()
    } else {
        defaults
    };

    let max = pool.iter().map(|provider| provider.specificity()).max()?;
    let winners: Vec<&Arc<Provider>> = pool
        .into_iter()
        .filter(|provider| provider.specificity() == max)
        .collect();

    if winners.len() > 1 {
        let names = winners
            .iter()
            .map(|provider| provider.name().as_str())
            .collect::<Vec<_>>()
            .join(", ");
        warn!(
            "found multiple default providers: {names}; using {}",
            winners[0].name()
        );
    }

    winners.first().map(|provider| Arc::clone(provider))
}
