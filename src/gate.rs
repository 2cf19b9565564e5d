//! Activation gate.
//!
//! Decides whether substitution runs at all. The gate consults two
//! collaborator answers for the current store scope: is the feature enabled,
//! and is the active currency the target currency. It fails closed: a lookup
//! error means "do not substitute" and is logged, never propagated, so a broken
//! store lookup cannot take unrelated rendering down with it.

use crate::error::LookupError;
use std::collections::HashMap;

/// Store/currency collaborator.
pub trait CurrencyConfig {
    fn is_target_currency_active(&self, scope: Option<&str>) -> Result<bool, LookupError>;
    fn is_feature_enabled(&self, scope: Option<&str>) -> Result<bool, LookupError>;
}

impl<T: CurrencyConfig + ?Sized> CurrencyConfig for &T {
    fn is_target_currency_active(&self, scope: Option<&str>) -> Result<bool, LookupError> {
        (**self).is_target_currency_active(scope)
    }

    fn is_feature_enabled(&self, scope: Option<&str>) -> Result<bool, LookupError> {
        (**self).is_feature_enabled(scope)
    }
}

#[derive(Debug, Clone)]
pub struct ActivationGate<C> {
    source: C,
    scope: Option<String>,
}

impl<C: CurrencyConfig> ActivationGate<C> {
    pub fn new(source: C) -> Self {
        ActivationGate { source, scope: None }
    }

    /// Evaluate against a specific store scope instead of the default one.
    pub fn for_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn should_substitute(&self) -> bool {
        self.check(|c, scope| c.is_feature_enabled(scope)) && self.is_target_active()
    }

    /// Currency check alone, ignoring the feature flag.
    pub fn is_target_active(&self) -> bool {
        self.check(|c, scope| c.is_target_currency_active(scope))
    }

    fn check(&self, lookup: impl FnOnce(&C, Option<&str>) -> Result<bool, LookupError>) -> bool {
        match lookup(&self.source, self.scope.as_deref()) {
            Ok(active) => active,
            Err(err) => {
                tracing::warn!(scope = ?self.scope, error = %err, "currency lookup failed; leaving symbols unchanged");
                false
            }
        }
    }
}

/// Settings that override the store defaults for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScopeSettings {
    pub currency: Option<String>,
    pub enabled: Option<bool>,
}

/// In-memory store: a default currency and flag plus per-scope overrides.
///
/// Unknown scopes are lookup errors, which the gate turns into "inactive".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticStore {
    pub target_currency: String,
    pub current_currency: String,
    pub enabled: bool,
    pub scopes: HashMap<String, ScopeSettings>,
}

impl StaticStore {
    pub fn new(target_currency: impl Into<String>, current_currency: impl Into<String>, enabled: bool) -> Self {
        StaticStore {
            target_currency: target_currency.into(),
            current_currency: current_currency.into(),
            enabled,
            scopes: HashMap::new(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>, settings: ScopeSettings) -> Self {
        self.scopes.insert(scope.into(), settings);
        self
    }

    fn settings(&self, scope: Option<&str>) -> Result<Option<&ScopeSettings>, LookupError> {
        match scope {
            None => Ok(None),
            Some(id) => self.scopes.get(id).map(Some).ok_or_else(|| LookupError::UnknownScope(id.to_string())),
        }
    }

    pub fn current_currency(&self, scope: Option<&str>) -> Result<&str, LookupError> {
        let overridden = self.settings(scope)?.and_then(|s| s.currency.as_deref());
        Ok(overridden.unwrap_or(self.current_currency.as_str()))
    }
}

impl CurrencyConfig for StaticStore {
    fn is_target_currency_active(&self, scope: Option<&str>) -> Result<bool, LookupError> {
        Ok(self.current_currency(scope)? == self.target_currency)
    }

    fn is_feature_enabled(&self, scope: Option<&str>) -> Result<bool, LookupError> {
        Ok(self.settings(scope)?.and_then(|s| s.enabled).unwrap_or(self.enabled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Failing;

    impl CurrencyConfig for Failing {
        fn is_target_currency_active(&self, _: Option<&str>) -> Result<bool, LookupError> {
            Err(LookupError::StoreUnavailable("database offline".into()))
        }

        fn is_feature_enabled(&self, _: Option<&str>) -> Result<bool, LookupError> {
            Ok(true)
        }
    }

    /// Counts currency lookups so the short-circuit can be observed.
    struct Counting {
        enabled: bool,
        lookups: Cell<usize>,
    }

    impl CurrencyConfig for Counting {
        fn is_target_currency_active(&self, _: Option<&str>) -> Result<bool, LookupError> {
            self.lookups.set(self.lookups.get() + 1);
            Ok(true)
        }

        fn is_feature_enabled(&self, _: Option<&str>) -> Result<bool, LookupError> {
            Ok(self.enabled)
        }
    }

    #[test]
    fn requires_both_flag_and_currency() {
        assert!(ActivationGate::new(StaticStore::new("SAR", "SAR", true)).should_substitute());
        assert!(!ActivationGate::new(StaticStore::new("SAR", "USD", true)).should_substitute());
        assert!(!ActivationGate::new(StaticStore::new("SAR", "SAR", false)).should_substitute());
    }

    #[test]
    fn fails_closed_on_lookup_error() {
        let gate = ActivationGate::new(Failing);
        assert!(!gate.should_substitute());
        assert!(!gate.is_target_active());
    }

    #[test]
    fn disabled_feature_skips_currency_lookup() {
        let source = Counting { enabled: false, lookups: Cell::new(0) };
        let gate = ActivationGate::new(&source);
        assert!(!gate.should_substitute());
        assert_eq!(source.lookups.get(), 0);
    }

    #[test]
    fn scopes_override_defaults() {
        let store = StaticStore::new("SAR", "SAR", true)
            .with_scope("en", ScopeSettings { currency: Some("USD".into()), enabled: None })
            .with_scope("ar", ScopeSettings { currency: None, enabled: Some(false) });

        assert!(ActivationGate::new(&store).should_substitute());
        assert!(!ActivationGate::new(&store).for_scope("en").should_substitute());
        assert!(!ActivationGate::new(&store).for_scope("ar").should_substitute());
        assert!(ActivationGate::new(&store).for_scope("ar").is_target_active());
        assert!(!ActivationGate::new(&store).for_scope("missing").should_substitute());
        assert_eq!(store.current_currency(Some("en")), Ok("USD"));
    }
}
