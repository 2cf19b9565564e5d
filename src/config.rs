//! Configuration.
//!
//! Everything the engine, gate and watcher need can be described in one JSON
//! document. Missing fields fall back to the built-in Saudi Riyal setup, so an
//! empty object `{}` is a valid config.
//!
//! ```json
//! {
//!   "target_currency": "SAR",
//!   "store": { "current_currency": "SAR", "enabled": true,
//!              "scopes": { "en": { "currency": "USD" } } },
//!   "watch": { "price_selectors": [".price", ".amount"], "cart_delay_ms": 300 }
//! }
//! ```

use crate::engine::Substituter;
use crate::error::{ConfigError, TableError};
use crate::gate::{ScopeSettings, StaticStore};
use crate::symbols::{
    CanonicalFragment, CurrencySymbol, DEFAULT_NOISE, SAR_CODE, SAR_CONTAINER_CLASS, SAR_FRAGMENT_CLASS, SAR_GLYPH,
    SAR_VARIANTS, SymbolTable,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const PRICE_SELECTORS: &[&str] = &[
    ".price",
    ".price-box",
    ".price-wrapper",
    ".product-price",
    ".cart-summary",
    ".checkout-summary",
    ".minicart",
    ".totals",
    ".amount",
];

pub const CART_PATHS: &[&str] = &["checkout/cart", "checkout/sidebar", "customer/section/load"];

pub const CONTENT_UPDATED_SIGNAL: &str = "contentUpdated";
pub const PRICE_UPDATE_SIGNAL: &str = "updatePrice";
pub const PRICE_SIGNALS: &[&str] = &[CONTENT_UPDATED_SIGNAL, PRICE_UPDATE_SIGNAL];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Currency whose variants are rewritten when it is active.
    pub target_currency: String,
    /// Class added to price containers once they have been converted.
    pub container_class: String,
    pub symbols: Vec<SymbolConfig>,
    pub noise: Vec<String>,
    pub store: StoreConfig,
    pub watch: WatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target_currency: SAR_CODE.to_string(),
            container_class: SAR_CONTAINER_CLASS.to_string(),
            symbols: vec![SymbolConfig::default()],
            noise: strings(DEFAULT_NOISE),
            store: StoreConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    pub code: String,
    pub variants: Vec<String>,
    pub class: String,
    pub glyph: char,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        SymbolConfig {
            code: SAR_CODE.to_string(),
            variants: strings(SAR_VARIANTS),
            class: SAR_FRAGMENT_CLASS.to_string(),
            glyph: SAR_GLYPH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub current_currency: String,
    pub enabled: bool,
    pub scopes: HashMap<String, ScopeSettings>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig { current_currency: SAR_CODE.to_string(), enabled: true, scopes: HashMap::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub price_selectors: Vec<String>,
    pub cart_paths: Vec<String>,
    /// Application signal names that mean "prices may have changed".
    pub signals: Vec<String>,
    pub mutation_delay_ms: u64,
    pub signal_delay_ms: u64,
    pub cart_delay_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            price_selectors: strings(PRICE_SELECTORS),
            cart_paths: strings(CART_PATHS),
            signals: strings(PRICE_SIGNALS),
            mutation_delay_ms: 100,
            signal_delay_ms: 100,
            cart_delay_ms: 500,
        }
    }
}

impl WatchConfig {
    pub fn mutation_delay(&self) -> Duration {
        Duration::from_millis(self.mutation_delay_ms)
    }

    pub fn signal_delay(&self) -> Duration {
        Duration::from_millis(self.signal_delay_ms)
    }

    pub fn cart_delay(&self) -> Duration {
        Duration::from_millis(self.cart_delay_ms)
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), target = %config.target_currency, "loaded config");
        Ok(config)
    }

    /// Parse and validate: a config whose symbol table is invalid is rejected
    /// here rather than when the first engine is built.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(raw)?;
        config.symbol_table()?;
        Ok(config)
    }

    pub fn symbol_table(&self) -> Result<SymbolTable, TableError> {
        let currencies = self
            .symbols
            .iter()
            .map(|s| {
                Ok(CurrencySymbol {
                    code: s.code.clone(),
                    variants: s.variants.clone(),
                    fragment: CanonicalFragment::new(s.class.clone(), s.glyph)?,
                })
            })
            .collect::<Result<Vec<_>, TableError>>()?;
        SymbolTable::new(currencies, self.noise.clone())
    }

    pub fn substituter(&self) -> Result<Substituter, TableError> {
        Substituter::new(self.symbol_table()?)
    }

    pub fn store(&self) -> StaticStore {
        StaticStore {
            target_currency: self.target_currency.clone(),
            current_currency: self.store.current_currency.clone(),
            enabled: self.store.enabled,
            scopes: self.store.scopes.clone(),
        }
    }
}
