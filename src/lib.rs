//! Saudi Riyal symbol substitution.
//!
//! Storefronts print the riyal in several ways (`﷼`, `SAR`, `ر.س`), often with
//! trailing dots or right-to-left marks. This crate rewrites every such
//! rendering in a block of price markup into one canonical fragment that a
//! symbol font draws:
//!
//! ```
//! use riyal_glyph::{ActivationGate, PriceRenderer, StaticStore, Substituter, SymbolFormatter, SymbolPosition};
//!
//! let gate = ActivationGate::new(StaticStore::new("SAR", "SAR", true));
//! let formatter = SymbolFormatter::new("SAR", SymbolPosition::After);
//! let renderer = PriceRenderer::new(Substituter::saudi_riyal(), gate, formatter);
//!
//! assert_eq!(
//!     renderer.format_currency(1250.0, false, None),
//!     "1,250.00 <span class=\"saudi-riyal-symbol\">&#xE900;</span>"
//! );
//! ```
//!
//! Pieces:
//!
//! - [`Substituter`]: the pure, idempotent rewrite over a [`SymbolTable`].
//! - [`ActivationGate`]: runs the rewrite only while the feature is enabled and
//!   the store's currency is the target.
//! - [`PriceRenderer`]: server-side adapter around a [`PriceFormatter`].
//! - [`ChangeWatcher`]: converts price markup inserted into a [`Document`]
//!   after the first render.
//! - [`Config`]: JSON configuration for all of the above.

#[macro_use]
mod macros;
mod config;
mod dom;
mod engine;
mod error;
mod gate;
mod render;
mod symbols;
mod watcher;

pub use config::{
    CART_PATHS, CONTENT_UPDATED_SIGNAL, Config, PRICE_SELECTORS, PRICE_SIGNALS, PRICE_UPDATE_SIGNAL, StoreConfig,
    SymbolConfig, WatchConfig,
};
pub use dom::{Document, MutationRecord, NodeId, Selector};
pub use engine::{CompiledPattern, CompiledPatterns, PatternHits, SubstitutionReport, Substituter};
pub use error::{ConfigError, DomError, LookupError, TableError};
pub use gate::{ActivationGate, CurrencyConfig, ScopeSettings, StaticStore};
pub use render::{PriceFormatter, PriceRenderer, SymbolFormatter, SymbolPosition};
pub use symbols::{
    CanonicalFragment, CurrencySymbol, DEFAULT_NOISE, RLM, SAR_CODE, SAR_CONTAINER_CLASS, SAR_FRAGMENT_CLASS,
    SAR_GLYPH, SAR_VARIANTS, SymbolTable,
};
pub use watcher::{ChangeWatcher, ScanOutcome, Triggers, WatcherState};
