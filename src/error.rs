//! Error types.
//!
//! Nothing here is fatal to a host page: lookup failures are absorbed by the
//! activation gate, a missing observer downgrades the watcher, and table or
//! config errors surface only when the caller builds an engine.

use std::path::PathBuf;

/// Failure reported by a store/currency collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("store is unavailable: {0}")]
    StoreUnavailable(String),
    #[error("unknown store scope '{0}'")]
    UnknownScope(String),
}

/// A symbol table that would break the substitution invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("symbol table has no currencies")]
    NoCurrencies,
    #[error("currency '{code}' has an empty variant")]
    EmptyVariant { code: String },
    #[error("currency '{code}' has no variants")]
    NoVariants { code: String },
    #[error("variant '{inner}' overlaps variant '{outer}'")]
    OverlappingVariants { outer: String, inner: String },
    #[error("currency '{0}' is declared twice")]
    DuplicateCurrency(String),
    #[error("invalid fragment class '{0}'")]
    InvalidClass(String),
    #[error("noise suffix at position {0} is empty")]
    EmptyNoise(usize),
    #[error("pattern '{pattern}' failed to compile: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("mutation observation is not available in this host")]
    ObserverUnavailable,
    #[error("node {0} does not exist")]
    UnknownNode(usize),
    #[error("unsupported selector '{0}'")]
    InvalidSelector(String),
}
