//! Pattern compilation.
//!
//! This module holds the *static* side of the engine: everything derived from
//! a [`SymbolTable`] once, before any markup is seen.
//!
//! ## Ordering
//!
//! For each currency (table order), for each variant (declaration order):
//!
//! 1. one pattern per noise suffix, longest suffix first;
//! 2. the bare variant last.
//!
//! Later patterns only catch what earlier, more specific ones left behind, so
//! the order is the sole source of precedence. Sorting is stable: suffixes of
//! equal length keep their configured order.
//!
//! ```text
//! variant "SAR", noise [".", "&nbsp;.", " ."]
//!   -> "SAR&nbsp;."  "SAR ."  "SAR."  "SAR"
//! ```
//!
//! ## Invariants
//!
//! - Every pattern is `regex::escape`d, so `.` in `ر.س` or in a noise suffix is
//!   literal.
//! - `CompiledPattern::currency` indexes into `SymbolTable::currencies`.

use crate::error::TableError;
use crate::symbols::SymbolTable;
use regex::Regex;
use std::cmp::Reverse;

/// A single literal match rule and the fragment it produces.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Human-readable form, e.g. `SAR&nbsp;.` or `﷼.\u{200f}`.
    pub label: String,
    pub regex: Regex,
    /// Index of the currency whose fragment replaces a hit.
    pub currency: usize,
    /// True for the bare-variant pattern that closes each variant's group.
    pub bare: bool,
}

/// The ordered pattern list plus the segment tokenizer for one table.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub patterns: Vec<CompiledPattern>,
    /// Splits markup into existing fragments, opaque markup and text.
    pub(crate) tokenizer: Regex,
}

impl CompiledPatterns {
    pub fn new(table: &SymbolTable) -> Result<Self, TableError> {
        let noise = ordered_noise(table.noise());
        let mut patterns = Vec::new();

        for (currency, symbol) in table.currencies().iter().enumerate() {
            for variant in &symbol.variants {
                for suffix in &noise {
                    patterns.push(CompiledPattern {
                        label: format!("{variant}{}", suffix.escape_debug()),
                        regex: literal(&format!("{variant}{suffix}"))?,
                        currency,
                        bare: false,
                    });
                }
                patterns.push(CompiledPattern {
                    label: variant.clone(),
                    regex: literal(variant)?,
                    currency,
                    bare: true,
                });
            }
        }

        let classes: Vec<String> =
            table.currencies().iter().map(|c| regex::escape(c.fragment.class())).collect();
        let tokenizer = build_tokenizer(&classes.join("|"))?;

        Ok(CompiledPatterns { patterns, tokenizer })
    }

    pub fn labels(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.label.as_str()).collect()
    }
}

/// Noise suffixes sorted longest-first by character count (stable).
pub(crate) fn ordered_noise(noise: &[String]) -> Vec<&str> {
    let mut ordered: Vec<&str> = noise.iter().map(String::as_str).collect();
    ordered.sort_by_key(|n| Reverse(n.chars().count()));
    ordered
}

fn literal(text: &str) -> Result<Regex, TableError> {
    let pattern = regex::escape(text);
    Regex::new(&pattern).map_err(|err| TableError::InvalidPattern { pattern, reason: err.to_string() })
}

fn build_tokenizer(classes: &str) -> Result<Regex, TableError> {
    let pattern = format!(
        concat!(
            r#"(?s)(?P<frag><span class="(?P<class>{classes})">(?P<content>[^<]*)</span>)"#,
            r#"|<!--.*?-->"#,
            r#"|<(?i:script)\b[^>]*>.*?</(?i:script)\s*>"#,
            r#"|<(?i:style)\b[^>]*>.*?</(?i:style)\s*>"#,
            r#"|<[A-Za-z/!?][^>"']*(?:(?:"[^"]*"|'[^']*')[^>"']*)*>"#,
        ),
        classes = classes
    );
    Regex::new(&pattern).map_err(|err| TableError::InvalidPattern { pattern, reason: err.to_string() })
}
