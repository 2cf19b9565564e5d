//! Substitution report.
//!
//! [`Substituter::substitute`](super::Substituter::substitute) is the hot
//! path and collects nothing.
//! [`Substituter::substitute_with_report`](super::Substituter::substitute_with_report)
//! runs the same pipeline and additionally records what each stage did. This
//! is used by the CLI report and by tests that need to see *why* an output
//! looks the way it does.
//!
//! `hits` lists only patterns that matched at least once, in pattern order.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternHits {
    pub label: String,
    pub hits: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SubstitutionReport {
    pub output: String,
    pub hits: Vec<PatternHits>,
    /// Total fragments inserted for variant occurrences.
    pub replacements: usize,
    /// Number of normalize passes, including the final no-change pass.
    pub normalize_passes: usize,
    /// Bytes of trailing noise removed after fragments.
    pub noise_trimmed: usize,
    /// Pre-existing fragments whose content was not the canonical glyph.
    pub fragments_repaired: usize,
    pub elapsed: Duration,
}

impl SubstitutionReport {
    pub fn changed(&self, input: &str) -> bool {
        self.output != input
    }
}
