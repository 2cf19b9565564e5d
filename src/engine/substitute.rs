//! Segmentation, pattern application and rendering.
//!
//! The engine never runs a regex over raw outer markup. Input is first split
//! into segments:
//!
//! ```text
//! <b title="SAR">100 SAR.</b><span class="saudi-riyal-symbol"></span>
//! └─ Markup ────┘└ Text ─┘└Markup┘└─ Fragment (repaired: empty) ────┘
//! ```
//!
//! Patterns are applied to `Text` segments only; every hit is cut out and
//! replaced by a `Fragment` segment. After normalization the segments are
//! rendered back, with each `Fragment` emitted in canonical form.

use super::compiled_patterns::{CompiledPattern, CompiledPatterns};
use super::metrics::{PatternHits, SubstitutionReport};
use super::normalize::{NormalizeStats, normalize};
use crate::error::TableError;
use crate::symbols::SymbolTable;
use once_cell::sync::Lazy;
use std::time::Instant;

static SAUDI_RIYAL: Lazy<Substituter> =
    Lazy::new(|| Substituter::new(SymbolTable::saudi_riyal()).expect("built-in symbol table compiles"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Text(String),
    Markup(String),
    Fragment { currency: usize, repaired: bool },
}

/// Rewrites currency variants in markup into canonical fragments.
///
/// The substituter is ungated: it always rewrites. Callers decide whether it
/// should run at all (see [`crate::ActivationGate`]).
///
/// ```
/// use riyal_glyph::Substituter;
///
/// let engine = Substituter::saudi_riyal();
/// let out = engine.substitute("100 \u{FDFC}.");
/// assert_eq!(out, "100 <span class=\"saudi-riyal-symbol\">&#xE900;</span>");
/// assert_eq!(engine.substitute(&out), out);
/// ```
#[derive(Debug, Clone)]
pub struct Substituter {
    table: SymbolTable,
    compiled: CompiledPatterns,
}

impl Substituter {
    pub fn new(table: SymbolTable) -> Result<Self, TableError> {
        let compiled = CompiledPatterns::new(&table)?;
        Ok(Substituter { table, compiled })
    }

    /// Shared engine for the built-in Saudi Riyal table.
    pub fn saudi_riyal() -> &'static Substituter {
        &SAUDI_RIYAL
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn patterns(&self) -> &CompiledPatterns {
        &self.compiled
    }

    /// Canonical fragment markup for `code`, if the table knows it.
    pub fn fragment_html(&self, code: &str) -> Option<String> {
        self.table.currency(code).map(|c| c.fragment.html())
    }

    pub fn substitute(&self, markup: &str) -> String {
        if markup.is_empty() {
            return String::new();
        }
        let mut segments = self.segment(markup);
        for pattern in &self.compiled.patterns {
            apply_pattern(&mut segments, pattern);
        }
        normalize(&mut segments);
        self.render(&segments)
    }

    /// Same pipeline as [`substitute`](Self::substitute), with a report.
    pub fn substitute_with_report(&self, markup: &str) -> SubstitutionReport {
        let start = Instant::now();
        if markup.is_empty() {
            return SubstitutionReport { elapsed: start.elapsed(), ..Default::default() };
        }

        let mut segments = self.segment(markup);
        let fragments_repaired =
            segments.iter().filter(|s| matches!(s, Segment::Fragment { repaired: true, .. })).count();

        let mut hits = Vec::new();
        for pattern in &self.compiled.patterns {
            let count = apply_pattern(&mut segments, pattern);
            if count > 0 {
                hits.push(PatternHits { label: pattern.label.clone(), hits: count });
            }
        }
        let NormalizeStats { passes, trimmed } = normalize(&mut segments);

        SubstitutionReport {
            output: self.render(&segments),
            replacements: hits.iter().map(|h| h.hits).sum(),
            hits,
            normalize_passes: passes,
            noise_trimmed: trimmed,
            fragments_repaired,
            elapsed: start.elapsed(),
        }
    }

    /// Only the cleanup half: canonicalize existing fragments and strip the
    /// noise trailing them, without touching variant text.
    pub fn normalize(&self, markup: &str) -> String {
        let mut segments = self.segment(markup);
        normalize(&mut segments);
        self.render(&segments)
    }

    pub(crate) fn segment(&self, markup: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in self.compiled.tokenizer.captures_iter(markup) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                segments.push(Segment::Text(markup[last..whole.start()].to_string()));
            }

            let fragment = caps.name("frag").and_then(|_| {
                let class = caps.name("class")?.as_str();
                let content = caps.name("content").map_or("", |c| c.as_str());
                let currency = self.table.currencies().iter().position(|c| c.fragment.class() == class)?;
                let repaired = content != self.table.fragment(currency).glyph_entity();
                Some(Segment::Fragment { currency, repaired })
            });
            segments.push(fragment.unwrap_or_else(|| Segment::Markup(whole.as_str().to_string())));
            last = whole.end();
        }

        if last < markup.len() {
            segments.push(Segment::Text(markup[last..].to_string()));
        }
        segments
    }

    fn render(&self, segments: &[Segment]) -> String {
        let mut out = String::new();
        for segment in segments {
            match segment {
                Segment::Text(text) | Segment::Markup(text) => out.push_str(text),
                Segment::Fragment { currency, .. } => out.push_str(&self.table.fragment(*currency).html()),
            }
        }
        out
    }
}

/// Replace every hit of `pattern` inside text segments; returns the hit count.
fn apply_pattern(segments: &mut Vec<Segment>, pattern: &CompiledPattern) -> usize {
    let mut hits = 0;
    let mut out = Vec::with_capacity(segments.len());

    for segment in segments.drain(..) {
        let text = match segment {
            Segment::Text(text) => text,
            other => {
                out.push(other);
                continue;
            }
        };

        let mut last = 0;
        for m in pattern.regex.find_iter(&text) {
            if m.start() > last {
                out.push(Segment::Text(text[last..m.start()].to_string()));
            }
            out.push(Segment::Fragment { currency: pattern.currency, repaired: false });
            last = m.end();
            hits += 1;
        }
        if last == 0 {
            out.push(Segment::Text(text));
        } else if last < text.len() {
            out.push(Segment::Text(text[last..].to_string()));
        }
    }

    if hits > 0 {
        tracing::trace!(pattern = %pattern.label, hits, "variant pattern matched");
    }
    *segments = out;
    hits
}
