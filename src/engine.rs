//! Substitution engine.
//!
//! This module is the *public entry point* for the symbol rewrite. It is split
//! into focused submodules under `src/engine/`, all reached through
//! [`Substituter`].
//!
//! ## How the parts work together
//!
//! ```text
//! SymbolTable ──┐
//!               │  CompiledPatterns::new         (compiled_patterns.rs)
//!               └───────────────┬──────────────
//!                               │
//! markup ── segment ────────────┼─ Text / Markup / Fragment segments
//!           (substitute.rs)     │
//!                               v
//!                     apply patterns in order (substitute.rs)
//!                       - Text segments only
//!                       - each hit becomes a Fragment segment
//!                               │
//!                               v
//!                     normalize to fixpoint (normalize.rs)
//!                       - strip noise trailing a Fragment
//!                               │
//!                               v
//!                     render: every Fragment emitted canonically
//! ```
//!
//! Markup (tags, comments, script/style bodies) is never rewritten, so a
//! variant appearing inside an attribute value survives untouched. Fragments
//! already present in the input are recognized and re-emitted in canonical
//! form, which is what makes the transformation idempotent and repairs empty
//! fragment shells.
//!
//! ## Responsibilities by module
//!
//! - `compiled_patterns.rs`: expands the table into ordered, escaped patterns
//!   and builds the segment tokenizer.
//! - `substitute.rs`: segmentation, pattern application and rendering.
//! - `normalize.rs`: the trailing-noise fixpoint pass.
//! - `metrics.rs`: the optional [`SubstitutionReport`].
//!
//! ## Debugging
//!
//! The engine emits `tracing` events at `trace` level for every pattern hit.

#[path = "engine/compiled_patterns.rs"]
mod compiled_patterns;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/normalize.rs"]
mod normalize;
#[path = "engine/substitute.rs"]
mod substitute;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub use compiled_patterns::{CompiledPattern, CompiledPatterns};
pub use metrics::{PatternHits, SubstitutionReport};
pub use substitute::Substituter;
