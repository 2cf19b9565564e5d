//! Change watcher.
//!
//! Keeps price markup that appears after the first render converted. The host
//! drives the watcher: notifications schedule one debounced scan and
//! [`ChangeWatcher::poll`] runs it once it is due.
//!
//! ```text
//!          notify_*                     poll (due)
//!   Idle ───────────> ScanScheduled ─────────────> Scanning ──> Idle
//!                       │        ^
//!                       └────────┘ notify_*: merge triggers and regions,
//!                                  keep the later deadline
//! ```
//!
//! A scan never feeds itself: records produced by its own writes are dropped,
//! and converted elements carry a marker that stays current until something
//! below them is rewritten.
//!
//! Every conversion goes through the [`ActivationGate`]: while it is closed,
//! scans and manual conversions leave the document untouched.

use crate::config::{PRICE_UPDATE_SIGNAL, WatchConfig};
use crate::dom::{Document, MutationRecord, NodeId, Selector};
use crate::engine::Substituter;
use crate::error::DomError;
use crate::gate::{ActivationGate, CurrencyConfig};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

bitflags::bitflags! {
    /// Kinds of signal coalesced into a pending scan.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Triggers: u8 {
        const MUTATION        = 1 << 0;
        const PRICE_UPDATE    = 1 << 1;
        const CONTENT_UPDATED = 1 << 2;
        const CART_RESPONSE   = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    ScanScheduled { due: Instant, triggers: Triggers },
    /// Single-flight guard while a scan writes to the document.
    Scanning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Elements whose content went through the engine.
    pub examined: usize,
    /// Elements whose content was replaced.
    pub rewritten: usize,
    /// Candidates that were detached or already carried a current marker.
    pub skipped: usize,
    pub classes_added: usize,
    /// Empty for the initial scan and for manual conversions.
    pub triggers: Triggers,
}

impl ScanOutcome {
    fn untouched(triggers: Triggers) -> Self {
        ScanOutcome { examined: 0, rewritten: 0, skipped: 0, classes_added: 0, triggers }
    }
}

/// Side table of processed elements and their subtree revision at the time.
#[derive(Debug, Default)]
struct ProcessedMarkers(HashMap<NodeId, u64>);

impl ProcessedMarkers {
    fn is_current(&self, doc: &Document, id: NodeId) -> bool {
        self.0.get(&id).is_some_and(|&rev| rev == doc.subtree_rev(id))
    }

    fn mark(&mut self, doc: &Document, id: NodeId) {
        self.0.insert(id, doc.subtree_rev(id));
    }

    /// Markers live as long as their element stays in the document.
    fn prune(&mut self, doc: &Document) {
        self.0.retain(|&id, _| doc.is_attached(id));
    }
}

pub struct ChangeWatcher<'a, C> {
    engine: &'a Substituter,
    gate: ActivationGate<C>,
    selectors: Vec<Selector>,
    cart_paths: Vec<String>,
    signals: Vec<String>,
    mutation_delay: Duration,
    signal_delay: Duration,
    cart_delay: Duration,
    container_class: String,
    state: WatcherState,
    regions: Vec<NodeId>,
    markers: ProcessedMarkers,
    degraded: bool,
    scans: usize,
}

impl<'a, C: CurrencyConfig> ChangeWatcher<'a, C> {
    pub fn new(
        engine: &'a Substituter,
        gate: ActivationGate<C>,
        watch: &WatchConfig,
        container_class: impl Into<String>,
    ) -> Result<Self, DomError> {
        Ok(ChangeWatcher {
            engine,
            gate,
            selectors: Selector::parse_all(&watch.price_selectors)?,
            cart_paths: watch.cart_paths.clone(),
            signals: watch.signals.clone(),
            mutation_delay: watch.mutation_delay(),
            signal_delay: watch.signal_delay(),
            cart_delay: watch.cart_delay(),
            container_class: container_class.into(),
            state: WatcherState::Idle,
            regions: Vec::new(),
            markers: ProcessedMarkers::default(),
            degraded: false,
            scans: 0,
        })
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// True when the host could not observe mutations; only the initial scan ran.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Scans that ran with the gate open.
    pub fn scan_count(&self) -> usize {
        self.scans
    }

    pub fn gate(&self) -> &ActivationGate<C> {
        &self.gate
    }

    pub fn next_due(&self) -> Option<Instant> {
        match self.state {
            WatcherState::ScanScheduled { due, .. } => Some(due),
            _ => None,
        }
    }

    /// Run the initial full scan, then start observing the document root.
    /// Observation starts even while the gate is closed.
    pub fn attach(&mut self, doc: &mut Document) -> ScanOutcome {
        let outcome = self.run_scan(doc, Triggers::empty(), Vec::new());
        let root = doc.root();
        if let Err(err) = doc.observe(root) {
            self.degraded = true;
            tracing::debug!(error = %err, "no mutation observation; only the initial scan runs");
        }
        outcome
    }

    /// Schedule a region scan for inserted price markup. Returns whether any
    /// record qualified.
    pub fn notify_mutations(&mut self, records: &[MutationRecord], doc: &Document, now: Instant) -> bool {
        if self.degraded {
            return false;
        }
        let regions: Vec<NodeId> = records
            .iter()
            .flat_map(|record| record.added.iter().copied())
            .filter(|&node| doc.is_element(node) && !doc.select_all(node, &self.selectors).is_empty())
            .collect();
        if regions.is_empty() {
            return false;
        }
        self.schedule(Triggers::MUTATION, self.mutation_delay, regions, now);
        true
    }

    /// Schedule a full scan for a configured application signal.
    pub fn notify_signal(&mut self, name: &str, now: Instant) -> bool {
        if self.degraded || !self.signals.iter().any(|s| s == name) {
            return false;
        }
        let trigger = if name == PRICE_UPDATE_SIGNAL { Triggers::PRICE_UPDATE } else { Triggers::CONTENT_UPDATED };
        self.schedule(trigger, self.signal_delay, Vec::new(), now);
        true
    }

    /// Schedule a full scan after a completed cart/checkout response.
    pub fn notify_response(&mut self, url: &str, now: Instant) -> bool {
        if self.degraded || !self.is_cart_related_url(url) {
            return false;
        }
        self.schedule(Triggers::CART_RESPONSE, self.cart_delay, Vec::new(), now);
        true
    }

    pub fn is_cart_related_url(&self, url: &str) -> bool {
        self.cart_paths.iter().any(|path| !path.is_empty() && url.contains(path.as_str()))
    }

    /// Run the pending scan if it is due. The scan sees the document as it is now.
    pub fn poll(&mut self, doc: &mut Document, now: Instant) -> Option<ScanOutcome> {
        let WatcherState::ScanScheduled { due, triggers } = self.state else {
            return None;
        };
        if now < due {
            return None;
        }
        let regions = std::mem::take(&mut self.regions);
        Some(self.run_scan(doc, triggers, regions))
    }

    /// Feed the document's pending mutation records in, then poll.
    pub fn pump(&mut self, doc: &mut Document, now: Instant) -> Option<ScanOutcome> {
        let records = doc.take_records();
        self.notify_mutations(&records, doc, now);
        self.poll(doc, now)
    }

    /// Convert one element on demand, whether or not it matches a price
    /// selector. Honors the gate and the element's marker; the write is
    /// reported to observers like any other.
    pub fn convert_element(&mut self, doc: &mut Document, id: NodeId) -> Result<ScanOutcome, DomError> {
        if !doc.is_element(id) {
            return Err(DomError::UnknownNode(id.index()));
        }
        let mut outcome = ScanOutcome::untouched(Triggers::empty());
        if !self.gate.should_substitute() {
            return Ok(outcome);
        }
        if !doc.is_attached(id) || self.markers.is_current(doc, id) {
            outcome.skipped += 1;
            return Ok(outcome);
        }
        self.convert(doc, id, &mut outcome);
        Ok(outcome)
    }

    fn schedule(&mut self, trigger: Triggers, delay: Duration, regions: Vec<NodeId>, now: Instant) {
        let deadline = now + delay;
        let (due, triggers) = match self.state {
            WatcherState::ScanScheduled { due, triggers } => {
                tracing::debug!(pending = ?triggers, incoming = ?trigger, "coalescing into pending scan");
                (due.max(deadline), triggers | trigger)
            }
            WatcherState::Idle | WatcherState::Scanning => {
                tracing::debug!(?trigger, ?delay, "scan scheduled");
                (deadline, trigger)
            }
        };
        self.regions.extend(regions);
        self.state = WatcherState::ScanScheduled { due, triggers };
    }

    fn run_scan(&mut self, doc: &mut Document, triggers: Triggers, regions: Vec<NodeId>) -> ScanOutcome {
        let mut outcome = ScanOutcome::untouched(triggers);
        if !self.gate.should_substitute() {
            self.state = WatcherState::Idle;
            tracing::debug!(?triggers, "gate closed; scan skipped");
            return outcome;
        }
        self.state = WatcherState::Scanning;

        let candidates = if triggers == Triggers::MUTATION {
            self.region_candidates(doc, &regions)
        } else {
            doc.select_all(doc.root(), &self.selectors)
        };

        for id in candidates {
            if !doc.is_attached(id) || self.markers.is_current(doc, id) {
                outcome.skipped += 1;
                continue;
            }
            self.convert(doc, id, &mut outcome);
        }

        // Our own writes are not news.
        doc.take_records();
        self.markers.prune(doc);
        self.scans += 1;
        self.state = WatcherState::Idle;

        tracing::debug!(
            scan = self.scans,
            ?triggers,
            examined = outcome.examined,
            rewritten = outcome.rewritten,
            skipped = outcome.skipped,
            "scan finished"
        );
        outcome
    }

    /// Matching ancestors-or-self (below the root) and matching descendants of
    /// each attached region, in document order.
    fn region_candidates(&self, doc: &Document, regions: &[NodeId]) -> Vec<NodeId> {
        let root = doc.root();
        let mut wanted = HashSet::new();
        for &region in regions.iter().filter(|&&r| doc.is_attached(r)) {
            let upward = std::iter::once(region).chain(doc.ancestors(region).into_iter().take_while(|&id| id != root));
            wanted.extend(upward.filter(|&id| self.is_price_element(doc, id)));
            wanted.extend(doc.select_all(region, &self.selectors));
        }
        doc.select_all(root, &self.selectors).into_iter().filter(|id| wanted.contains(id)).collect()
    }

    fn convert(&mut self, doc: &mut Document, id: NodeId, outcome: &mut ScanOutcome) {
        outcome.examined += 1;
        let current = doc.inner_html(id);
        let converted = self.engine.substitute(&current);
        let rewritten = converted != current;

        if rewritten {
            if let Err(err) = doc.set_inner_html(id, &converted) {
                tracing::debug!(node = id.index(), error = %err, "rewrite failed");
                return;
            }
            outcome.rewritten += 1;
        }
        if doc.add_class(id, &self.container_class).unwrap_or(false) {
            outcome.classes_added += 1;
        }

        if rewritten {
            let fresh: Vec<NodeId> =
                doc.descendants(id).into_iter().filter(|&d| self.is_price_element(doc, d)).collect();
            for child in fresh {
                if doc.is_attached(child) && !self.markers.is_current(doc, child) {
                    self.convert(doc, child, outcome);
                }
            }
        }
        self.markers.mark(doc, id);
    }

    fn is_price_element(&self, doc: &Document, id: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(doc, id))
    }
}
