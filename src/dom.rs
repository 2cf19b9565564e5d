//! Minimal document model for the change watcher.
//!
//! An arena of nodes addressed by [`NodeId`]. Ids are never reused: nodes
//! replaced by [`Document::set_inner_html`] stay in the arena flagged as
//! detached, so ids held across a write remain safe to query.
//!
//! The arena only grows: each rewrite leaves the replaced subtree behind. A
//! document is meant to live as long as one page view; a host that keeps one
//! around for longer should re-parse it from [`Document::inner_html`] of the
//! root once [`Document::node_count`] gets large.
//!
//! Every content write bumps a document clock and stamps it on the written
//! element and all of its ancestors. [`Document::subtree_rev`] therefore tells
//! a caller whether anything below an element changed since it last looked.

#[path = "dom/html.rs"]
mod html;

use crate::error::DomError;
use html::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element { tag: String, attrs: Vec<(String, Option<String>)> },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rev: u64,
    attached: bool,
}

/// Child-list insertion under an observed root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
}

/// Node arena; detached nodes are kept, so it grows with every rewrite.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    observer_supported: bool,
    observed: Option<NodeId>,
    records: Vec<MutationRecord>,
    writes: u64,
    clock: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document: a single attached `<body>` root.
    pub fn new() -> Self {
        let body = Node {
            data: NodeData::Element { tag: "body".to_string(), attrs: Vec::new() },
            parent: None,
            children: Vec::new(),
            rev: 0,
            attached: true,
        };
        Document {
            nodes: vec![body],
            root: NodeId(0),
            observer_supported: true,
            observed: None,
            records: Vec::new(),
            writes: 0,
            clock: 0,
        }
    }

    /// Parse `html` as the body content. Parsing is not a write.
    pub fn parse(html: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root;
        doc.build(root, html);
        doc
    }

    /// Behave like a host without mutation observation: [`observe`](Self::observe) fails.
    pub fn without_observer(mut self) -> Self {
        self.observer_supported = false;
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Start recording child-list insertions anywhere under `target`.
    pub fn observe(&mut self, target: NodeId) -> Result<(), DomError> {
        self.ensure_element(target)?;
        if !self.observer_supported {
            return Err(DomError::ObserverUnavailable);
        }
        self.observed = Some(target);
        Ok(())
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    /// Attribute value; a bare attribute reads as `""`.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element { attrs, .. } => {
                attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_deref().unwrap_or(""))
            }
            _ => None,
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class").is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
    }

    /// Add `class` unless present; returns whether the element changed.
    ///
    /// Counts as a write, but produces no mutation record and leaves
    /// revisions alone: only child-list changes are observed.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<bool, DomError> {
        self.ensure_element(id)?;
        if self.has_class(id, class) {
            return Ok(false);
        }
        let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data else {
            return Ok(false);
        };
        match attrs.iter_mut().find(|(k, _)| k == "class") {
            Some((_, value)) => {
                let current = value.take().unwrap_or_default();
                let current = current.trim_end();
                *value = Some(if current.is_empty() { class.to_string() } else { format!("{current} {class}") });
            }
            None => attrs.push(("class".to_string(), Some(class.to_string()))),
        }
        self.writes += 1;
        Ok(true)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    /// Element descendants of `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if self.is_element(next) {
                out.push(next);
            }
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.attached)
    }

    /// Clock value of the last content write at or below `id`.
    pub fn subtree_rev(&self, id: NodeId) -> u64 {
        self.nodes.get(id.0).map_or(0, |n| n.rev)
    }

    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Arena size, detached nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Elements at or under `scope` matching any selector, in document order.
    pub fn select_all(&self, scope: NodeId, selectors: &[Selector]) -> Vec<NodeId> {
        std::iter::once(scope)
            .chain(self.descendants(scope))
            .filter(|&id| selectors.iter().any(|s| s.matches(self, id)))
            .collect()
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if id.0 < self.nodes.len() {
            self.write_node(id, &mut out);
        }
        out
    }

    /// Replace the children of `id`; returns the new top-level nodes.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        self.ensure_element(id)?;
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for child in old {
            self.detach(child);
        }
        let added = self.build(id, html);
        self.record_write(id, &added);
        Ok(added)
    }

    /// Append parsed `html` to the children of `id`; returns the new top-level nodes.
    pub fn append_html(&mut self, id: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        self.ensure_element(id)?;
        let added = self.build(id, html);
        self.record_write(id, &added);
        Ok(added)
    }

    fn ensure_element(&self, id: NodeId) -> Result<(), DomError> {
        if self.is_element(id) { Ok(()) } else { Err(DomError::UnknownNode(id.0)) }
    }

    fn is_observed(&self, target: NodeId) -> bool {
        self.observed.is_some_and(|observed| {
            self.is_attached(target) && (target == observed || self.ancestors(target).contains(&observed))
        })
    }

    fn record_write(&mut self, target: NodeId, added: &[NodeId]) {
        self.writes += 1;
        self.clock += 1;
        let clock = self.clock;

        let mut current = Some(target);
        while let Some(id) = current {
            self.nodes[id.0].rev = clock;
            current = self.nodes[id.0].parent;
        }

        if !added.is_empty() && self.is_observed(target) {
            self.records.push(MutationRecord { target, added: added.to_vec() });
        }
    }

    fn detach(&mut self, id: NodeId) {
        self.nodes[id.0].parent = None;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            self.nodes[next.0].attached = false;
            stack.extend(self.nodes[next.0].children.iter().copied());
        }
    }

    /// Parse `html` into new children of `parent`. Unclosed elements are
    /// closed at the end; an end tag with no open match is dropped.
    fn build(&mut self, parent: NodeId, html: &str) -> Vec<NodeId> {
        let attached = self.nodes[parent.0].attached;
        let mut open = vec![parent];
        let mut top = Vec::new();

        for token in html::tokenize(html) {
            let current = open.last().copied().unwrap_or(parent);
            let (data, opens) = match token {
                Token::Start { tag, attrs, self_closing } => {
                    let opens = !self_closing && !html::is_void(&tag);
                    (NodeData::Element { tag, attrs }, opens)
                }
                Token::End { tag } => {
                    if let Some(pos) = open.iter().rposition(|&id| id != parent && self.tag(id) == Some(tag.as_str())) {
                        open.truncate(pos);
                    }
                    continue;
                }
                Token::Text(text) => (NodeData::Text(text), false),
                Token::Comment(text) => (NodeData::Comment(text), false),
            };

            let id = NodeId(self.nodes.len());
            self.nodes.push(Node { data, parent: Some(current), children: Vec::new(), rev: self.clock, attached });
            self.nodes[current.0].children.push(id);
            if current == parent {
                top.push(id);
            }
            if opens {
                open.push(id);
            }
        }
        top
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    if let Some(value) = value {
                        out.push_str("=\"");
                        out.push_str(&value.replace('"', "&quot;"));
                        out.push('"');
                    }
                }
                out.push('>');
                if html::is_void(tag) {
                    return;
                }
                for &child in &node.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Simple compound selector: `tag`, `.class`, `#id` or combinations such as
/// `span.price`. No combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self, DomError> {
        let raw = raw.trim();
        let caps = regex!(r"^([A-Za-z][A-Za-z0-9-]*)?((?:[.#][A-Za-z0-9_-]+)*)$")
            .captures(raw)
            .filter(|_| !raw.is_empty())
            .ok_or_else(|| DomError::InvalidSelector(raw.to_string()))?;

        let tag = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
        let mut id = None;
        let mut classes = Vec::new();
        for part in regex!(r"[.#][A-Za-z0-9_-]+").find_iter(caps.get(2).map_or("", |m| m.as_str())) {
            let (sigil, name) = part.as_str().split_at(1);
            if sigil == "#" {
                id = Some(name.to_string());
            } else {
                classes.push(name.to_string());
            }
        }
        Ok(Selector { tag, id, classes })
    }

    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Self>, DomError> {
        raw.iter().map(|s| Self::parse(s.as_ref())).collect()
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        self.tag.as_deref().is_none_or(|t| t == tag)
            && self.id.as_deref().is_none_or(|id| doc.attr(node, "id") == Some(id))
            && self.classes.iter().all(|c| doc.has_class(node, c))
    }
}
