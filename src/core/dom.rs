// src/core/dom.rs
//! Owned, mutable page tree.
//!
//! The page is parsed once with html5ever and copied out of the `RcDom` into a flat
//! arena. Nodes are addressed by [`NodeId`] and never move. Removal only detaches a
//! node from its parent, so ids held elsewhere stay valid (they just stop being
//! reachable from the root).
//!
//! Queries mirror the handful of DOM calls the pipeline relies on:
//! positional element children (`children[i]`), tag/id/class lookups in document
//! order, an `innerText` approximation, inline style edits and `innerHTML` writes.

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_document, parse_fragment, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::text::{escape_attr, escape_text, normalize_ws};

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

const ROOT: NodeId = 0;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "html", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

const SKIP_TEXT_TAGS: &[&str] = &["script", "style", "template", "noscript", "head"];

impl Document {
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let mut doc = Document {
            nodes: vec![Node { kind: NodeKind::Document, parent: None, children: Vec::new() }],
        };
        doc.import_children(&dom.document, ROOT);
        doc
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Copy the children of an rcdom handle (recursively) under `parent`.
    fn import_children(&mut self, handle: &Handle, parent: NodeId) {
        let mut stack: Vec<(Handle, NodeId)> = vec![(handle.clone(), parent)];
        while let Some((h, p)) = stack.pop() {
            for child in h.children.borrow().iter() {
                let kind = match &child.data {
                    NodeData::Element { name, attrs, .. } => NodeKind::Element {
                        tag: name.local.to_string(),
                        attrs: attrs
                            .borrow()
                            .iter()
                            .map(|a| (a.name.local.to_string(), a.value.to_string()))
                            .collect(),
                    },
                    NodeData::Text { contents } => NodeKind::Text(contents.borrow().to_string()),
                    _ => continue,
                };
                let is_element = matches!(kind, NodeKind::Element { .. });
                let id = self.push(kind, Some(p));
                if is_element {
                    stack.push((child.clone(), id));
                }
            }
        }
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node { kind, parent, children: Vec::new() });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }

    /* ---------- structure ---------- */

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|n| &n.kind)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Element children only, like `Element.children`.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        match self.nodes.get(id) {
            Some(n) => n.children.iter().copied().filter(|&c| self.is_element(c)).collect(),
            None => Vec::new(),
        }
    }

    pub fn child_element(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.element_children(id).get(index).copied()
    }

    pub fn last_child_element(&self, id: NodeId) -> Option<NodeId> {
        self.element_children(id).last().copied()
    }

    /// Follow a chain of `children[i]` hops.
    pub fn descend(&self, from: NodeId, path: &[usize]) -> Option<NodeId> {
        path.iter().try_fold(from, |at, &i| self.child_element(at, i))
    }

    /// All descendants of `id` in document order (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(id) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev().copied());
        }
        out
    }

    /// `querySelectorAll(tag)` scoped to `scope`.
    pub fn select_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.tag(n).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    pub fn first_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.select_tag(scope, tag).into_iter().next()
    }

    pub fn find_by_id(&self, scope: NodeId, id_attr: &str) -> Option<NodeId> {
        self.descendants(scope).into_iter().find(|&n| self.attr(n, "id") == Some(id_attr))
    }

    pub fn find_by_class(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(scope).into_iter().find(|&n| self.has_class(n, class))
    }

    /// Still reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut at = id;
        loop {
            if at == ROOT {
                return true;
            }
            match self.parent(at) {
                Some(p) => at = p,
                None => return false,
            }
        }
    }

    /* ---------- attributes & style ---------- */

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(Node { kind: NodeKind::Element { attrs, .. }, .. }) = self.nodes.get_mut(id) {
            match attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
                Some(slot) => slot.1 = s!(value),
                None => attrs.push((s!(name), s!(value))),
            }
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn style(&self, id: NodeId, prop: &str) -> Option<String> {
        let style = self.attr(id, "style")?;
        parse_style(style)
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(prop))
            .map(|(_, v)| v)
    }

    /// `el.style.<prop> = value`
    pub fn set_style(&mut self, id: NodeId, prop: &str, value: &str) {
        let mut decls = self.attr(id, "style").map(parse_style).unwrap_or_default();
        match decls.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(prop)) {
            Some(slot) => slot.1 = s!(value),
            None => decls.push((s!(prop), s!(value))),
        }
        let joined = decls
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attr(id, "style", &joined);
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.style(id, "display").is_some_and(|d| d.trim() == "none")
    }

    /* ---------- mutation ---------- */

    /// Detached element, ready for `append_child`.
    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs.iter().map(|(k, v)| (s!(*k), s!(*v))).collect();
        self.push(NodeKind::Element { tag: s!(tag), attrs }, None)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// `el.remove()`
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(p) = self.nodes.get_mut(id).and_then(|n| n.parent.take()) {
            self.nodes[p].children.retain(|&c| c != id);
        }
    }

    fn clear_children(&mut self, id: NodeId) {
        let kids = std::mem::take(&mut self.nodes[id].children);
        for k in kids {
            self.nodes[k].parent = None;
        }
    }

    /// `el.innerText = text`
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if id >= self.nodes.len() {
            return;
        }
        self.clear_children(id);
        self.push(NodeKind::Text(s!(text)), Some(id));
    }

    /// `el.innerHTML = html`; the markup is parsed as the content of a `<div>`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        if id >= self.nodes.len() {
            return;
        }
        self.clear_children(id);
        let context = QualName::new(None, ns!(html), local_name!("div"));
        let dom = parse_fragment(RcDom::default(), Default::default(), context, vec![]).one(html);
        // the fragment parser hangs everything off a synthetic <html>
        if let Some(root) = find_element(&dom.document, "html") {
            self.import_children(&root, id);
        }
    }

    /* ---------- text ---------- */

    /// Approximates `innerText`: block elements and `<br>` break lines, whitespace
    /// collapses within a line, empty lines drop, `display: none` subtrees are skipped.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut lines = vec![String::new()];
        self.collect_lines(id, &mut lines);
        lines
            .iter()
            .map(|l| normalize_ws(l))
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn collect_lines(&self, id: NodeId, lines: &mut Vec<String>) {
        let Some(node) = self.nodes.get(id) else { return };
        match &node.kind {
            NodeKind::Text(t) => {
                if let Some(last) = lines.last_mut() {
                    last.push_str(t);
                }
            }
            NodeKind::Document => {
                for &c in &node.children {
                    self.collect_lines(c, lines);
                }
            }
            NodeKind::Element { tag, .. } => {
                let tag = tag.to_ascii_lowercase();
                if SKIP_TEXT_TAGS.contains(&tag.as_str()) || self.is_hidden(id) {
                    return;
                }
                if tag == "br" {
                    lines.push(String::new());
                    return;
                }
                let block = BLOCK_TAGS.contains(&tag.as_str());
                if block {
                    lines.push(String::new());
                }
                for &c in &node.children {
                    self.collect_lines(c, lines);
                }
                if block {
                    lines.push(String::new());
                }
            }
        }
    }

    /// Raw concatenated text, hidden or not.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text(t)) = self.kind(id) {
            out.push_str(t);
        }
        for n in self.descendants(id) {
            if let NodeKind::Text(t) = &self.nodes[n].kind {
                out.push_str(t);
            }
        }
        out
    }

    /* ---------- serialization ---------- */

    pub fn to_html(&self) -> String {
        self.outer_html(ROOT)
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(n) = self.nodes.get(id) {
            for &c in &n.children {
                self.write_html(c, &mut out);
            }
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Document => {
                out.push_str("<!DOCTYPE html>");
                for &c in &node.children {
                    self.write_html(c, out);
                }
            }
            NodeKind::Text(t) => {
                let raw = node
                    .parent
                    .and_then(|p| self.tag(p))
                    .is_some_and(|t| t == "script" || t == "style");
                if raw { out.push_str(t) } else { out.push_str(&escape_text(t)) }
            }
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(v));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for &c in &node.children {
                    self.write_html(c, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/* ---------- helpers ---------- */

fn find_element(handle: &Handle, local: &str) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if let NodeData::Element { name, .. } = &child.data {
            if name.local.as_ref() == local {
                return Some(child.clone());
            }
        }
        if let Some(found) = find_element(child, local) {
            return Some(found);
        }
    }
    None
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim();
            if k.is_empty() { None } else { Some((s!(k), s!(v.trim()))) }
        })
        .collect()
}
