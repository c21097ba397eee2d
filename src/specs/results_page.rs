// src/specs/results_page.rs
use crate::config::consts::RESULT_LIST_INDICES;
use crate::core::{Document, NodeId};

/// The `<ul>` elements holding result cards. Only the first need exist.
pub fn result_lists(doc: &Document) -> Vec<NodeId> {
    let uls = doc.select_tag(doc.root(), "ul");
    let mut out = Vec::with_capacity(RESULT_LIST_INDICES.len());
    for &ix in &RESULT_LIST_INDICES {
        match uls.get(ix) {
            Some(&ul) => out.push(ul),
            None => break,
        }
    }
    out
}

/// Every candidate card, first list then second, in page order.
pub fn card_elements(doc: &Document) -> Vec<NodeId> {
    result_lists(doc)
        .into_iter()
        .flat_map(|ul| doc.select_tag(ul, "li"))
        .collect()
}
