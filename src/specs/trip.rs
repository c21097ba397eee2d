// src/specs/trip.rs
use crate::core::{Document, NodeId};

/// Which leg the page is listing, and the dates typed into the search form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TripContext {
    pub outbound_date: Option<String>,
    pub return_date: Option<String>,
    pub is_return_leg: bool,
}

impl TripContext {
    pub fn read(doc: &Document) -> Self {
        let is_return_leg = leg_header(doc)
            .map(|h| !doc.inner_text(h).to_lowercase().contains("depart"))
            .unwrap_or(false);

        TripContext {
            outbound_date: date_input(doc, "depart"),
            return_date: date_input(doc, "return"),
            is_return_leg,
        }
    }

    /// Date text for the leg being listed. One-way searches have no header and
    /// always use the outbound date.
    pub fn leg_date(&self) -> Option<&str> {
        if self.is_return_leg { self.return_date.as_deref() } else { self.outbound_date.as_deref() }
    }
}

/// Last `<h3>` that reads like "Departing flights" or "Returning flights".
/// "Other departing flights" headers don't count.
pub fn leg_header(doc: &Document) -> Option<NodeId> {
    doc.select_tag(doc.root(), "h3")
        .into_iter()
        .filter(|&h| {
            let text = doc.inner_text(h).to_lowercase();
            (text.contains("depart") && !text.contains("ther")) || text.contains("eturning")
        })
        .last()
}

fn date_input(doc: &Document, label: &str) -> Option<String> {
    doc.select_tag(doc.root(), "input")
        .into_iter()
        .find(|&i| doc.attr(i, "aria-label").is_some_and(|l| l.to_lowercase().contains(label)))
        .and_then(|i| doc.attr(i, "value"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
