// src/specs/card.rs
use thiserror::Error;

use crate::config::consts::CARD_BODY_PATH;
use crate::core::{Document, NodeId};

// Cell positions inside the card body.
const SCHEDULE: usize = 1;
const ENDPOINTS: usize = 2;
const CONNECTIONS: usize = 3;
const EMISSIONS: usize = 4;
const PRICE: usize = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("card body not found at child path {CARD_BODY_PATH:?}")]
    NoBody,
    #[error("card body has no {0} cell")]
    MissingCell(&'static str),
    #[error("endpoints cell has no <span>")]
    NoEndpointSpan,
}

/// Named handles on one card's cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardParts {
    pub card: NodeId,
    pub body: NodeId,
    pub schedule: NodeId,
    pub endpoints: NodeId,
    /// Also where the prediction is injected.
    pub connections: NodeId,
    pub emissions: Option<NodeId>,
    pub price: Option<NodeId>,
    pub trailing: NodeId,
}

pub fn locate(doc: &Document, card: NodeId) -> Result<CardParts, ShapeError> {
    let body = doc.descend(card, &CARD_BODY_PATH).ok_or(ShapeError::NoBody)?;
    let cell = |ix: usize, name: &'static str| doc.child_element(body, ix).ok_or(ShapeError::MissingCell(name));

    Ok(CardParts {
        card,
        body,
        schedule: cell(SCHEDULE, "schedule")?,
        endpoints: cell(ENDPOINTS, "endpoints")?,
        connections: cell(CONNECTIONS, "connections")?,
        emissions: doc.child_element(body, EMISSIONS),
        price: doc.child_element(body, PRICE),
        trailing: doc.last_child_element(body).ok_or(ShapeError::MissingCell("trailing"))?,
    })
}

/// The card as plain text; everything downstream works from this.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlightRecord {
    /// Time range on the first line, carrier(s) on the last.
    pub schedule: String,
    /// `"JFK–LAX"`
    pub endpoints: String,
    pub connections: String,
    pub emissions: Option<String>,
}

impl FlightRecord {
    pub fn time_range(&self) -> &str {
        self.schedule.lines().next().unwrap_or("")
    }

    pub fn airline_line(&self) -> &str {
        self.schedule.lines().last().unwrap_or("")
    }
}

pub fn read_record(doc: &Document, parts: &CardParts) -> Result<FlightRecord, ShapeError> {
    let span = doc.first_tag(parts.endpoints, "span").ok_or(ShapeError::NoEndpointSpan)?;
    Ok(FlightRecord {
        schedule: doc.inner_text(parts.schedule),
        endpoints: doc.inner_text(span),
        connections: doc.inner_text(parts.connections),
        emissions: parts.emissions.map(|e| doc.inner_text(e)),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Geometry {
    Nonstop,
    OneStop,
}

/// Resize the card's cells to make room for the prediction.
pub fn apply_geometry(doc: &mut Document, parts: &CardParts, geometry: Geometry) {
    match geometry {
        Geometry::Nonstop => {
            doc.set_style(parts.trailing, "flex", "0 0 calc(10%)");
            doc.set_style(parts.endpoints, "flex", "0 0 calc(10%)");

            // The second button's row would sit on top of the prediction
            let buttons = doc.select_tag(parts.card, "button");
            if let Some(row) = buttons.get(1).and_then(|&b| doc.parent(b)).and_then(|p| doc.parent(p)) {
                doc.set_style(row, "display", "none");
            }
            doc.set_style(parts.schedule, "flex", "0 0 0");
        }
        Geometry::OneStop => {
            doc.set_style(parts.schedule, "flex", "0 0 calc(10%)");
            doc.set_style(parts.schedule, "margin-right", "0");
            doc.set_style(parts.endpoints, "flex", "0 0 calc(12%)");
            doc.set_style(parts.connections, "flex", "0 0 calc(12%)");
            doc.set_style(parts.connections, "min-width", "58%");
            if let Some(price) = parts.price {
                doc.set_style(price, "flex", "0 0 auto");
                doc.set_style(price, "float", "right");
            }
        }
    }
}

pub const DRILLDOWN_CLASS: &str = "drilldown";

/// Empty `.drilldown` slot appended next to the card body, once.
pub fn ensure_drilldown(doc: &mut Document, parts: &CardParts) -> Option<NodeId> {
    let holder = doc.parent(parts.body)?;
    if let Some(existing) = doc.find_by_class(holder, DRILLDOWN_CLASS) {
        return Some(existing);
    }
    let slot = doc.create_element("div", &[("class", DRILLDOWN_CLASS)]);
    doc.append_child(holder, slot);
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    // li > div > [div, div > [div > [div, div > [body]]]]
    fn card(body_cells: &str) -> String {
        format!(
            "<html><body><ul><li><div><div></div><div><div><div></div><div>\
             <div class=body>{body_cells}</div>\
             </div></div></div></div>\
             <div><div><button>a</button></div></div>\
             <div><div><button>b</button></div></div>\
             </li></ul></body></html>"
        )
    }

    const CELLS: &str = "<div>logo</div>\
        <div><div>10:30 AM – 1:45 PM</div><div>Delta</div></div>\
        <div><span>JFK–LAX</span><span>JFK</span></div>\
        <div>Nonstop</div>\
        <div>120 kg CO2</div>\
        <div>$240</div>";

    fn li(doc: &Document) -> NodeId {
        doc.first_tag(doc.root(), "li").unwrap()
    }

    #[test]
    fn locate_and_read() {
        let doc = Document::parse(&card(CELLS));
        let parts = locate(&doc, li(&doc)).unwrap();
        assert!(doc.has_class(parts.body, "body"));
        assert_eq!(parts.price, parts.trailing.into());

        let rec = read_record(&doc, &parts).unwrap();
        assert_eq!(rec.time_range(), "10:30 AM – 1:45 PM");
        assert_eq!(rec.airline_line(), "Delta");
        assert_eq!(rec.endpoints, "JFK–LAX");
        assert_eq!(rec.connections, "Nonstop");
        assert_eq!(rec.emissions.as_deref(), Some("120 kg CO2"));
    }

    #[test]
    fn short_body_is_a_shape_error() {
        let doc = Document::parse(&card("<div>logo</div><div>times</div>"));
        assert_eq!(locate(&doc, li(&doc)), Err(ShapeError::MissingCell("endpoints")));

        let doc = Document::parse("<ul><li><div>flat</div></li></ul>");
        assert_eq!(locate(&doc, li(&doc)), Err(ShapeError::NoBody));
    }

    #[test]
    fn nonstop_geometry_hides_second_button_row() {
        let mut doc = Document::parse(&card(CELLS));
        let parts = locate(&doc, li(&doc)).unwrap();
        apply_geometry(&mut doc, &parts, Geometry::Nonstop);

        assert_eq!(doc.style(parts.endpoints, "flex").as_deref(), Some("0 0 calc(10%)"));
        assert_eq!(doc.style(parts.schedule, "flex").as_deref(), Some("0 0 0"));
        let buttons = doc.select_tag(parts.card, "button");
        let row = doc.parent(doc.parent(buttons[1]).unwrap()).unwrap();
        assert!(doc.is_hidden(row));
        let first_row = doc.parent(doc.parent(buttons[0]).unwrap()).unwrap();
        assert!(!doc.is_hidden(first_row));
    }

    #[test]
    fn drilldown_slot_is_added_once() {
        let mut doc = Document::parse(&card(CELLS));
        let parts = locate(&doc, li(&doc)).unwrap();
        let a = ensure_drilldown(&mut doc, &parts).unwrap();
        let b = ensure_drilldown(&mut doc, &parts).unwrap();
        assert_eq!(a, b);
        assert_eq!(doc.parent(a), doc.parent(parts.body));
        assert_eq!(doc.to_html().matches("class=\"drilldown\"").count(), 1);
    }

    #[test]
    fn one_stop_geometry_floats_price() {
        let mut doc = Document::parse(&card(CELLS));
        let parts = locate(&doc, li(&doc)).unwrap();
        apply_geometry(&mut doc, &parts, Geometry::OneStop);

        assert_eq!(doc.style(parts.connections, "min-width").as_deref(), Some("58%"));
        assert_eq!(doc.style(parts.price.unwrap(), "float").as_deref(), Some("right"));
        assert_eq!(doc.style(parts.schedule, "margin-right").as_deref(), Some("0"));
    }
}
