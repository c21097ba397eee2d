// src/extract.rs
//! Flight card extraction.
//!
//! [`scan`] walks every candidate card in page order and gives each a [`Verdict`].
//! Nothing here touches the document; the one mutation that belongs to extraction,
//! [`strip_emissions`], runs later, when a card is activated.

use std::fmt;

use serde::Serialize;

use crate::airline::{self, CarrierCode};
use crate::airports::AirportCode;
use crate::config::consts::{NO_LAYOVER, NO_WAYPOINT};
use crate::core::{Document, NodeId};
use crate::fields::{self, Connections};
use crate::specs::card::{self, CardParts, FlightRecord, ShapeError};
use crate::specs::results_page;
use crate::specs::trip::TripContext;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stops {
    Nonstop,
    OneStop { waypoint: String, layover: String },
}

/// Everything the prediction service needs to know about one flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlightCardQuery {
    pub origin: AirportCode,
    pub stops: Stops,
    pub airline: CarrierCode,
    /// 0–23, local
    pub departure_hour: u8,
    /// 1 = Monday
    pub day_of_week: u8,
    pub month_of_year: u8,
}

impl FlightCardQuery {
    pub fn stop_count(&self) -> u8 {
        match self.stops {
            Stops::Nonstop => 0,
            Stops::OneStop { .. } => 1,
        }
    }

    pub fn waypoint(&self) -> Option<&str> {
        match &self.stops {
            Stops::Nonstop => None,
            Stops::OneStop { waypoint, .. } => Some(waypoint),
        }
    }

    pub fn layover(&self) -> Option<&str> {
        match &self.stops {
            Stops::Nonstop => None,
            Stops::OneStop { layover, .. } => Some(layover),
        }
    }

    /// Waypoint as sent on the wire: the code, or the no-waypoint sentinel.
    pub fn waypoint_param(&self) -> &str {
        self.waypoint().unwrap_or(NO_WAYPOINT)
    }

    pub fn layover_param(&self) -> &str {
        self.layover().unwrap_or(NO_LAYOVER)
    }
}

/// Cards we understand but don't serve. Skipped quietly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Ineligible {
    TooManyStops,
    MultiCarrier(String),
    UnknownCarrier(String),
    ForeignOrigin(String),
    NoLegDate,
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligible::TooManyStops => f.write_str("more than one stop"),
            Ineligible::MultiCarrier(l) => write!(f, "several carriers: {l}"),
            Ineligible::UnknownCarrier(l) => write!(f, "unknown carrier: {l}"),
            Ineligible::ForeignOrigin(o) => write!(f, "origin not domestic: {o}"),
            Ineligible::NoLegDate => f.write_str("no date for this leg"),
        }
    }
}

/// Cards whose markup or text doesn't look like a flight card at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Malformed {
    Shape(String),
    Clock(String),
    Date(String),
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::Shape(e) => write!(f, "shape: {e}"),
            Malformed::Clock(t) => write!(f, "unparsable departure time: {t:?}"),
            Malformed::Date(t) => write!(f, "unparsable leg date: {t:?}"),
        }
    }
}

impl From<ShapeError> for Malformed {
    fn from(e: ShapeError) -> Self {
        Malformed::Shape(e.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "snake_case")]
pub enum Verdict {
    Eligible(FlightCardQuery),
    Ineligible(Ineligible),
    Malformed(Malformed),
}

impl Verdict {
    pub fn query(&self) -> Option<&FlightCardQuery> {
        match self {
            Verdict::Eligible(q) => Some(q),
            _ => None,
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible(_))
    }
}

#[derive(Clone, Debug)]
pub struct ScannedCard {
    /// Position among all candidate cards.
    pub index: usize,
    pub node: NodeId,
    /// `None` when the card didn't match the positional layout.
    pub parts: Option<CardParts>,
    pub verdict: Verdict,
}

#[derive(Clone, Debug, Default)]
pub struct ScanReport {
    pub trip: TripContext,
    pub cards: Vec<ScannedCard>,
}

impl ScanReport {
    pub fn eligible(&self) -> impl Iterator<Item = &ScannedCard> {
        self.cards.iter().filter(|c| c.verdict.is_eligible())
    }

    pub fn count_eligible(&self) -> usize {
        self.eligible().count()
    }
}

/// Classify every candidate card on the page.
pub fn scan(doc: &Document) -> ScanReport {
    let trip = TripContext::read(doc);
    let cards = results_page::card_elements(doc)
        .into_iter()
        .enumerate()
        .map(|(index, node)| {
            let (parts, verdict) = match card::locate(doc, node) {
                Ok(parts) => {
                    let verdict = match card::read_record(doc, &parts) {
                        Ok(record) => extract_query(&record, &trip),
                        Err(e) => Verdict::Malformed(e.into()),
                    };
                    (Some(parts), verdict)
                }
                Err(e) => (None, Verdict::Malformed(e.into())),
            };
            match &verdict {
                Verdict::Eligible(q) => logd!("card {index}: eligible {q:?}"),
                Verdict::Ineligible(why) => logd!("card {index}: skipped, {why}"),
                Verdict::Malformed(why) => logw!("card {index}: malformed, {why}"),
            }
            ScannedCard { index, node, parts, verdict }
        })
        .collect::<Vec<_>>();

    logf!(
        "scan: {} candidate cards, {} eligible",
        cards.len(),
        cards.iter().filter(|c| c.verdict.is_eligible()).count()
    );
    ScanReport { trip, cards }
}

/// The pure core of extraction: card text + trip header → query or reason.
pub fn extract_query(record: &FlightRecord, trip: &TripContext) -> Verdict {
    let stops = match fields::parse_connections(&record.connections) {
        Connections::Nonstop => Stops::Nonstop,
        Connections::OneStop { waypoint, layover } => Stops::OneStop { waypoint, layover },
        Connections::Unsupported => return Verdict::Ineligible(Ineligible::TooManyStops),
    };

    let Some(departure_hour) = fields::parse_time_range(record.time_range()) else {
        return Verdict::Malformed(Malformed::Clock(s!(record.time_range())));
    };

    let line = fields::parse_airline_line(record.airline_line());
    if line.is_multi_carrier() {
        return Verdict::Ineligible(Ineligible::MultiCarrier(line.raw));
    }
    let Some(carrier) = airline::resolve(&line) else {
        return Verdict::Ineligible(Ineligible::UnknownCarrier(line.raw));
    };

    let Some(origin) = fields::parse_origin(&record.endpoints) else {
        return Verdict::Ineligible(Ineligible::ForeignOrigin(s!(record.endpoints.trim())));
    };

    let Some(date_text) = trip.leg_date() else {
        return Verdict::Ineligible(Ineligible::NoLegDate);
    };
    let Some(date) = fields::parse_flight_date(date_text) else {
        return Verdict::Malformed(Malformed::Date(s!(date_text)));
    };

    Verdict::Eligible(FlightCardQuery {
        origin,
        stops,
        airline: carrier.code,
        departure_hour,
        day_of_week: date.day_of_week,
        month_of_year: date.month_of_year,
    })
}

/// Drop the emissions cell when it holds the "kg CO2" figure. Returns whether
/// anything was removed; a second call finds nothing to do.
pub fn strip_emissions(doc: &mut Document, parts: &CardParts) -> bool {
    let Some(cell) = parts.emissions else { return false };
    if !doc.is_attached(cell) {
        return false;
    }
    if doc.inner_text(cell).contains("kg") {
        doc.remove(cell);
        return true;
    }
    false
}
