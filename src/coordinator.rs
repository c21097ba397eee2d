// src/coordinator.rs
//! Per-card lifecycle: `Unseen` → `InFlight` → `Complete`.
//!
//! The coordinator owns the only copy of card state. Cards are identified by
//! [`CardId`], which pairs the card's position with the epoch of the scan that found
//! it, so ids from a previous scan never address a card of the current one.
//!
//! Every dispatch carries a [`Ticket`]. A completion is applied only when its card
//! is still live, still in flight, and still waiting on that exact ticket.

use std::fmt;

use crate::bridge::{self, FetchOutcome};
use crate::core::{Document, NodeId};
use crate::extract::{self, FlightCardQuery, ScanReport, Stops};
use crate::specs::card::{self, CardParts, Geometry};

pub const LOADING_TEXT: &str = "Loading...";
pub const LOADING_FONT_SIZE: &str = "18px";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId {
    pub epoch: u64,
    pub index: usize,
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.epoch, self.index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardState {
    Unseen,
    InFlight,
    Complete,
}

/// What the bridge needs to run one fetch.
#[derive(Clone, Debug)]
pub struct Dispatch {
    pub card: CardId,
    pub ticket: Ticket,
    pub query: FlightCardQuery,
    /// The cell the outcome goes into.
    pub target: NodeId,
}

/// A finished fetch on its way back to the owning thread.
#[derive(Clone, Debug)]
pub struct Completion {
    pub card: CardId,
    pub ticket: Ticket,
    pub query: FlightCardQuery,
    pub target: NodeId,
    pub outcome: FetchOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Applied,
    Stale,
}

#[derive(Clone, Debug)]
struct Entry {
    node: NodeId,
    parts: Option<CardParts>,
    query: Option<FlightCardQuery>,
    state: CardState,
    ticket: Option<Ticket>,
}

#[derive(Debug, Default)]
pub struct Coordinator {
    epoch: u64,
    next_ticket: u64,
    entries: Vec<Entry>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adopt a fresh scan. All previous ids (and their tickets) go stale.
    pub fn track(&mut self, report: &ScanReport) -> u64 {
        self.epoch += 1;
        self.entries = report
            .cards
            .iter()
            .map(|c| Entry {
                node: c.node,
                parts: c.parts.clone(),
                query: c.verdict.query().cloned(),
                state: CardState::Unseen,
                ticket: None,
            })
            .collect();
        self.epoch
    }

    /// Forget every card's progress. Outstanding fetches will land as stale.
    pub fn reset_all(&mut self) {
        for e in &mut self.entries {
            e.state = CardState::Unseen;
            e.ticket = None;
        }
        logd!("coordinator: reset {} cards (epoch {})", self.entries.len(), self.epoch);
    }

    pub fn card_id(&self, index: usize) -> Option<CardId> {
        (index < self.entries.len()).then_some(CardId { epoch: self.epoch, index })
    }

    pub fn state(&self, id: CardId) -> Option<CardState> {
        self.entry(id).map(|e| e.state)
    }

    pub fn count(&self, state: CardState) -> usize {
        self.entries.iter().filter(|e| e.state == state).count()
    }

    pub fn parts(&self, id: CardId) -> Option<&CardParts> {
        self.entry(id).and_then(|e| e.parts.as_ref())
    }

    fn entry(&self, id: CardId) -> Option<&Entry> {
        if id.epoch != self.epoch {
            return None;
        }
        self.entries.get(id.index)
    }

    fn entry_mut(&mut self, id: CardId) -> Option<&mut Entry> {
        if id.epoch != self.epoch {
            return None;
        }
        self.entries.get_mut(id.index)
    }

    /// First hover on an eligible card: prepare the card and hand back the fetch
    /// to run. Anything else (ineligible, already in flight, already done) is `None`.
    pub fn activate(&mut self, doc: &mut Document, id: CardId) -> Option<Dispatch> {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);

        let entry = self.entry_mut(id)?;
        if entry.state != CardState::Unseen || !doc.is_attached(entry.node) {
            return None;
        }
        let query = entry.query.clone()?;
        let parts = entry.parts.clone()?;

        extract::strip_emissions(doc, &parts);
        let geometry = match query.stops {
            Stops::Nonstop => Geometry::Nonstop,
            Stops::OneStop { .. } => Geometry::OneStop,
        };
        card::apply_geometry(doc, &parts, geometry);
        card::ensure_drilldown(doc, &parts);

        doc.set_style(parts.connections, "font-size", LOADING_FONT_SIZE);
        doc.set_text(parts.connections, LOADING_TEXT);

        entry.state = CardState::InFlight;
        entry.ticket = Some(ticket);
        logd!("card {id}: in flight ({ticket:?})");

        Some(Dispatch { card: id, ticket, query, target: parts.connections })
    }

    /// Write a finished fetch into the page, unless the card has moved on.
    pub fn complete(&mut self, doc: &mut Document, done: Completion) -> Applied {
        let Some(entry) = self.entry_mut(done.card) else {
            logd!("card {}: dropped completion from an old scan", done.card);
            return Applied::Stale;
        };
        if entry.state != CardState::InFlight || entry.ticket != Some(done.ticket) {
            logd!("card {}: dropped superseded completion ({:?})", done.card, done.ticket);
            return Applied::Stale;
        }
        if !doc.is_attached(done.target) {
            logd!("card {}: target cell gone", done.card);
            return Applied::Stale;
        }

        bridge::inject(doc, done.target, &done.query, &done.outcome);
        entry.state = CardState::Complete;
        entry.ticket = None;
        Applied::Applied
    }
}
