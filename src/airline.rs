// src/airline.rs
//! Carrier name ↔ code tables and the resolver that picks one for a card.
//!
//! Table order is canonical. Matching is a substring test over the scraped line, and
//! the first entry that matches wins, so reordering the tables changes which code a
//! line like "Alaska Horizon" resolves to.

use std::fmt;

use serde::Serialize;

use crate::fields::AirlineLine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CarrierTier {
    Mainline,
    Regional,
}

/// Two-character canonical carrier code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CarrierCode(&'static str);

impl CarrierCode {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CarrierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Carrier {
    pub name: &'static str,
    pub code: CarrierCode,
    pub tier: CarrierTier,
}

pub static MAINLINE: &[(&str, &str)] = &[
    ("Southwest", "WN"),
    ("Delta", "DL"),
    ("American", "AA"),
    ("United", "UA"),
    ("JetBlue", "B6"),
    ("Spirit", "NK"),
    ("Alaska", "AS"),
    ("Frontier", "F9"),
    ("Hawaiian", "HA"),
];

pub static REGIONAL: &[(&str, &str)] = &[
    ("SkyWest", "OO"),
    ("Republic", "YX"),
    ("Envoy", "MQ"),
    ("Endeavor", "9E"),
    ("PSA", "OH"),
    ("Allegiant", "G4"),
    ("Mesa", "YV"),
    ("Horizon", "QX"),
];

fn table(tier: CarrierTier) -> &'static [(&'static str, &'static str)] {
    match tier {
        CarrierTier::Mainline => MAINLINE,
        CarrierTier::Regional => REGIONAL,
    }
}

pub fn is_known_code(code: &str) -> bool {
    MAINLINE.iter().chain(REGIONAL).any(|(_, c)| *c == code)
}

/// Reverse lookup, mainline first.
pub fn name_for_code(code: &str) -> Option<&'static str> {
    MAINLINE
        .iter()
        .chain(REGIONAL)
        .find(|(_, c)| *c == code)
        .map(|(n, _)| *n)
}

/// First table entry (in canonical order) whose name occurs in `text`.
pub fn match_in(tier: CarrierTier, text: &str) -> Option<Carrier> {
    table(tier)
        .iter()
        .find(|(name, _)| text.contains(name))
        .map(|&(name, code)| Carrier { name, code: CarrierCode(code), tier })
}

/// Codeshares ("Operated by ...") resolve against the regional table only,
/// everything else against mainline only. Multi-carrier lines never resolve.
pub fn resolve(line: &AirlineLine) -> Option<Carrier> {
    if line.is_multi_carrier() {
        return None;
    }
    let tier = if line.operated_by { CarrierTier::Regional } else { CarrierTier::Mainline };
    match_in(tier, &line.raw).filter(|c| is_known_code(c.code.as_str()))
}
