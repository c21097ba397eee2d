// src/fields.rs
//! Field parsers: raw card text → typed flight attributes.
//!
//! All of these are pure. "Not supported" outcomes (two stops, several carriers, a
//! foreign origin) are ordinary return values, never errors.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::airports::AirportCode;
use crate::core::text::{normalize_ws, squash_ws};

/// The en-dash the results page uses between times and between airports.
pub const EN_DASH: char = '–';

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Connections {
    Nonstop,
    OneStop { waypoint: String, layover: String },
    /// Two or more stops, or phrasing we don't recognise.
    Unsupported,
}

pub fn is_nonstop_text(text: &str) -> bool {
    text.contains("onstop") || text.contains("on-stop")
}

/// Classify the connections cell.
///
/// One-stop text is two lines, the stop count then a layover line ending in the
/// connecting airport: `"1 stop\n2 hr 15 min PHX"` → waypoint `PHX`, layover `2hr15min`.
pub fn parse_connections(text: &str) -> Connections {
    if is_nonstop_text(text) {
        return Connections::Nonstop;
    }
    if !text.contains("1 stop") {
        return Connections::Unsupported;
    }

    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let Some(detail) = lines.get(1) else { return Connections::Unsupported };

    let tokens: Vec<&str> = detail.split_whitespace().collect();
    match tokens.split_last() {
        Some((waypoint, rest)) if !rest.is_empty() => Connections::OneStop {
            waypoint: s!(*waypoint),
            layover: squash_ws(&rest.join(" ")),
        },
        _ => Connections::Unsupported,
    }
}

/// Departure hour (0–23) from `"10:30 AM – 1:45 PM"`. Minutes are dropped.
pub fn parse_time_range(text: &str) -> Option<u8> {
    let first = text.split(EN_DASH).next()?;
    parse_clock_hour(first)
}

fn parse_clock_hour(token: &str) -> Option<u8> {
    let mut clock = normalize_ws(token).to_ascii_uppercase();
    // "9 PM" has no minutes; chrono wants them
    if !clock.contains(':') {
        if let Some(split) = clock.find(|c: char| !c.is_ascii_digit()) {
            clock.insert_str(split, ":00");
        }
    }
    // The same fixed day every time; only the clock part matters.
    let reference = NaiveDate::from_ymd_opt(2000, 1, 1)?;
    let stamp = format!("{} {}", reference.format("%Y-%m-%d"), clock.trim_end_matches('+'));
    const FORMATS: &[&str] = &["%Y-%m-%d %I:%M %p", "%Y-%m-%d %I:%M%p", "%Y-%m-%d %H:%M"];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(&stamp, f).ok())
        .map(|dt| dt.hour() as u8)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AirlineLine {
    pub raw: String,
    pub names: Vec<String>,
    /// Codeshare: "Operated by SkyWest" and friends.
    pub operated_by: bool,
}

impl AirlineLine {
    /// Any comma counts, even a dangling one.
    pub fn is_multi_carrier(&self) -> bool {
        self.raw.contains(',')
    }
}

pub fn parse_airline_line(text: &str) -> AirlineLine {
    let raw = normalize_ws(text);
    let names = raw
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect();
    let operated_by = raw.contains("perated by");
    AirlineLine { raw, names, operated_by }
}

/// Origin from `"JFK–LAX"`. Only domestic airports make it through.
pub fn parse_origin(text: &str) -> Option<AirportCode> {
    let first = text.split(EN_DASH).next()?;
    AirportCode::domestic(first)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlightDate {
    /// 1 = Monday … 7 = Sunday
    pub day_of_week: u8,
    pub month_of_year: u8,
}

fn weekday_number(name: &str) -> Option<u8> {
    Some(match name {
        "Mon" => 1,
        "Tue" => 2,
        "Wed" => 3,
        "Thu" => 4,
        "Fri" => 5,
        "Sat" => 6,
        "Sun" => 7,
        _ => return None,
    })
}

fn month_number(name: &str) -> Option<u8> {
    Some(match name {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" | "Sept" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    })
}

/// `"Fri, Mar 7"` → Friday in March.
pub fn parse_flight_date(text: &str) -> Option<FlightDate> {
    let text = text.replace(",,", ",");
    let parts: Vec<String> = text.split_whitespace().map(|p| p.replace(',', "")).collect();
    let day_of_week = weekday_number(parts.first()?)?;
    let month_of_year = month_number(parts.get(1)?)?;
    Some(FlightDate { day_of_week, month_of_year })
}
