// tests/scan_page.rs
mod common;

use std::time::Duration;

use common::*;
use flyontime::coordinator::CardState;
use flyontime::core::Document;
use flyontime::extract::{self, Ineligible, Malformed, Stops, Verdict};
use flyontime::session::Session;

fn mixed_page(trip: &Trip) -> String {
    page(
        trip,
        &[
            nonstop("Delta", "JFK–LAX", "10:30 AM – 1:45 PM"),
            one_stop("United · Operated by SkyWest DBA United Express", "ORD–SFO", "6:05 PM – 11:40 PM", "1 stop\n2 hr 15 min PHX"),
            one_stop("American", "DFW–BOS", "7:00 AM – 4:10 PM", "2 stops\nORD, DCA"),
            nonstop("Delta, WestJet", "SEA–YVR", "9:00 AM – 10:05 AM"),
        ],
        &[
            nonstop("British Airways", "LHR–JFK", "11:20 AM – 2:30 PM"),
            nonstop("Lufthansa", "JFK–BOS", "8:00 AM – 9:20 AM"),
        ],
    )
}

#[test]
fn every_candidate_gets_a_verdict_in_page_order() {
    let doc = Document::parse(&mixed_page(&ROUND_TRIP));
    let report = extract::scan(&doc);

    assert_eq!(report.cards.len(), 6);
    assert_eq!(report.count_eligible(), 2);
    let indices: Vec<usize> = report.cards.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);

    let first = report.cards[0].verdict.query().unwrap();
    assert_eq!((first.origin.as_str(), first.airline.as_str(), first.departure_hour), ("JFK", "DL", 10));
    assert_eq!((first.day_of_week, first.month_of_year), (5, 3));

    let second = report.cards[1].verdict.query().unwrap();
    assert_eq!(second.airline.as_str(), "OO");
    assert_eq!(second.stops, Stops::OneStop { waypoint: "PHX".into(), layover: "2hr15min".into() });

    assert_eq!(report.cards[2].verdict, Verdict::Ineligible(Ineligible::TooManyStops));
    assert!(matches!(report.cards[3].verdict, Verdict::Ineligible(Ineligible::MultiCarrier(_))));
    assert!(matches!(report.cards[4].verdict, Verdict::Ineligible(Ineligible::UnknownCarrier(_))));
    assert!(matches!(report.cards[5].verdict, Verdict::Ineligible(Ineligible::UnknownCarrier(_))));
}

#[test]
fn return_leg_takes_the_return_date() {
    let trip = Trip { header: Some("Returning flights"), ..ROUND_TRIP };
    let doc = Document::parse(&mixed_page(&trip));
    let report = extract::scan(&doc);

    assert!(report.trip.is_return_leg);
    let q = report.cards[0].verdict.query().unwrap();
    assert_eq!((q.day_of_week, q.month_of_year), (7, 3));
}

#[test]
fn one_way_without_date_is_ineligible() {
    let trip = Trip { header: None, depart: None, ret: None };
    let doc = Document::parse(&mixed_page(&trip));
    let report = extract::scan(&doc);
    assert_eq!(report.count_eligible(), 0);
    assert_eq!(report.cards[0].verdict, Verdict::Ineligible(Ineligible::NoLegDate));
}

#[test]
fn broken_cards_are_skipped_not_fatal() {
    let mut html = mixed_page(&ROUND_TRIP);
    // a flat <li> in the first result list and an unreadable clock in the second
    html = html.replacen("<ul><li><div><div></div>", "<ul><li>sponsored</li><li><div><div></div>", 2);
    html = html.replace("11:20 AM – 2:30 PM", "departs soon");
    let doc = Document::parse(&html);
    let report = extract::scan(&doc);

    let malformed = report.cards.iter().filter(|c| matches!(c.verdict, Verdict::Malformed(_))).count();
    assert!(malformed >= 2);
    assert!(report.cards.iter().any(|c| matches!(c.verdict, Verdict::Malformed(Malformed::Clock(_)))));
    // the good cards are still there
    assert_eq!(report.count_eligible(), 2);
}

#[test]
fn scanning_leaves_the_page_untouched() {
    let html = mixed_page(&ROUND_TRIP);
    let doc = Document::parse(&html);
    let before = doc.to_html();
    let _ = extract::scan(&doc);
    assert_eq!(doc.to_html(), before);
    assert!(before.contains("kg CO2"));
}

#[test]
fn fewer_than_five_lists_means_no_cards() {
    let doc = Document::parse("<html><body><ul><li>a</li></ul><ul><li>b</li></ul></body></html>");
    assert!(extract::scan(&doc).cards.is_empty());
}

#[test]
fn rescans_never_make_a_two_stop_card_eligible() {
    let client = FakeClient::ok(PREDICTION);
    let mut s = Session::new(mixed_page(&ROUND_TRIP), bridge(client.clone()));

    // activate the neighbours so the rescans start from a mutated page
    s.hover(0).unwrap();
    s.hover(1).unwrap();
    assert!(s.wait_idle(Duration::from_secs(5)));

    for _ in 0..3 {
        s.rescan();
        assert_eq!(s.report().cards[2].verdict, Verdict::Ineligible(Ineligible::TooManyStops));
        assert!(s.report().cards.iter().all(|c| match c.verdict.query() {
            Some(q) => q.stop_count() <= 1,
            None => true,
        }));
        assert!(s.hover(2).is_none());
        let id = s.coordinator().card_id(2).unwrap();
        assert_eq!(s.coordinator().state(id), Some(CardState::Unseen));
    }
    assert_eq!(client.calls().len(), 2);
}
