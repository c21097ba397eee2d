// tests/hover_cycle.rs
mod common;

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use common::*;
use flyontime::bridge::{Bridge, FetchOutcome, PredictionClient};
use flyontime::config::consts::SUPPORT_CONTACT;
use flyontime::coordinator::{CardId, CardState};
use flyontime::counter::UsageCounter;
use flyontime::progress::Progress;
use flyontime::session::Session;

const WAIT: Duration = Duration::from_secs(5);

fn two_card_page() -> String {
    page(
        &ROUND_TRIP,
        &[
            nonstop("Delta", "JFK–LAX", "10:30 AM – 1:45 PM"),
            one_stop("Southwest", "MDW–LAS", "6:05 PM – 11:40 PM", "1 stop\n55 min DEN"),
        ],
        &[nonstop("Lufthansa", "JFK–BOS", "8:00 AM – 9:20 AM")],
    )
}

fn state(s: &Session, index: usize) -> Option<CardState> {
    let id = s.coordinator().card_id(index)?;
    s.coordinator().state(id)
}

#[test]
fn hover_fetches_once_and_injects() {
    let client = FakeClient::ok(PREDICTION);
    let mut s = Session::new(two_card_page(), bridge(client.clone()));

    assert!(s.hover(0).is_some());
    assert_eq!(state(&s, 0), Some(CardState::InFlight));
    assert!(s.to_html().contains("Loading..."));

    // a second hover while in flight is ignored
    assert!(s.hover(0).is_none());

    assert!(s.wait_idle(WAIT));
    assert_eq!(state(&s, 0), Some(CardState::Complete));
    let card = s.doc().outer_html(s.cards()[0].node);
    assert!(card.contains("82% on time"));
    assert!(!card.contains("kg CO2"));
    assert!(card.contains("class=\"drilldown\""));
    // untouched neighbour
    assert!(s.doc().outer_html(s.cards()[2].node).contains("120 kg CO2"));

    // and after completion too
    assert!(s.hover(0).is_none());
    assert_eq!(client.calls(), vec!["https://predict.test/5/3/JFK/nowhere/DL/10/nolayover"]);
}

#[test]
fn one_stop_request_carries_waypoint_and_layover() {
    let client = FakeClient::ok("<b>ok</b>");
    let mut s = Session::new(two_card_page(), bridge(client.clone()));
    s.hover(1).unwrap();
    assert!(s.wait_idle(WAIT));
    assert_eq!(client.calls(), vec!["https://predict.test/5/3/MDW/DEN/WN/18/55min"]);

    let id = s.coordinator().card_id(1).unwrap();
    let connections = s.coordinator().parts(id).unwrap().connections;
    assert_eq!(s.doc().style(connections, "min-width").as_deref(), Some("58%"));
}

#[test]
fn ineligible_card_never_calls_the_service() {
    let client = FakeClient::ok(PREDICTION);
    let mut s = Session::new(two_card_page(), bridge(client.clone()));
    assert!(s.hover(2).is_none());
    assert!(s.hover(99).is_none());
    assert!(s.wait_idle(WAIT));
    assert!(client.calls().is_empty());
    assert_eq!(state(&s, 2), Some(CardState::Unseen));
}

#[test]
fn service_error_shows_fragment_and_completes() {
    let client = FakeClient::failing(Some(503));
    let mut s = Session::new(two_card_page(), bridge(client.clone()));
    s.hover(0).unwrap();
    assert!(s.wait_idle(WAIT));

    assert_eq!(state(&s, 0), Some(CardState::Complete));
    assert!(s.to_html().contains(SUPPORT_CONTACT));
    // no retry
    assert!(s.hover(0).is_none());
    assert_eq!(client.calls().len(), 1);
}

#[test]
fn prediction_panel_reveals_on_hover() {
    let client = FakeClient::ok(PREDICTION);
    let mut s = Session::new(two_card_page(), bridge(client));
    assert!(s.panel(0).is_none());
    s.hover(0).unwrap();
    assert!(s.wait_idle(WAIT));

    let aff = s.panel(0).unwrap();
    assert!(!aff.is_revealed(s.doc()));
    let chart = s.enter_panel(0).unwrap();
    assert_eq!((chart.shape, chart.scale), (Some(1.6), Some(14.5)));
    assert!(aff.is_revealed(s.doc()));
    assert_eq!(aff.detail_text(s.doc()), "Median delay 9 min");

    s.leave_panel(0);
    assert!(!aff.is_revealed(s.doc()));
    // chart parameters are only handed out once
    assert!(s.enter_panel(0).is_none());
}

#[test]
fn rescan_while_in_flight_drops_the_late_result() {
    let (client, release) = GatedClient::new(PREDICTION);
    let mut s = Session::new(two_card_page(), bridge(client));
    s.hover(0).unwrap();

    s.rescan();
    assert_eq!(state(&s, 0), Some(CardState::Unseen));

    release.send(()).unwrap();
    assert!(s.wait_idle(WAIT));
    assert_eq!(state(&s, 0), Some(CardState::Unseen));
    assert!(!s.to_html().contains("82% on time"));
    assert!(s.to_html().contains("kg CO2"));
}

#[test]
fn replaced_source_resets_everything() {
    let client = FakeClient::ok(PREDICTION);
    let mut s = Session::new(two_card_page(), bridge(client));
    s.hover(0).unwrap();
    assert!(s.wait_idle(WAIT));

    let fresh = page(&ROUND_TRIP, &[nonstop("Alaska", "SEA–ANC", "7:15 AM – 10:00 AM")], &[]);
    let report = s.replace_source(fresh);
    assert_eq!(report.cards.len(), 1);
    assert_eq!(state(&s, 0), Some(CardState::Unseen));
    assert!(!s.to_html().contains("82% on time"));
}

#[test]
fn counter_is_bumped_per_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let counter = UsageCounter::new(dir.path().join("counter.json"));
    let client = FakeClient::ok(PREDICTION);
    let mut s = Session::new(two_card_page(), bridge(client)).with_counter(counter.clone());

    s.hover(0).unwrap();
    s.hover(1).unwrap();
    s.hover(0);
    assert!(s.wait_idle(WAIT));
    assert_eq!(counter.peek().unwrap(), Some(2));
}

#[derive(Default)]
struct Recorder {
    total: usize,
    done: Vec<(CardId, bool)>,
    finished: bool,
}

impl Progress for Recorder {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }
    fn item_done(&mut self, card: CardId, outcome: &FetchOutcome) {
        self.done.push((card, outcome.is_prediction()));
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}

#[test]
fn predict_all_hovers_every_eligible_card() {
    let client = FakeClient::ok(PREDICTION);
    let mut s = Session::new(two_card_page(), bridge(client.clone()));
    let mut rec = Recorder::default();

    assert_eq!(s.predict_all(WAIT, &mut rec), 2);
    assert_eq!(rec.total, 2);
    assert_eq!(rec.done.len(), 2);
    assert!(rec.done.iter().all(|(_, ok)| *ok));
    assert!(rec.finished);

    let complete = s.cards().iter().filter(|c| c.state == CardState::Complete).count();
    assert_eq!(complete, 2);
    assert_eq!(client.calls().len(), 2);
}

/// Takes the only worker down with it.
struct DyingClient {
    started: mpsc::Sender<()>,
}

impl PredictionClient for DyingClient {
    fn fetch(&self, _url: &str) -> FetchOutcome {
        let _ = self.started.send(());
        panic!("worker lost");
    }
}

#[test]
fn unqueued_fetch_settles_the_card() {
    let (tx, started) = mpsc::channel();
    let client = Arc::new(DyingClient { started: tx });
    let mut s = Session::new(two_card_page(), Bridge::new(client, "https://predict.test/", 1));

    s.hover(0).unwrap();
    started.recv_timeout(WAIT).unwrap();
    // let the worker unwind and drop the job queue
    thread::sleep(Duration::from_millis(300));

    assert!(s.hover(1).is_none());
    assert_eq!(state(&s, 1), Some(CardState::Complete));
    let card = s.doc().outer_html(s.cards()[1].node);
    assert!(card.contains(SUPPORT_CONTACT));
    assert!(!card.contains("Loading..."));
}
