// tests/common/mod.rs
//
// Synthetic results pages and fake prediction services for the integration tests.
#![allow(dead_code)]

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use flyontime::bridge::{Bridge, FetchOutcome, PredictionClient};

pub struct Card {
    pub times: &'static str,
    pub airline: &'static str,
    pub endpoints: &'static str,
    pub connections: &'static str,
    pub emissions: &'static str,
    pub price: &'static str,
}

pub fn nonstop(airline: &'static str, endpoints: &'static str, times: &'static str) -> Card {
    Card { times, airline, endpoints, connections: "Nonstop\n5 hr 15 min", emissions: "120 kg CO2", price: "$240" }
}

pub fn one_stop(airline: &'static str, endpoints: &'static str, times: &'static str, connections: &'static str) -> Card {
    Card { times, airline, endpoints, connections, emissions: "210 kg CO2", price: "$185" }
}

fn lines(text: &str) -> String {
    text.lines().map(|l| format!("<div>{l}</div>")).collect()
}

impl Card {
    /// li > div > [div, div > [div > [div, div > [body]]]] plus two button rows.
    pub fn to_html(&self) -> String {
        let body = format!(
            "<div class=\"body\"><div>logo</div><div><div>{}</div><div>{}</div></div>\
             <div><span>{}</span><span>{}</span></div><div>{}</div><div>{}</div><div>{}</div></div>",
            self.times,
            self.airline,
            self.endpoints,
            self.endpoints.split('–').next().unwrap_or(""),
            lines(self.connections),
            self.emissions,
            self.price,
        );
        format!(
            "<li><div><div></div><div><div><div></div><div>{body}</div></div></div></div>\
             <div><div><button>Select</button></div></div>\
             <div><div><button>Details</button></div></div></li>"
        )
    }
}

pub struct Trip {
    pub header: Option<&'static str>,
    pub depart: Option<&'static str>,
    pub ret: Option<&'static str>,
}

pub const ROUND_TRIP: Trip = Trip { header: Some("Departing flights"), depart: Some("Fri, Mar 7"), ret: Some("Sun, Mar 16") };

/// Four decoy lists, then the two result lists.
pub fn page(trip: &Trip, first: &[Card], second: &[Card]) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>Flights</title></head><body>");
    if let Some(d) = trip.depart {
        html.push_str(&format!("<input aria-label=\"Departure\" value=\"{d}\">"));
    }
    if let Some(r) = trip.ret {
        html.push_str(&format!("<input aria-label=\"Return\" value=\"{r}\">"));
    }
    for i in 0..4 {
        html.push_str(&format!("<ul><li>menu {i}</li></ul>"));
    }
    if let Some(h) = trip.header {
        html.push_str(&format!("<div><h3>{h}</h3><span>tips</span></div>"));
    }
    for list in [first, second] {
        html.push_str("<ul>");
        for c in list {
            html.push_str(&c.to_html());
        }
        html.push_str("</ul>");
    }
    html.push_str("</body></html>");
    html
}

pub fn bridge(client: Arc<dyn PredictionClient>) -> Bridge {
    Bridge::new(client, "https://predict.test/", 2)
}

/// Answers every request the same way and records the URLs.
pub struct FakeClient {
    pub reply: FetchOutcome,
    pub calls: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn ok(html: &str) -> Arc<Self> {
        Arc::new(Self { reply: FetchOutcome::Prediction(html.to_string()), calls: Mutex::new(Vec::new()) })
    }

    pub fn failing(status: Option<u16>) -> Arc<Self> {
        Arc::new(Self { reply: FetchOutcome::ServiceError { status }, calls: Mutex::new(Vec::new()) })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PredictionClient for FakeClient {
    fn fetch(&self, url: &str) -> FetchOutcome {
        self.calls.lock().unwrap().push(url.to_string());
        self.reply.clone()
    }
}

/// Holds each request until the test releases it.
pub struct GatedClient {
    gate: Mutex<mpsc::Receiver<()>>,
    reply: FetchOutcome,
}

impl GatedClient {
    pub fn new(html: &str) -> (Arc<Self>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (Arc::new(Self { gate: Mutex::new(rx), reply: FetchOutcome::Prediction(html.to_string()) }), tx)
    }
}

impl PredictionClient for GatedClient {
    fn fetch(&self, _url: &str) -> FetchOutcome {
        let _ = self.gate.lock().unwrap().recv_timeout(Duration::from_secs(5));
        self.reply.clone()
    }
}

pub const PREDICTION: &str = "<div id=\"flyontime-data\"><b>82% on time</b>\
    <div class=\"flyontime-tooltip\" style=\"display: none\">Median delay 9 min\
    <svg id=\"delay-chart\" data-shape=\"1.6\" data-scale=\"14.5\"></svg></div></div>";
