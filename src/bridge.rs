// src/bridge.rs
//! Prediction fetches.
//!
//! A [`Bridge`] owns a small pool of worker threads. The owning thread hands it
//! [`Dispatch`]es; workers run the GET through a [`PredictionClient`] and send a
//! [`Completion`] back. Nothing here writes to the page except [`inject`], which
//! the coordinator calls once it has decided a completion is still wanted.

use std::collections::HashSet;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::config::consts::SUPPORT_CONTACT;
use crate::config::options::Options;
use crate::coordinator::{CardId, Completion, Dispatch, Ticket};
use crate::core::net;
use crate::core::{Document, NodeId};
use crate::error::Result;
use crate::extract::FlightCardQuery;
use crate::fragment::Affordances;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx body, injected as-is.
    Prediction(String),
    /// Non-2xx status, or `None` when the request never got an answer.
    ServiceError { status: Option<u16> },
}

impl FetchOutcome {
    pub fn is_prediction(&self) -> bool {
        matches!(self, FetchOutcome::Prediction(_))
    }
}

/// The one seam to the prediction service.
pub trait PredictionClient: Send + Sync {
    fn fetch(&self, url: &str) -> FetchOutcome;
}

pub struct HttpPredictionClient {
    client: reqwest::blocking::Client,
}

impl HttpPredictionClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self { client: net::client(timeout)? })
    }
}

impl PredictionClient for HttpPredictionClient {
    fn fetch(&self, url: &str) -> FetchOutcome {
        match net::http_get(&self.client, url) {
            Ok(resp) if resp.is_success() => FetchOutcome::Prediction(resp.body),
            Ok(resp) => FetchOutcome::ServiceError { status: Some(resp.status) },
            Err(e) => {
                logw!("GET {url}: {e}");
                FetchOutcome::ServiceError { status: None }
            }
        }
    }
}

/// `{dayOfWeek}/{monthOfYear}/{origin}/{waypoint}/{airline}/{hour}/{layover}`
pub fn query_path(q: &FlightCardQuery) -> String {
    format!(
        "{}/{}/{}/{}/{}/{}/{}",
        q.day_of_week,
        q.month_of_year,
        q.origin,
        q.waypoint_param(),
        q.airline,
        q.departure_hour,
        q.layover_param()
    )
}

pub fn query_url(base: &str, q: &FlightCardQuery) -> String {
    format!("{}/{}", base.trim_end_matches('/'), query_path(q))
}

pub fn error_fragment() -> String {
    format!(
        "Error. Sorry, no prediction could be loaded for this flight.<br>\
         If it keeps happening, write to {SUPPORT_CONTACT}."
    )
}

/// Write a fetch outcome into the target cell.
pub fn inject(doc: &mut Document, target: NodeId, query: &FlightCardQuery, outcome: &FetchOutcome) -> Option<Affordances> {
    match outcome {
        FetchOutcome::Prediction(html) => {
            doc.set_inner_html(target, html);
            Affordances::find(doc, target)
        }
        FetchOutcome::ServiceError { status } => {
            doc.set_inner_html(target, &error_fragment());
            let params = serde_json::to_string(query).unwrap_or_else(|_| format!("{query:?}"));
            match status {
                Some(code) => loge!("prediction service answered {code}; request parameters: {params}"),
                None => loge!("prediction service unreachable; request parameters: {params}"),
            }
            None
        }
    }
}

struct Job {
    dispatch: Dispatch,
    url: String,
}

pub struct Bridge {
    base: String,
    jobs: mpsc::Sender<Job>,
    done: mpsc::Receiver<Completion>,
    pending: HashSet<(CardId, Ticket)>,
}

impl Bridge {
    pub fn new(client: Arc<dyn PredictionClient>, base: impl Into<String>, workers: usize) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel::<Completion>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        for _ in 0..workers.max(1) {
            let jobs = Arc::clone(&job_rx);
            let client = Arc::clone(&client);
            let tx = done_tx.clone();

            thread::spawn(move || {
                loop {
                    // hold the lock only while taking a job
                    let next = match jobs.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    let Ok(Job { dispatch, url }) = next else { break };

                    logd!("card {}: GET {url}", dispatch.card);
                    let outcome = client.fetch(&url);
                    let done = Completion {
                        card: dispatch.card,
                        ticket: dispatch.ticket,
                        query: dispatch.query,
                        target: dispatch.target,
                        outcome,
                    };
                    if tx.send(done).is_err() {
                        break; // bridge dropped
                    }
                }
            });
        }

        Self { base: base.into(), jobs: job_tx, done: done_rx, pending: HashSet::new() }
    }

    /// HTTP client, base URL and pool size from the user's options.
    pub fn from_options(opts: &Options) -> Result<Self> {
        let client = HttpPredictionClient::new(opts.request_timeout())?;
        Ok(Self::new(Arc::new(client), opts.api_base.clone(), opts.workers))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Queue a fetch. The same card and ticket twice is a no-op.
    pub fn dispatch(&mut self, dispatch: Dispatch) -> bool {
        let key = (dispatch.card, dispatch.ticket);
        if !self.pending.insert(key) {
            logd!("card {}: fetch already pending", dispatch.card);
            return false;
        }
        let url = query_url(&self.base, &dispatch.query);
        if self.jobs.send(Job { dispatch, url }).is_err() {
            loge!("bridge: worker pool is gone");
            self.pending.remove(&key);
            return false;
        }
        true
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Completions that are ready now.
    pub fn drain(&mut self) -> Vec<Completion> {
        let mut out = Vec::new();
        while let Ok(done) = self.done.try_recv() {
            self.pending.remove(&(done.card, done.ticket));
            out.push(done);
        }
        out
    }

    /// Block up to `timeout` for the next completion.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<Completion> {
        if self.pending.is_empty() {
            return None;
        }
        let done = self.done.recv_timeout(timeout).ok()?;
        self.pending.remove(&(done.card, done.ticket));
        Some(done)
    }
}
