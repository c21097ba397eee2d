// src/session.rs
//! One open results page.
//!
//! The session owns the pristine page source, the working document built from it,
//! the latest scan, the coordinator and the bridge. It lives on one thread; the
//! only cross-thread traffic is the bridge's completion channel, drained by
//! [`Session::pump`] or [`Session::wait_idle`].
//!
//! A rescan always starts from the pristine source, so the page's own content is
//! what gets scanned, never our injected fragments.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::bridge::{Bridge, FetchOutcome};
use crate::coordinator::{Applied, CardId, CardState, Completion, Coordinator};
use crate::core::{Document, NodeId};
use crate::counter::UsageCounter;
use crate::error::Result;
use crate::extract::{self, ScanReport, Verdict};
use crate::fragment::{Affordances, ChartParams};
use crate::progress::Progress;

/// Read-only view of one candidate card.
#[derive(Clone, Debug)]
pub struct CardView<'a> {
    pub id: CardId,
    pub node: NodeId,
    pub state: CardState,
    pub verdict: &'a Verdict,
    /// Text of the injected fragment once the card is complete.
    pub result: Option<String>,
}

pub struct Session {
    source_path: Option<PathBuf>,
    source: String,
    doc: Document,
    report: ScanReport,
    coordinator: Coordinator,
    bridge: Bridge,
    counter: Option<UsageCounter>,
}

impl Session {
    pub fn new(source: impl Into<String>, bridge: Bridge) -> Self {
        let source = source.into();
        let doc = Document::parse(&source);
        let mut s = Self {
            source_path: None,
            source,
            doc,
            report: ScanReport::default(),
            coordinator: Coordinator::new(),
            bridge,
            counter: None,
        };
        s.scan_current();
        s
    }

    pub fn open(path: &Path, bridge: Bridge) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let mut s = Self::new(source, bridge);
        s.source_path = Some(path.to_path_buf());
        logf!("opened {}", path.display());
        Ok(s)
    }

    /// Count every dispatched fetch in `counter`.
    pub fn with_counter(mut self, counter: UsageCounter) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn report(&self) -> &ScanReport {
        &self.report
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn pending(&self) -> usize {
        self.bridge.pending()
    }

    /* ---------- page lifecycle ---------- */

    /// Reset every card and scan the page again from its source.
    pub fn rescan(&mut self) -> &ScanReport {
        self.coordinator.reset_all();
        self.doc = Document::parse(&self.source);
        self.scan_current();
        &self.report
    }

    /// New page content (the watcher saw the file change, or a caller has fresh HTML).
    pub fn replace_source(&mut self, html: impl Into<String>) -> &ScanReport {
        self.source = html.into();
        self.rescan()
    }

    /// Re-read the page from disk.
    pub fn reload(&mut self) -> Result<&ScanReport> {
        let Some(path) = self.source_path.clone() else {
            return Ok(self.rescan());
        };
        let html = fs::read_to_string(&path)?;
        logf!("reloaded {}", path.display());
        Ok(self.replace_source(html))
    }

    fn scan_current(&mut self) {
        self.report = extract::scan(&self.doc);
        self.coordinator.track(&self.report);
    }

    /* ---------- pointer ---------- */

    /// Pointer entered card `index`. Returns the card id when a fetch went out.
    /// A fetch that can't be queued completes the card with the error fragment.
    pub fn hover(&mut self, index: usize) -> Option<CardId> {
        let id = self.coordinator.card_id(index)?;
        let dispatch = self.coordinator.activate(&mut self.doc, id)?;

        if let Some(counter) = &self.counter {
            match counter.get_counter() {
                Ok(n) => logd!("usage counter: {n}"),
                Err(e) => logw!("usage counter unavailable: {e}"),
            }
        }

        let fallback = dispatch.clone();
        if self.bridge.dispatch(dispatch) {
            return Some(id);
        }

        // nothing will ever answer this ticket; settle the card as a failed fetch
        logw!("card {id}: fetch could not be queued");
        self.apply(Completion {
            card: fallback.card,
            ticket: fallback.ticket,
            query: fallback.query,
            target: fallback.target,
            outcome: FetchOutcome::ServiceError { status: None },
        });
        None
    }

    /// Pointer entered the prediction panel of card `index`.
    pub fn enter_panel(&mut self, index: usize) -> Option<ChartParams> {
        let aff = self.panel(index)?;
        aff.reveal(&mut self.doc)
    }

    pub fn leave_panel(&mut self, index: usize) {
        if let Some(aff) = self.panel(index) {
            aff.conceal(&mut self.doc);
        }
    }

    pub fn panel(&self, index: usize) -> Option<Affordances> {
        let id = self.coordinator.card_id(index)?;
        if self.coordinator.state(id)? != CardState::Complete {
            return None;
        }
        let target = self.coordinator.parts(id)?.connections;
        Affordances::find(&self.doc, target)
    }

    /* ---------- completions ---------- */

    /// Apply whatever fetches have finished. Returns how many landed.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        for done in self.bridge.drain() {
            if self.apply(done) == Applied::Applied {
                applied += 1;
            }
        }
        applied
    }

    /// Apply completions until nothing is pending or `timeout` passes.
    /// Returns whether the bridge went idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        self.wait_idle_with(timeout, &mut crate::progress::NullProgress)
    }

    pub fn wait_idle_with(&mut self, timeout: Duration, progress: &mut dyn Progress) -> bool {
        let give_up = Instant::now() + timeout;
        while !self.bridge.is_idle() {
            let left = give_up.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return false;
            }
            if let Some(done) = self.bridge.wait_next(left) {
                let card = done.card;
                let outcome = done.outcome.clone();
                if self.apply(done) == Applied::Applied {
                    progress.item_done(card, &outcome);
                }
            }
        }
        true
    }

    /// Hover every eligible card and wait for the results.
    pub fn predict_all(&mut self, timeout: Duration, progress: &mut dyn Progress) -> usize {
        let indices: Vec<usize> = self.report.eligible().map(|c| c.index).collect();
        let sent = indices.into_iter().filter_map(|i| self.hover(i)).count();
        progress.begin(sent);
        if !self.wait_idle_with(timeout, progress) {
            progress.log(&format!("{} fetches still pending after {:?}", self.bridge.pending(), timeout));
        }
        progress.finish();
        sent
    }

    fn apply(&mut self, done: Completion) -> Applied {
        self.coordinator.complete(&mut self.doc, done)
    }

    /* ---------- views ---------- */

    pub fn cards(&self) -> Vec<CardView<'_>> {
        self.report
            .cards
            .iter()
            .filter_map(|c| {
                let id = self.coordinator.card_id(c.index)?;
                let state = self.coordinator.state(id)?;
                let result = match state {
                    CardState::Complete => {
                        self.coordinator.parts(id).map(|p| self.doc.inner_text(p.connections))
                    }
                    _ => None,
                };
                Some(CardView { id, node: c.node, state, verdict: &c.verdict, result })
            })
            .collect()
    }

    pub fn to_html(&self) -> String {
        self.doc.to_html()
    }
}

/// Short label for logs and summaries.
pub fn outcome_label(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Prediction(_) => s!("prediction"),
        FetchOutcome::ServiceError { status: Some(code) } => format!("service error {code}"),
        FetchOutcome::ServiceError { status: None } => s!("service unreachable"),
    }
}
