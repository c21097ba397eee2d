// src/progress.rs
use crate::bridge::FetchOutcome;
use crate::coordinator::CardId;

/// Progress reporting for batch predictions (`predict` in the CLI).
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of fetches dispatched.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One card's fetch landed in the page.
    fn item_done(&mut self, _card: CardId, _outcome: &FetchOutcome) {}

    /// Called at the end, whether or not everything came back.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
