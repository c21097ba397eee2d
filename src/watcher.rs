// src/watcher.rs
//! Page change watcher.
//!
//! Bursts of file events collapse into one "page changed" signal after a quiet
//! window: every qualifying event pushes the deadline out again, and the signal
//! fires once when the deadline passes. Nothing is queued behind it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    /// Content replaced or rewritten.
    Structural,
    /// Permissions, timestamps and other metadata.
    Attribute,
}

/// Which file events count as a page mutation.
pub fn classify(kind: &EventKind) -> Option<MutationKind> {
    match kind {
        EventKind::Create(_) => Some(MutationKind::Structural),
        EventKind::Modify(ModifyKind::Metadata(_)) => Some(MutationKind::Attribute),
        EventKind::Modify(_) => Some(MutationKind::Structural),
        EventKind::Access(_) | EventKind::Remove(_) | EventKind::Any | EventKind::Other => None,
    }
}

#[derive(Clone, Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// A qualifying mutation at `now`. Replaces any pending deadline.
    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// `true` exactly once per quiet window.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Watches one page snapshot on disk.
///
/// The parent directory is watched rather than the file, so saves that replace
/// the file (write to temp, rename over) are seen too.
pub struct PageWatcher {
    path: PathBuf,
    file_name: OsString,
    events: mpsc::Receiver<notify::Result<Event>>,
    debouncer: Debouncer,
    _watcher: RecommendedWatcher,
}

impl PageWatcher {
    pub fn watch(path: &Path, window: Duration) -> Result<Self> {
        let path = path.canonicalize()?;
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| Error::Page(format!("not a file: {}", path.display())))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Page(format!("no parent directory: {}", path.display())))?;

        let (tx, events) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        logf!("watching {} ({} ms quiet window)", path.display(), window.as_millis());

        Ok(Self { path, file_name, events, debouncer: Debouncer::new(window), _watcher: watcher })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking: take in whatever events arrived, then check the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        while let Ok(res) = self.events.try_recv() {
            self.absorb(res, now);
        }
        self.debouncer.poll(now)
    }

    /// Block until the next fire. `false` once the underlying watcher is gone.
    pub fn wait(&mut self) -> bool {
        loop {
            match self.next_event(None) {
                Step::Fired => return true,
                Step::Closed => return false,
                Step::Continue => {}
            }
        }
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    pub fn wait_timeout(&mut self, timeout: Duration) -> bool {
        let give_up = Instant::now() + timeout;
        loop {
            match self.next_event(Some(give_up)) {
                Step::Fired => return true,
                Step::Closed => return false,
                Step::Continue if Instant::now() >= give_up => return false,
                Step::Continue => {}
            }
        }
    }

    /// Time left before a pending fire, for callers that schedule their own wakeups.
    pub fn time_to_fire(&self, now: Instant) -> Option<Duration> {
        self.debouncer.deadline().map(|d| d.saturating_duration_since(now))
    }

    fn next_event(&mut self, give_up: Option<Instant>) -> Step {
        let now = Instant::now();
        if self.debouncer.poll(now) {
            return Step::Fired;
        }
        let until = match (self.debouncer.deadline(), give_up) {
            (Some(d), Some(g)) => Some(d.min(g)),
            (d, g) => d.or(g),
        };
        let received = match until {
            Some(t) => self.events.recv_timeout(t.saturating_duration_since(now)),
            None => self.events.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(res) => {
                self.absorb(res, Instant::now());
                Step::Continue
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Step::Continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => Step::Closed,
        }
    }

    fn absorb(&mut self, res: notify::Result<Event>, now: Instant) {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                logw!("watch error on {}: {e}", self.path.display());
                return;
            }
        };
        if !event.paths.iter().any(|p| p.file_name() == Some(self.file_name.as_os_str())) {
            return;
        }
        if let Some(kind) = classify(&event.kind) {
            logd!("page mutation ({kind:?}): {:?}", event.kind);
            self.debouncer.signal(now);
        }
    }
}

enum Step {
    Fired,
    Continue,
    Closed,
}
