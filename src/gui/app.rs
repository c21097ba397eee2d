// src/gui/app.rs
use std::{
    error::Error,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use eframe::egui;

use crate::{
    bridge::Bridge,
    config::options::Options,
    counter::UsageCounter,
    fragment::ChartParams,
    session::Session,
    watcher::PageWatcher,
};

pub fn run(options: eframe::NativeOptions) -> Result<(), Box<dyn Error>> {
    eframe::run_native(
        "FlyOnTime",
        options,
        Box::new(|_cc| Ok(Box::new(App::new(Options::default_path())))),
    )?;
    Ok(())
}

pub struct App {
    pub options: Options,
    pub options_path: PathBuf,

    // the open page (UI thread only)
    pub session: Option<Session>,
    pub watcher: Option<PageWatcher>,

    // path field UX
    pub path_text: String,

    pub status: String,

    // pointer tracking, so enter/leave fire once per crossing
    pub hovered_card: Option<usize>,
    pub hovered_panel: Option<usize>,
    pub chart: Option<(usize, ChartParams)>,
}

impl App {
    pub fn new(options_path: PathBuf) -> Self {
        let options = match Options::load(&options_path) {
            Ok(o) => o,
            Err(e) => {
                loge!("Options: {} unreadable ({e}), using defaults", options_path.display());
                Options::default()
            }
        };

        let mut app = Self {
            path_text: options
                .last_page
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            options,
            options_path,
            session: None,
            watcher: None,
            status: s!("Open a saved results page"),
            hovered_card: None,
            hovered_panel: None,
            chart: None,
        };

        if let Some(last) = app.options.last_page.clone() {
            if last.exists() {
                app.open_page(&last);
            }
        }
        app
    }

    /// Open `path`, start watching it and remember it for next time.
    pub fn open_page(&mut self, path: &Path) {
        let bridge = match Bridge::from_options(&self.options) {
            Ok(b) => b,
            Err(e) => {
                self.status = format!("HTTP client failed: {e}");
                loge!("{}", self.status);
                return;
            }
        };

        let session = match Session::open(path, bridge) {
            Ok(s) => s,
            Err(e) => {
                self.status = format!("Could not open {}: {e}", path.display());
                loge!("{}", self.status);
                return;
            }
        };
        let session = if self.options.count_usage {
            session.with_counter(UsageCounter::new(UsageCounter::default_path()))
        } else {
            session
        };

        self.watcher = match PageWatcher::watch(path, self.options.debounce()) {
            Ok(w) => Some(w),
            Err(e) => {
                logw!("Not watching {}: {e}", path.display());
                None
            }
        };

        self.status = scan_status(&session);
        self.session = Some(session);
        self.hovered_card = None;
        self.hovered_panel = None;
        self.chart = None;

        self.options.last_page = Some(path.to_path_buf());
        if let Err(e) = self.options.save(&self.options_path) {
            logw!("Options: save failed ({e})");
        }
    }

    pub fn rescan(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.rescan();
        }
        self.after_rescan();
    }

    fn after_rescan(&mut self) {
        self.hovered_card = None;
        self.hovered_panel = None;
        self.chart = None;
        if let Some(session) = self.session.as_ref() {
            self.status = scan_status(session);
        }
    }

    /// Page file changed on disk: reload, reset every card, scan again.
    fn poll_watcher(&mut self) {
        let Some(watcher) = self.watcher.as_mut() else { return };
        if !watcher.poll(Instant::now()) {
            return;
        }
        let reloaded = match self.session.as_mut() {
            Some(session) => session.reload().map(|_| ()),
            None => Ok(()),
        };
        if let Err(e) = reloaded {
            loge!("Reload failed: {e}");
            self.status = format!("Reload failed: {e}");
            return;
        }
        self.after_rescan();
    }

    /* ---------- pointer events from the card list ---------- */

    pub fn card_entered(&mut self, index: usize) {
        if self.hovered_card == Some(index) {
            return;
        }
        self.hovered_card = Some(index);
        if let Some(session) = self.session.as_mut() {
            if session.hover(index).is_some() {
                self.status = format!("Fetching prediction for card {index}");
            }
        }
    }

    pub fn panel_entered(&mut self, index: usize) {
        if self.hovered_panel == Some(index) {
            return;
        }
        self.panel_left();
        self.hovered_panel = Some(index);
        if let Some(session) = self.session.as_mut() {
            if let Some(params) = session.enter_panel(index) {
                self.chart = Some((index, params));
            }
        }
    }

    pub fn panel_left(&mut self) {
        if let (Some(index), Some(session)) = (self.hovered_panel.take(), self.session.as_mut()) {
            session.leave_panel(index);
        }
    }
}

fn scan_status(session: &Session) -> String {
    let report = session.report();
    format!("{} cards, {} eligible for a prediction", report.cards.len(), report.count_eligible())
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_watcher();

        let mut busy = false;
        if let Some(session) = self.session.as_mut() {
            if session.pump() > 0 {
                self.status = format!("{} fetches pending", session.pending());
            }
            busy = session.pending() > 0;
        }

        egui::TopBottomPanel::top("open_bar").show(ctx, |ui| {
            crate::gui::components::open_bar::draw(ui, self);
        });

        egui::SidePanel::right("detail")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                crate::gui::components::detail_panel::draw(ui, self);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            crate::gui::components::card_list::draw(ui, self);
        });

        // completions and file events arrive off-thread; keep ticking while either can land
        let mut tick = if busy { Duration::from_millis(50) } else { Duration::from_millis(250) };
        if let Some(left) = self.watcher.as_ref().and_then(|w| w.time_to_fire(Instant::now())) {
            tick = tick.min(left);
        }
        ctx.request_repaint_after(tick);
    }
}
