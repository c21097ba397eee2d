// src/gui/components/card_list.rs
//
// One row per candidate card. Entering a row is the "pointer-enter" that
// dispatches a fetch; entering a finished row's result reveals its detail panel.

use eframe::egui;

use crate::coordinator::CardState;
use crate::extract::{Stops, Verdict};
use crate::gui::app::App;

struct Row {
    index: usize,
    title: String,
    state: CardState,
    note: Option<String>,
    result: Option<String>,
    eligible: bool,
}

enum Pointer {
    Card(usize),
    Panel(usize),
}

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let Some(session) = app.session.as_ref() else {
        ui.centered_and_justified(|ui| ui.weak("No page open"));
        return;
    };

    let rows: Vec<Row> = session
        .cards()
        .into_iter()
        .map(|c| {
            let (title, note) = match c.verdict {
                Verdict::Eligible(q) => {
                    let stops = match &q.stops {
                        Stops::Nonstop => s!("nonstop"),
                        Stops::OneStop { waypoint, layover } => format!("1 stop via {waypoint} ({layover})"),
                    };
                    (format!("{} · {} · {:02}:00 · {stops}", q.origin, q.airline, q.departure_hour), None)
                }
                Verdict::Ineligible(why) => (headline(&session.doc().inner_text(c.node)), Some(why.to_string())),
                Verdict::Malformed(why) => (s!("(unreadable card)"), Some(why.to_string())),
            };
            Row {
                index: c.id.index,
                title,
                state: c.state,
                note,
                result: c.result,
                eligible: c.verdict.is_eligible(),
            }
        })
        .collect();

    {
        let s = &mut ui.style_mut().spacing.scroll;
        s.floating = false;
        s.bar_width = 10.0;
        s.handle_min_length = 48.0;
    }

    let mut pointer: Vec<Pointer> = Vec::new();

    egui::ScrollArea::vertical()
        .id_salt("card_list_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for row in &rows {
                let frame = egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(badge(row.state, row.eligible));
                        if row.eligible {
                            ui.strong(&row.title);
                        } else {
                            ui.weak(&row.title);
                        }
                    });
                    if let Some(note) = &row.note {
                        ui.weak(note);
                    }
                    if let Some(result) = &row.result {
                        let r = ui.label(egui::RichText::new(result).color(egui::Color32::from_rgb(0x2e, 0x7d, 0x32)));
                        if r.hovered() {
                            pointer.push(Pointer::Panel(row.index));
                        }
                    }
                });
                if frame.response.contains_pointer() {
                    pointer.push(Pointer::Card(row.index));
                }
            }
        });

    let mut over_panel = false;
    for p in pointer {
        match p {
            Pointer::Card(i) => app.card_entered(i),
            Pointer::Panel(i) => {
                over_panel = true;
                app.panel_entered(i);
            }
        }
    }
    if !over_panel {
        app.panel_left();
    }
    if !ui.ui_contains_pointer() {
        app.hovered_card = None;
    }
}

fn badge(state: CardState, eligible: bool) -> egui::RichText {
    let (text, color) = match (state, eligible) {
        (_, false) => ("skip", egui::Color32::GRAY),
        (CardState::Unseen, true) => ("hover", egui::Color32::from_rgb(0xff, 0x98, 0x00)),
        (CardState::InFlight, true) => ("...", egui::Color32::from_rgb(0x19, 0x76, 0xd2)),
        (CardState::Complete, true) => ("done", egui::Color32::from_rgb(0x2e, 0x7d, 0x32)),
    };
    egui::RichText::new(text).monospace().color(color)
}

/// First two lines of a card's text, for rows we can't summarise.
fn headline(text: &str) -> String {
    text.lines().take(2).collect::<Vec<_>>().join(" · ")
}
