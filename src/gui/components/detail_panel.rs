// src/gui/components/detail_panel.rs
//
// Right-hand panel: what we know about the card under the pointer.

use eframe::egui;

use crate::bridge::query_url;
use crate::extract::Verdict;
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Flight");
    ui.separator();

    let (Some(session), Some(index)) = (app.session.as_ref(), app.hovered_card) else {
        ui.weak("Hover a card to see its details");
        return;
    };
    let cards = session.cards();
    let Some(card) = cards.iter().find(|c| c.id.index == index) else {
        return;
    };

    egui::Grid::new("detail_grid").num_columns(2).striped(true).show(ui, |ui| {
        ui.label("Card");
        ui.label(card.id.to_string());
        ui.end_row();

        ui.label("State");
        ui.label(format!("{:?}", card.state));
        ui.end_row();

        match card.verdict {
            Verdict::Eligible(q) => {
                ui.label("Origin");
                ui.label(q.origin.as_str());
                ui.end_row();
                ui.label("Airline");
                ui.label(q.airline.as_str());
                ui.end_row();
                ui.label("Departs");
                ui.label(format!("{:02}:00", q.departure_hour));
                ui.end_row();
                ui.label("Day / month");
                ui.label(format!("{} / {}", q.day_of_week, q.month_of_year));
                ui.end_row();
                ui.label("Stops");
                ui.label(q.stop_count().to_string());
                ui.end_row();
                if let (Some(w), Some(l)) = (q.waypoint(), q.layover()) {
                    ui.label("Via");
                    ui.label(format!("{w}, {l}"));
                    ui.end_row();
                }
                ui.label("Request");
                ui.monospace(query_url(&app.options.api_base, q));
                ui.end_row();
            }
            Verdict::Ineligible(why) => {
                ui.label("Skipped");
                ui.label(why.to_string());
                ui.end_row();
            }
            Verdict::Malformed(why) => {
                ui.label("Unreadable");
                ui.label(why.to_string());
                ui.end_row();
            }
        }
    });

    if let Some(result) = &card.result {
        ui.separator();
        ui.strong("Prediction");
        ui.label(result);
    }

    if let Some(aff) = session.panel(index) {
        if aff.is_revealed(session.doc()) {
            ui.separator();
            ui.label(aff.detail_text(session.doc()));
        }
    }

    if let Some((_, chart)) = app.chart.filter(|(i, _)| *i == index) {
        let fmt = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_else(|| s!("?"));
        ui.weak(format!("delay distribution: shape {}, scale {}", fmt(chart.shape), fmt(chart.scale)));
    }
}
