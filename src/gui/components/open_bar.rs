// src/gui/components/open_bar.rs
//
// Page path entry, Open / Rescan buttons and the status line.

use std::path::PathBuf;

use eframe::egui;
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.horizontal(|ui| {
        ui.label("Page:");
        let edit = ui.add(
            egui::TextEdit::singleline(&mut app.path_text)
                .hint_text("saved results page (.html)")
                .desired_width(ui.available_width() - 160.0),
        );
        let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if ui.button("Open").clicked() || enter {
            let path = PathBuf::from(app.path_text.trim());
            if path.as_os_str().is_empty() {
                app.status = s!("No page path given");
            } else {
                logf!("UI: open {}", path.display());
                app.open_page(&path);
            }
        }

        let can_rescan = app.session.is_some();
        if ui.add_enabled(can_rescan, egui::Button::new("Rescan")).clicked() {
            logf!("UI: rescan");
            app.rescan();
        }
    });

    ui.horizontal(|ui| {
        ui.label(&app.status);
        if let Some(w) = app.watcher.as_ref() {
            ui.separator();
            ui.weak(format!("watching {}", w.path().display()));
        }
    });
}
