// src/bin/gui.rs
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]
use eframe::egui::{ IconData, ViewportBuilder };
use flyontime::{ config::{ consts::LOG_FILE, options::Options }, gui, log };
use image::{ Rgba, RgbaImage };

const ICON_SIZE: u32 = 64;

// Orange disc with a white horizontal "flight path" stripe.
fn app_icon() -> IconData {
    let c = (ICON_SIZE as f32 - 1.0) / 2.0;
    let r = c - 1.0;
    let rgba = RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let (dx, dy) = (x as f32 - c, y as f32 - c);
        if dx * dx + dy * dy > r * r {
            Rgba([0, 0, 0, 0])
        } else if dy.abs() < 4.0 && dx.abs() < r * 0.7 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([255, 152, 0, 255])
        }
    });
    let (w, h) = rgba.dimensions();
    IconData { rgba: rgba.into_raw(), width: w, height: h }
}

fn main() {
    log::init(&Options::store_dir().join(LOG_FILE));

    let options = eframe::NativeOptions {
        // eframe 0.32: icon set via viewport builder
        viewport: ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_icon(app_icon()),
        ..Default::default()
    };

    if let Err(e) = gui::run(options) {
        eprintln!("GUI failed: {}", e);
        std::process::exit(1);
    }
}
