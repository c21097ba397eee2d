// src/gui/components/mod.rs
pub mod card_list;
pub mod detail_panel;
pub mod open_bar;
