// src/specs/mod.rs
//! # Page “specs” module
//!
//! This module hosts the **page-shape knowledge** for the flight-search results page.
//! It encodes *where the ground truth lives in the markup* and nothing else.
//!
//! ## What lives here
//! - **Locating result cards**: the result lists are the 5th and 6th `<ul>` of the
//!   page; every `<li>` below them is a candidate card.
//! - **Positional card layout**: the card body sits at a fixed child path and its
//!   cells are addressed by index. [`card::locate`] resolves that once into named
//!   [`card::CardParts`]; [`card::read_record`] turns them into a plain-text
//!   [`card::FlightRecord`].
//! - **Trip header**: which leg the list shows and the dates typed into the
//!   search form ([`trip::TripContext`]).
//! - **Card geometry**: the inline style tweaks applied when a card is activated.
//!
//! ## What does **not** live here
//! - **Parsing** the texts (`fields`), **carrier lookup** (`airline`), **eligibility**
//!   (`extract`), **state** (`coordinator`) or **network** (`bridge`).
//!
//! ## Conventions & invariants
//! - One site, one layout. When the layout changes, this
//!   module is the only one that should need edits.
//! - A card that doesn't match the shape is a [`card::ShapeError`], which callers
//!   treat as "skip this card", never as a failure of the scan.
pub mod card;
pub mod results_page;
pub mod trip;
