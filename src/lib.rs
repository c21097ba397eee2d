// src/lib.rs
// #![allow(dead_code)]
// #![allow(unused)]

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod specs;

pub mod airline;
pub mod airports;
pub mod fields;

pub mod bridge;
pub mod coordinator;
pub mod counter;
pub mod extract;
pub mod fragment;
pub mod progress;
pub mod session;
pub mod watcher;

pub mod gui;
