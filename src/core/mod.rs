// src/core/mod.rs

pub mod dom;
pub mod net;
pub mod text;

pub use dom::{Document, NodeId};
