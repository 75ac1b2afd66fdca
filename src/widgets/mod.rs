//! UI Widgets - egui presentation of the strip engine
//!
//! Widgets hold no navigation state; the engine owns it

pub mod viewer;
