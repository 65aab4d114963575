//! SenseLib admin core.
//!
//! Generic list and detail-form controllers for the library admin screens,
//! configured per entity, plus status/format helpers and interactive widgets.

pub mod app;
pub mod controllers;
pub mod format;
pub mod modules;
pub mod store;
pub mod widgets;

#[cfg(test)]
mod testing;

pub use app::App;
pub use controllers::{ControllerError, DetailForm, Draft, ListController};
