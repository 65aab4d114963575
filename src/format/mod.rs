//! Pure presentation helpers: status badges and locale formatting.

pub mod badge;
pub mod display;

pub use badge::{active_badge, borrow_badge, Badge, StatusBadge};
pub use display::Formatter;
