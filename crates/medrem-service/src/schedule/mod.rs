//! Next-dose computation.

pub mod calculator;

pub use calculator::{advance_past, compute_next_dose, truncate_to_hour, MORNING_SLOT_HOUR};
