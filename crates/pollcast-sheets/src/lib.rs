//! # pollcast-sheets
//!
//! Keeps one spreadsheet row per voter: `[timestamp, name, choice]`.

mod plan;
mod sheets;

pub use plan::{plan_write, SheetWrite};
pub use sheets::GoogleSheetsLedger;
