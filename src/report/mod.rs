//! Report rendering and CSV exports.

pub mod export;
pub mod generator;

pub use export::write_exports;
pub use generator::{generate_csv_report, generate_json_report, generate_markdown_report};
