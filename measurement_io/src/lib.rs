//! `measurement_io` — the I/O collaborators around the estimation core.
//!
//! # Module layout
//! - [`parser`]   — Measurement log files → paired measurement / truth records
//! - [`report`]   — Console report formatting (per-record table + RMSE)
//! - [`variance`] — Measurement-vs-truth variance diagnostics

pub mod parser;
pub mod report;
pub mod variance;

pub use parser::{parse_file, parse_log, ParsedLog};
