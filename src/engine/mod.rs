// src/engine/mod.rs
//! Postback engine: composes one interaction's form, sends it, and classifies the answer.
mod postback;
mod types;

pub use types::{CsvEnvelope, FormParams, ReportResponse, RowPolicy};
