// src/lib.rs
//! Client for the SISAB indicator panel: a JSF form wizard driven through partial
//! postbacks, with cascading area catalogs and batch CSV exports.

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod config;
pub mod core;
pub mod error;

pub mod catalog;
pub mod selection;
pub mod token;

pub mod engine;
pub mod session;
pub mod cascade;

pub mod batch;
pub mod file;
pub mod progress;

#[cfg(feature = "cli")]
pub mod cli;

pub use batch::{AreaLevel, BatchPlan, BatchSummary, Combination, FailurePolicy};
pub use cascade::StateLookup;
pub use catalog::{Field, OptionSet};
pub use engine::{CsvEnvelope, FormParams, ReportResponse, RowPolicy};
pub use error::{Error, Result};
pub use selection::Choice;
pub use session::Session;
