// src/progress.rs
use crate::batch::Combination;

/// Lightweight progress reporting for batch exports.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of combinations planned.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One combination was exported and written.
    fn item_done(&mut self, _combo: &Combination) {}

    /// One combination failed and the batch went on without it.
    fn item_failed(&mut self, _combo: &Combination, _error: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
