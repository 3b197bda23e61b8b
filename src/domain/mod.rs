/// Domain module containing the completion log and derived-stats data types
///
/// This module defines the core entities (CompletionRecord, CompletionLog,
/// Achievement, UserStats) that the analytics layer computes over and the
/// storage layer persists.

pub mod achievement;
pub mod completion;
pub mod stats;
pub mod types;

// Re-export public types for easy access
pub use achievement::*;
pub use completion::*;
pub use stats::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur while validating caller input
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid habit id: {0}")]
    InvalidHabitId(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
