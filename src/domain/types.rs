/// Core identifier and date types used throughout the domain layer
///
/// Habits themselves are owned by an external CRUD layer; the stats engine only
/// ever sees their identifiers and the calendar days they were completed on.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// ISO calendar-day format used for completion dates
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Opaque identifier of a habit
///
/// This is a wrapper around the identifier string so that a habit ID can't be
/// confused with any other string. Identifiers are compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    /// Parse a habit ID supplied by a caller
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitId("Habit ID cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse an ISO `YYYY-MM-DD` logical day
pub fn parse_day(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
        .map_err(|_| DomainError::InvalidDate(format!("Expected YYYY-MM-DD, got '{}'", s)))
}
