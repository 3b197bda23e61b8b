/// Points calculation
///
/// Points are always recomputed from the completed-record count; there is no
/// in-place increment path that could drift.

use crate::domain::CompletionLog;

/// Points awarded per completed record
pub const POINTS_PER_COMPLETION: u32 = 10;

/// Points for a given number of completed records
pub fn points_for(completed_count: u32) -> u32 {
    completed_count.saturating_mul(POINTS_PER_COMPLETION)
}

/// Total points for the whole log
pub fn calculate_points(log: &CompletionLog) -> u32 {
    points_for(log.completed_count())
}
