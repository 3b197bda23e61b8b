/// Runtime configuration
///
/// Options are collected from the command line in `main.rs` and handed to the
/// library as a `TrackerConfig`.

use std::path::PathBuf;

/// Options that shape how the orchestrator talks to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Extra attempts made after a failed write before the error is surfaced
    pub write_retries: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { write_retries: 1 }
    }
}

/// Get the default database path with robust fallback strategy
pub fn default_database_path() -> std::io::Result<PathBuf> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(".habit_stats")),
        dirs::data_dir().map(|p| p.join("habit_stats")),
        dirs::config_dir().map(|p| p.join("habit_stats")),
        std::env::current_dir().ok().map(|p| p.join(".habit_stats")),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Make sure the directory is actually writable
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("stats.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let temp_path = std::env::temp_dir().join("habit_stats");
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path.join("stats.db"))
}
