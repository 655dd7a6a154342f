//! Database and application state fixtures

use taskdesk::{AppState, Config, Database};
use tempfile::TempDir;

/// A file-backed database that lives as long as the returned TempDir
pub fn temp_database() -> (Database, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::open(dir.path().join("taskdesk.db")).expect("Failed to open database");
    (db, dir)
}

/// Application state over a fresh database with a small page size
pub fn test_state(per_page: u32) -> (AppState, TempDir) {
    let (db, dir) = temp_database();
    let config = Config::default().with_per_page(per_page);
    (AppState::new(db, config), dir)
}
