#![allow(dead_code)]

use survey_desk::db::Db;
use survey_desk::services::tokens::TokenKeys;
use survey_desk::{router, AppState};

pub const TEST_SECRET: &str = "test-secret";

pub async fn create_test_db() -> Db {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path =
        std::env::temp_dir().join(format!("survey_desk_test_{}_{}.db", std::process::id(), id));
    // Clean up leftover files from previous runs
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
    let url = format!("sqlite://{}", path.display());
    Db::new(&url).await.expect("failed to create test database")
}

pub fn test_state(db: Db) -> AppState {
    AppState::new(db, TokenKeys::new(TEST_SECRET, 1))
}

pub async fn app() -> (axum::Router, Db) {
    let db = create_test_db().await;
    (router(test_state(db.clone())), db)
}
