use budgetly_core::db::{self, DbPool, WriteHandle};
use chrono::Local;
use std::sync::Arc;

pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    pub db_dir: String,
}

pub fn get_test_db_dir(test_id: &str) -> String {
    let now = Local::now();
    now.format(&format!("./tests/output/%Y%m%d/%H%M%S-{}/", test_id))
        .to_string()
}

pub fn setup_test_db(test_id: &str) -> TestDb {
    let db_dir = get_test_db_dir(test_id);

    let db_path = db::init(&db_dir).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");
    let writer = WriteHandle::spawn(&db_path).expect("Failed to start writer");

    TestDb {
        pool,
        writer,
        db_dir,
    }
}
