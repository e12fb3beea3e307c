// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::PredictionRecord;
use super::traits::Database;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn insert_prediction(&self, record: &PredictionRecord) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::insert_prediction(&conn, record)
    }

    async fn fetch_history(&self, limit: u32) -> Result<Vec<PredictionRecord>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_history(&conn, limit)
    }

    async fn prediction_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::prediction_count(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use crate::model::Label;
    use std::sync::Arc;

    async fn test_db() -> SqliteDatabase {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteDatabase::new(conn)
    }

    fn record(id: &str) -> PredictionRecord {
        PredictionRecord {
            prediction_id: id.to_string(),
            title: Some("Headline".to_string()),
            content: "Body".to_string(),
            label: Label::Real,
            probability: 0.9,
            model_version: "baseline_v0.1".to_string(),
            top_tokens: None,
            created_at: "2026-01-01T00:00:00.000000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_trait_table_count() {
        let db = test_db().await;
        assert_eq!(db.table_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_trait_insert_and_history() {
        let db = test_db().await;
        assert_eq!(db.prediction_count().await.unwrap(), 0);
        db.insert_prediction(&record("one")).await.unwrap();
        db.insert_prediction(&record("two")).await.unwrap();

        assert_eq!(db.prediction_count().await.unwrap(), 2);
        let history = db.fetch_history(1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].prediction_id, "two");
    }

    #[tokio::test]
    async fn test_trait_concurrent_inserts() {
        let db: Arc<dyn Database> = Arc::new(test_db().await);
        let mut handles = Vec::new();
        for i in 0..8 {
            let db = Arc::clone(&db);
            handles.push(tokio::spawn(async move {
                db.insert_prediction(&record(&format!("p{i}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(db.prediction_count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");
        let path = path.to_str().unwrap();

        assert!(crate::db::open(path).is_err());
        let db = crate::db::initialize_database(path).unwrap();
        db.insert_prediction(&record("persisted")).await.unwrap();
        drop(db);

        let db = crate::db::open_database(path).unwrap();
        assert_eq!(db.fetch_history(10).await.unwrap()[0].prediction_id, "persisted");
    }
}
