// Database trait: async interface for the prediction history.
//
// The SQLite backend wraps a synchronous rusqlite Connection in a Mutex;
// keeping the trait async lets callers share one `Arc<dyn Database>` across
// request handlers without caring which backend sits behind it.

use anyhow::Result;
use async_trait::async_trait;

use super::models::PredictionRecord;

#[async_trait]
pub trait Database: Send + Sync {
    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    /// Store one prediction and return its row id.
    async fn insert_prediction(&self, record: &PredictionRecord) -> Result<i64>;

    /// Most recent predictions first, at most `limit` rows.
    async fn fetch_history(&self, limit: u32) -> Result<Vec<PredictionRecord>>;

    /// Total number of stored predictions.
    async fn prediction_count(&self) -> Result<i64>;
}
