use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{Snapshot, SnapshotPayload};
use crate::store::{AppendOutcome, SnapshotStore};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tracker_id TEXT NOT NULL,
        payload TEXT NOT NULL,
        created_at TEXT NOT NULL
    )";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_snapshots_tracker ON snapshots (tracker_id, id)";

/// Durable append-only snapshot history. AUTOINCREMENT gives monotonic ids;
/// the conditional append re-checks the latest id inside the insert
/// transaction, so a racing run is detected rather than silently doubled.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_INDEX).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn history_len(&self, tracker_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM snapshots WHERE tracker_id = ?")
                .bind(tracker_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

fn row_to_snapshot(row: &sqlx::sqlite::SqliteRow) -> Result<Snapshot> {
    let payload: SnapshotPayload = serde_json::from_str(row.try_get("payload")?)?;
    Ok(Snapshot {
        id: row.try_get("id")?,
        tracker_id: row.try_get("tracker_id")?,
        payload,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn get_latest(&self, tracker_id: &str) -> Result<Option<Snapshot>> {
        let row = sqlx::query(
            "SELECT id, tracker_id, payload, created_at
             FROM snapshots WHERE tracker_id = ?
             ORDER BY id DESC LIMIT 1",
        )
        .bind(tracker_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_snapshot).transpose()
    }

    async fn append_if_latest_unchanged(
        &self,
        tracker_id: &str,
        expected_prior: Option<i64>,
        payload: SnapshotPayload,
    ) -> Result<AppendOutcome> {
        let payload_json = serde_json::to_string(&payload)?;
        let created_at = Utc::now();

        let mut conn = self.pool.acquire().await?;

        // IMMEDIATE takes the write lock before the latest-id re-check. A
        // deferred transaction would let two racing appends both read MAX(id)
        // under shared locks and then deadlock upgrading to the write; with
        // the lock held up front the loser waits, re-reads, and sees the
        // moved id as an ordinary Conflict. A busy timeout on BEGIN means a
        // writer held the lock the whole wait, which is the same verdict.
        match sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await {
            Ok(_) => {}
            Err(err) if is_busy(&err) => return Ok(AppendOutcome::Conflict),
            Err(err) => return Err(err.into()),
        }

        let appended =
            append_in_tx(&mut conn, tracker_id, expected_prior, &payload_json, created_at).await;

        match appended {
            Ok(Some(id)) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(AppendOutcome::Appended(Snapshot {
                    id,
                    tracker_id: tracker_id.to_string(),
                    payload,
                    created_at,
                }))
            }
            Ok(None) => {
                sqlx::query("ROLLBACK").execute(&mut *conn).await?;
                Ok(AppendOutcome::Conflict)
            }
            Err(err) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(err)
            }
        }
    }
}

async fn append_in_tx(
    conn: &mut sqlx::SqliteConnection,
    tracker_id: &str,
    expected_prior: Option<i64>,
    payload_json: &str,
    created_at: DateTime<Utc>,
) -> Result<Option<i64>> {
    let latest: Option<i64> =
        sqlx::query_scalar("SELECT MAX(id) FROM snapshots WHERE tracker_id = ?")
            .bind(tracker_id)
            .fetch_one(&mut *conn)
            .await?;
    if latest != expected_prior {
        return Ok(None);
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO snapshots (tracker_id, payload, created_at)
         VALUES (?, ?, ?) RETURNING id",
    )
    .bind(tracker_id)
    .bind(payload_json)
    .bind(created_at)
    .fetch_one(&mut *conn)
    .await?;
    Ok(Some(id))
}

fn is_busy(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.message().contains("database is locked"))
}
