//! # SQLite Persistence
//!
//! Durable capsule storage backed by a single SQLite file.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::{CapsuleError, Result};
use crate::features::capsules::{Capsule, CapsuleStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlite::{Connection, State};
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS capsules (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        recipient TEXT NOT NULL,
        payload TEXT NOT NULL,
        due_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_capsules_due_at ON capsules (due_at);
";

/// Shared handle to the capsule database.
///
/// Cloning is cheap; all clones share one connection behind an async mutex,
/// which is what makes every store operation atomic.
#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path` and ensure the schema exists
    pub async fn new(path: &str) -> Result<Self> {
        let connection = sqlite::open(path)?;
        connection.execute(SCHEMA)?;

        info!("Opened capsule database at {path}");

        Ok(Database {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Open a private in-memory database
    pub async fn in_memory() -> Result<Self> {
        Self::new(":memory:").await
    }

    /// Number of capsules still waiting for delivery
    pub async fn count_pending(&self) -> Result<i64> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare("SELECT COUNT(*) AS pending FROM capsules")?;

        match statement.next()? {
            State::Row => Ok(statement.read::<i64, _>("pending")?),
            State::Done => Ok(0),
        }
    }
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| CapsuleError::CorruptRow(format!("due_at out of range: {millis}")))
}

#[async_trait]
impl CapsuleStore for Database {
    async fn insert(&self, recipient: &str, payload: &str, due_at: DateTime<Utc>) -> Result<i64> {
        let conn = self.connection.lock().await;

        let mut statement =
            conn.prepare("INSERT INTO capsules (recipient, payload, due_at) VALUES (?, ?, ?)")?;
        statement.bind((1, recipient))?;
        statement.bind((2, payload))?;
        statement.bind((3, to_millis(due_at)))?;
        while let State::Row = statement.next()? {}

        let mut statement = conn.prepare("SELECT last_insert_rowid() AS id")?;
        statement.next()?;
        let id = statement.read::<i64, _>("id")?;

        debug!("Inserted capsule {id} for {recipient}");
        Ok(id)
    }

    async fn query_due(&self, now: DateTime<Utc>) -> Result<Vec<Capsule>> {
        let conn = self.connection.lock().await;

        let mut statement = conn.prepare(
            "SELECT id, recipient, payload, due_at FROM capsules WHERE due_at <= ? ORDER BY due_at, id",
        )?;
        statement.bind((1, to_millis(now)))?;

        let mut capsules = Vec::new();
        while let State::Row = statement.next()? {
            capsules.push(Capsule {
                id: statement.read::<i64, _>("id")?,
                recipient: statement.read::<String, _>("recipient")?,
                payload: statement.read::<String, _>("payload")?,
                due_at: from_millis(statement.read::<i64, _>("due_at")?)?,
            });
        }

        Ok(capsules)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let conn = self.connection.lock().await;

        let mut statement = conn.prepare("DELETE FROM capsules WHERE id = ?")?;
        statement.bind((1, id))?;
        while let State::Row = statement.next()? {}

        Ok(())
    }
}
