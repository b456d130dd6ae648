use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub mod models;
use models::*;

/// Thread-safe SQLite handle (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("opening database {path}"))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Bets ──────────────────────────────────────────────────────────────────

    /// Insert a new bet, returning its id
    pub fn insert_bet(&self, bet: &NewBet) -> Result<i64> {
        let prediction = serde_json::to_string(&bet.prediction)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO bets (home_team, away_team, prediction, match_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                bet.home_team,
                bet.away_team,
                prediction,
                bet.match_date,
                Utc::now()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List bets, most recent match date first (paginated)
    pub fn list_bets(&self, limit: i64, offset: i64) -> Result<Vec<Bet>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, home_team, away_team, prediction, match_date,
                    result, notes, created_at
             FROM bets ORDER BY match_date DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
            .query_map(params![limit, offset], map_bet_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(BetRow::into_bet).collect()
    }

    pub fn get_bet(&self, id: i64) -> Result<Option<Bet>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, home_team, away_team, prediction, match_date,
                        result, notes, created_at
                 FROM bets WHERE id = ?1",
                params![id],
                map_bet_row,
            )
            .optional()?;
        row.map(BetRow::into_bet).transpose()
    }

    /// Settle (or re-open) a bet. Returns false when no bet has that id.
    pub fn update_bet_result(
        &self,
        id: i64,
        result: BetResult,
        notes: Option<&str>,
    ) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE bets SET result = ?1, notes = ?2 WHERE id = ?3",
            params![result.as_db(), notes, id],
        )?;
        Ok(changed > 0)
    }

    // ── Stats ─────────────────────────────────────────────────────────────────

    /// Aggregate win/loss counts over all bets
    pub fn get_stats(&self) -> Result<BetStats> {
        let conn = self.lock()?;
        let (total_bets, wins, losses, pending): (i64, i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN result = 'win' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN result = 'loss' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN result IS NULL THEN 1 ELSE 0 END), 0)
             FROM bets",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )?;
        let win_rate = if total_bets > 0 {
            wins as f64 / total_bets as f64 * 100.0
        } else {
            0.0
        };
        Ok(BetStats {
            total_bets,
            wins,
            losses,
            pending,
            win_rate,
        })
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

/// Row as stored; the prediction JSON is decoded outside the rusqlite callback.
struct BetRow {
    id: i64,
    home_team: String,
    away_team: String,
    prediction: String,
    match_date: String,
    result: Option<String>,
    notes: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

impl BetRow {
    fn into_bet(self) -> Result<Bet> {
        let prediction = serde_json::from_str(&self.prediction)
            .with_context(|| format!("decoding stored prediction of bet {}", self.id))?;
        Ok(Bet {
            id: self.id,
            home_team: self.home_team,
            away_team: self.away_team,
            prediction,
            match_date: self.match_date,
            result: BetResult::from_db(self.result.as_deref()),
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

fn map_bet_row(row: &rusqlite::Row) -> rusqlite::Result<BetRow> {
    Ok(BetRow {
        id: row.get(0)?,
        home_team: row.get(1)?,
        away_team: row.get(2)?,
        prediction: row.get(3)?,
        match_date: row.get(4)?,
        result: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS bets (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    home_team   TEXT    NOT NULL,
    away_team   TEXT    NOT NULL,
    prediction  TEXT    NOT NULL,
    match_date  TEXT    NOT NULL,
    result      TEXT,
    notes       TEXT,
    created_at  TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bets_match_date ON bets(match_date);
CREATE INDEX IF NOT EXISTS idx_bets_result ON bets(result);
"#;
