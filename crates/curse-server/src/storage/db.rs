//! Relational curse store (Postgres or SQLite)
//!
//! Rows carry a `seq` column assigned at insert time. Ordering is always
//! `created_at DESC, seq DESC`, so curses stamped in the same millisecond
//! still come back newest insert first.

use async_trait::async_trait;
use curse_core::{BackendKind, Curse, CurseStore, LeaderboardEntry, Result, StorageFailure};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

enum Pool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// Run `$body` against whichever typed pool is connected, bound to `$pool`
macro_rules! with_pool {
    ($source:expr, $pool:ident => $body:expr) => {
        match $source {
            Pool::Postgres($pool) => $body,
            Pool::Sqlite($pool) => $body,
        }
    };
}

const POSTGRES_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS curses (
        id TEXT PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        target_name TEXT NOT NULL,
        curse_text TEXT NOT NULL,
        created_at BIGINT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS curses_seq ON curses (seq)",
    "CREATE INDEX IF NOT EXISTS curses_created_at ON curses (created_at, seq)",
    "CREATE INDEX IF NOT EXISTS curses_target_key ON curses (LOWER(target_name))",
];

const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS curses (
        id TEXT PRIMARY KEY,
        seq INTEGER NOT NULL,
        target_name TEXT NOT NULL,
        curse_text TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS curses_seq ON curses (seq)",
    "CREATE INDEX IF NOT EXISTS curses_created_at ON curses (created_at, seq)",
    "CREATE INDEX IF NOT EXISTS curses_target_key ON curses (LOWER(target_name))",
];

// Postgres fills `seq` from its sequence
const POSTGRES_INSERT: &str = r#"
    INSERT INTO curses (id, target_name, curse_text, created_at)
    VALUES ($1, $2, $3, $4)
"#;

// SQLite serializes writers, so the subquery cannot hand out the same seq twice
const SQLITE_INSERT: &str = r#"
    INSERT INTO curses (id, seq, target_name, curse_text, created_at)
    VALUES ($1, (SELECT COALESCE(MAX(seq), 0) + 1 FROM curses), $2, $3, $4)
"#;

const RECENT_QUERY: &str = r#"
    SELECT id, target_name, curse_text, created_at
    FROM curses
    ORDER BY created_at DESC, seq DESC
    LIMIT $1
"#;

const TARGET_QUERY: &str = r#"
    SELECT id, target_name, curse_text, created_at
    FROM curses
    WHERE LOWER(target_name) = LOWER($1)
    ORDER BY created_at DESC, seq DESC
"#;

// The latest spelling of each target is its display name
const LEADERBOARD_QUERY: &str = r#"
    SELECT target_name, total FROM (
        SELECT target_name,
               COUNT(*) OVER (PARTITION BY LOWER(target_name)) AS total,
               ROW_NUMBER() OVER (
                   PARTITION BY LOWER(target_name)
                   ORDER BY created_at DESC, seq DESC
               ) AS spelling_rank
        FROM curses
    ) ranked
    WHERE spelling_rank = 1
    ORDER BY total DESC, LOWER(target_name) ASC
    LIMIT $1
"#;

pub struct Database {
    pool: Pool,
    /// Set once the table has been created by this instance
    schema: OnceCell<()>,
}

fn db_err(e: sqlx::Error) -> StorageFailure {
    StorageFailure::Database(e.to_string())
}

fn is_postgres(database_url: &str) -> bool {
    database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite:") && database_url.contains(":memory:")
}

impl Database {
    pub async fn connect(database_url: &str, timeout: Duration) -> Result<Self> {
        let pool = if is_postgres(database_url) {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(timeout)
                .connect(database_url)
                .await
                .map_err(db_err)?;
            Pool::Postgres(pool)
        } else if database_url.starts_with("sqlite:") {
            let options = SqliteConnectOptions::from_str(database_url)
                .map_err(db_err)?
                .create_if_missing(true);

            let pool_options = if is_in_memory(database_url) {
                // Every SQLite memory connection is its own database; keep exactly one alive
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
            } else {
                SqlitePoolOptions::new().max_connections(5)
            };

            let pool = pool_options
                .acquire_timeout(timeout)
                .connect_with(options)
                .await
                .map_err(db_err)?;
            Pool::Sqlite(pool)
        } else {
            return Err(StorageFailure::Config(
                "DATABASE_URL must be a postgres:// or sqlite: URL".to_string(),
            ));
        };

        info!("Relational store connected");

        Ok(Self {
            pool,
            schema: OnceCell::new(),
        })
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.schema
            .get_or_try_init(|| async {
                let statements = match &self.pool {
                    Pool::Postgres(_) => POSTGRES_SCHEMA,
                    Pool::Sqlite(_) => SQLITE_SCHEMA,
                };
                for statement in statements {
                    with_pool!(&self.pool, pool => {
                        sqlx::query(*statement).execute(pool).await.map(|_| ())
                    })?;
                }

                info!("Relational schema ready");
                Ok::<(), sqlx::Error>(())
            })
            .await
            .map_err(db_err)?;

        Ok(())
    }

    /// Store an already built curse
    async fn insert(&self, curse: &Curse) -> Result<()> {
        self.ensure_schema().await?;

        let sql = match &self.pool {
            Pool::Postgres(_) => POSTGRES_INSERT,
            Pool::Sqlite(_) => SQLITE_INSERT,
        };

        with_pool!(&self.pool, pool => {
            sqlx::query(sql)
                .bind(&curse.id)
                .bind(&curse.target_name)
                .bind(&curse.curse_text)
                .bind(curse.created_at)
                .execute(pool)
                .await
                .map(|_| ())
        })
        .map_err(db_err)
    }
}

#[async_trait]
impl CurseStore for Database {
    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    async fn add_curse(&self, target_name: &str, curse_text: &str) -> Result<Curse> {
        let curse = Curse::new(target_name, curse_text);
        self.insert(&curse).await?;
        Ok(curse)
    }

    async fn get_recent_curses(&self, limit: usize) -> Result<Vec<Curse>> {
        self.ensure_schema().await?;

        let rows: Vec<CurseRow> = with_pool!(&self.pool, pool => {
            sqlx::query_as::<_, CurseRow>(RECENT_QUERY)
                .bind(sql_limit(limit))
                .fetch_all(pool)
                .await
        })
        .map_err(db_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn get_curses_for_target(&self, target_name: &str) -> Result<Vec<Curse>> {
        self.ensure_schema().await?;

        let rows: Vec<CurseRow> = with_pool!(&self.pool, pool => {
            sqlx::query_as::<_, CurseRow>(TARGET_QUERY)
                .bind(target_name.trim())
                .fetch_all(pool)
                .await
        })
        .map_err(db_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn get_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        self.ensure_schema().await?;

        let rows: Vec<(String, i64)> = with_pool!(&self.pool, pool => {
            sqlx::query_as::<_, (String, i64)>(LEADERBOARD_QUERY)
                .bind(sql_limit(limit))
                .fetch_all(pool)
                .await
        })
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(name, total)| LeaderboardEntry::new(name, total.max(0) as u64))
            .collect())
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct CurseRow {
    id: String,
    target_name: String,
    curse_text: String,
    created_at: i64,
}

impl From<CurseRow> for Curse {
    fn from(r: CurseRow) -> Self {
        Curse {
            id: r.id,
            target_name: r.target_name,
            curse_text: r.curse_text,
            created_at: r.created_at,
        }
    }
}
