//! SQLite-backed implementation: a pooled connection, `query_as::<_, Row>`
//! mapping structs with JSON-as-TEXT columns, `RETURNING *` on insert.

mod flow_repo;
mod scenario_repo;
mod session_repo;

use crate::error::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub use flow_repo::SqliteUserFlowRepository;
pub use scenario_repo::SqliteScenarioRepository;
pub use session_repo::SqliteSessionRepository;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS scenarios (
    id TEXT PRIMARY KEY,
    name TEXT,
    url TEXT NOT NULL,
    viewport TEXT NOT NULL,
    steps TEXT NOT NULL,
    setup TEXT NOT NULL,
    teardown TEXT NOT NULL,
    initial_variables TEXT,
    ast_schema_version INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scenario_execution_results (
    id TEXT PRIMARY KEY,
    scenario_id TEXT NOT NULL REFERENCES scenarios(id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    total_steps INTEGER NOT NULL,
    passed INTEGER NOT NULL,
    failed INTEGER NOT NULL,
    skipped INTEGER NOT NULL,
    duration_ms INTEGER NOT NULL,
    step_results TEXT NOT NULL,
    api_calls TEXT NOT NULL,
    environment TEXT,
    executed_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    name TEXT,
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    started_at TEXT NOT NULL,
    stopped_at TEXT
);

CREATE TABLE IF NOT EXISTS session_events (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    url TEXT,
    target TEXT,
    value TEXT,
    is_sensitive INTEGER NOT NULL,
    key TEXT,
    scroll_x REAL,
    scroll_y REAL
);

CREATE TABLE IF NOT EXISTS user_flows (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    nodes TEXT NOT NULL,
    edges TEXT NOT NULL,
    initial_variables TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flow_execution_results (
    id TEXT PRIMARY KEY,
    flow_id TEXT NOT NULL REFERENCES user_flows(id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    total_nodes INTEGER NOT NULL,
    passed_nodes INTEGER NOT NULL,
    failed_nodes INTEGER NOT NULL,
    skipped_nodes INTEGER NOT NULL,
    total_steps INTEGER NOT NULL,
    passed_steps INTEGER NOT NULL,
    failed_steps INTEGER NOT NULL,
    skipped_steps INTEGER NOT NULL,
    node_results TEXT NOT NULL,
    started_at TEXT NOT NULL,
    ended_at TEXT NOT NULL
);
"#;

/// Connects to `url` (a sqlx SQLite connection string, e.g.
/// `sqlite::memory:` or `sqlite:control-plane.db`) and ensures the schema
/// exists.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new().max_connections(8).connect(url).await?;
    sqlx::raw_sql(SCHEMA).execute(&pool).await?;
    Ok(pool)
}
