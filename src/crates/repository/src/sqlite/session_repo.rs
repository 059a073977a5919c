use crate::error::{RepoError, Result};
use crate::ports::{SessionPatch, SessionRepository};
use async_trait::async_trait;
use chrono::Utc;
use flow_core::{RawEvent, RawEventType, Session, SessionStatus, SessionWithEvents, TargetInfo};
use sqlx::SqlitePool;

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSessionRepository { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    name: Option<String>,
    url: String,
    status: String,
    started_at: String,
    stopped_at: Option<String>,
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<Utc>> {
    s.parse()
        .map_err(|_| RepoError::Constraint(format!("invalid timestamp '{s}'")))
}

impl SessionRow {
    fn into_domain(self) -> Result<Session> {
        Ok(Session {
            id: self.id,
            name: self.name,
            url: self.url,
            status: match self.status.as_str() {
                "recording" => SessionStatus::Recording,
                "stopped" => SessionStatus::Stopped,
                other => return Err(RepoError::Constraint(format!("unknown session status '{other}'"))),
            },
            started_at: parse_timestamp(&self.started_at)?,
            stopped_at: self.stopped_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

fn session_status_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Recording => "recording",
        SessionStatus::Stopped => "stopped",
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    #[sqlx(rename = "type")]
    event_type: String,
    timestamp: i64,
    url: Option<String>,
    target: Option<String>,
    value: Option<String>,
    is_sensitive: bool,
    key: Option<String>,
    scroll_x: Option<f64>,
    scroll_y: Option<f64>,
}

impl EventRow {
    fn into_domain(self) -> Result<RawEvent> {
        let event_type = match self.event_type.as_str() {
            "navigation" => RawEventType::Navigation,
            "click" => RawEventType::Click,
            "blur" => RawEventType::Blur,
            "keydown" => RawEventType::Keydown,
            "hover" => RawEventType::Hover,
            "scroll" => RawEventType::Scroll,
            "select" => RawEventType::Select,
            "input" => RawEventType::Input,
            other => return Err(RepoError::Constraint(format!("unknown event type '{other}'"))),
        };
        Ok(RawEvent {
            id: self.id,
            event_type,
            timestamp: self.timestamp,
            url: self.url,
            target: self.target.as_deref().map(serde_json::from_str::<TargetInfo>).transpose()?,
            value: self.value,
            is_sensitive: self.is_sensitive,
            key: self.key,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
        })
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: Session) -> Result<Session> {
        sqlx::query(
            "INSERT INTO sessions (id, name, url, status, started_at, stopped_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.name)
        .bind(&session.url)
        .bind(session_status_str(session.status))
        .bind(session.started_at.to_rfc3339())
        .bind(session.stopped_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(session)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        let row: Option<SessionRow> =
            sqlx::query_as("SELECT id, name, url, status, started_at, stopped_at FROM sessions WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(SessionRow::into_domain).transpose()
    }

    async fn get_with_events(&self, id: &str) -> Result<Option<SessionWithEvents>> {
        let Some(session) = self.get_by_id(id).await? else { return Ok(None) };
        let events = self.get_events(id).await?;
        Ok(Some(SessionWithEvents { session, events }))
    }

    async fn list(&self) -> Result<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, name, url, status, started_at, stopped_at FROM sessions ORDER BY started_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SessionRow::into_domain).collect()
    }

    async fn update(&self, id: &str, patch: SessionPatch) -> Result<Session> {
        let mut current = self.get_by_id(id).await?.ok_or_else(|| RepoError::not_found(format!("session {id}")))?;
        if let Some(name) = patch.name {
            current.name = Some(name);
        }
        sqlx::query("UPDATE sessions SET name = ? WHERE id = ?")
            .bind(&current.name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(current)
    }

    async fn stop(&self, id: &str) -> Result<Session> {
        let mut current = self.get_by_id(id).await?.ok_or_else(|| RepoError::not_found(format!("session {id}")))?;
        let stopped_at = Utc::now();
        current.status = SessionStatus::Stopped;
        current.stopped_at = Some(stopped_at);
        sqlx::query("UPDATE sessions SET status = ?, stopped_at = ? WHERE id = ?")
            .bind(session_status_str(SessionStatus::Stopped))
            .bind(stopped_at.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(current)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn add_event(&self, session_id: &str, event: RawEvent) -> Result<()> {
        sqlx::query(
            "INSERT INTO session_events
                (id, session_id, type, timestamp, url, target, value, is_sensitive, key, scroll_x, scroll_y)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(&event.id)
        .bind(session_id)
        .bind(event.event_type.as_str())
        .bind(event.timestamp)
        .bind(&event.url)
        .bind(event.target.as_ref().map(serde_json::to_string).transpose()?)
        .bind(&event.value)
        .bind(event.is_sensitive)
        .bind(&event.key)
        .bind(event.scroll_x)
        .bind(event.scroll_y)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_events(&self, session_id: &str, events: Vec<RawEvent>) -> Result<()> {
        for event in events {
            self.add_event(session_id, event).await?;
        }
        Ok(())
    }

    async fn get_events(&self, session_id: &str) -> Result<Vec<RawEvent>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT id, type, timestamp, url, target, value, is_sensitive, key, scroll_x, scroll_y
             FROM session_events WHERE session_id = ? ORDER BY timestamp ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(EventRow::into_domain).collect()
    }

    async fn clear_events(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM session_events WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
