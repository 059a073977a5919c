use crate::error::{RepoError, Result};
use crate::ports::{UserFlowPatch, UserFlowRepository};
use async_trait::async_trait;
use chrono::Utc;
use flow_core::{ids, FlowExecutionResult, NodeResult, RunStatus, UserFlow};
use sqlx::SqlitePool;

pub struct SqliteUserFlowRepository {
    pool: SqlitePool,
}

impl SqliteUserFlowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteUserFlowRepository { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserFlowRow {
    id: String,
    name: String,
    nodes: String,
    edges: String,
    initial_variables: Option<String>,
}

impl UserFlowRow {
    fn into_domain(self) -> Result<UserFlow> {
        Ok(UserFlow {
            id: self.id,
            name: self.name,
            nodes: serde_json::from_str(&self.nodes)?,
            edges: serde_json::from_str(&self.edges)?,
            initial_variables: self.initial_variables.as_deref().map(serde_json::from_str).transpose()?,
        })
    }
}

fn status_str(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Passed => "passed",
        RunStatus::Failed => "failed",
        RunStatus::Skipped => "skipped",
    }
}

fn status_from_str(s: &str) -> Result<RunStatus> {
    match s {
        "passed" => Ok(RunStatus::Passed),
        "failed" => Ok(RunStatus::Failed),
        "skipped" => Ok(RunStatus::Skipped),
        other => Err(RepoError::Constraint(format!("unknown run status '{other}'"))),
    }
}

#[derive(sqlx::FromRow)]
struct FlowResultRow {
    status: String,
    total_nodes: i64,
    passed_nodes: i64,
    failed_nodes: i64,
    skipped_nodes: i64,
    total_steps: i64,
    passed_steps: i64,
    failed_steps: i64,
    skipped_steps: i64,
    node_results: String,
    started_at: String,
    ended_at: String,
}

impl FlowResultRow {
    fn into_domain(self) -> Result<FlowExecutionResult> {
        let parse_ts = |s: &str| {
            s.parse().map_err(|_| RepoError::Constraint(format!("invalid timestamp '{s}'")))
        };
        Ok(FlowExecutionResult {
            status: status_from_str(&self.status)?,
            total_nodes: self.total_nodes as usize,
            passed_nodes: self.passed_nodes as usize,
            failed_nodes: self.failed_nodes as usize,
            skipped_nodes: self.skipped_nodes as usize,
            total_steps: self.total_steps as usize,
            passed_steps: self.passed_steps as usize,
            failed_steps: self.failed_steps as usize,
            skipped_steps: self.skipped_steps as usize,
            node_results: serde_json::from_str::<Vec<NodeResult>>(&self.node_results)?,
            started_at: parse_ts(&self.started_at)?,
            ended_at: parse_ts(&self.ended_at)?,
        })
    }
}

#[async_trait]
impl UserFlowRepository for SqliteUserFlowRepository {
    async fn create(&self, flow: UserFlow) -> Result<UserFlow> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO user_flows (id, name, nodes, edges, initial_variables, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&flow.id)
        .bind(&flow.name)
        .bind(serde_json::to_string(&flow.nodes)?)
        .bind(serde_json::to_string(&flow.edges)?)
        .bind(flow.initial_variables.as_ref().map(serde_json::to_string).transpose()?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(flow)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<UserFlow>> {
        let row: Option<UserFlowRow> = sqlx::query_as(
            "SELECT id, name, nodes, edges, initial_variables FROM user_flows WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserFlowRow::into_domain).transpose()
    }

    async fn list(&self) -> Result<Vec<UserFlow>> {
        let rows: Vec<UserFlowRow> = sqlx::query_as(
            "SELECT id, name, nodes, edges, initial_variables FROM user_flows ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(UserFlowRow::into_domain).collect()
    }

    async fn update(&self, id: &str, patch: UserFlowPatch) -> Result<UserFlow> {
        let mut current =
            self.get_by_id(id).await?.ok_or_else(|| RepoError::not_found(format!("flow {id}")))?;
        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(nodes) = patch.nodes {
            current.nodes = nodes;
        }
        if let Some(edges) = patch.edges {
            current.edges = edges;
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE user_flows SET name = ?, nodes = ?, edges = ?, updated_at = ? WHERE id = ?")
            .bind(&current.name)
            .bind(serde_json::to_string(&current.nodes)?)
            .bind(serde_json::to_string(&current.edges)?)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(current)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_flows WHERE id = ?").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn add_execution_result(&self, flow_id: &str, result: FlowExecutionResult) -> Result<()> {
        sqlx::query(
            "INSERT INTO flow_execution_results
                (id, flow_id, status, total_nodes, passed_nodes, failed_nodes, skipped_nodes,
                 total_steps, passed_steps, failed_steps, skipped_steps, node_results, started_at, ended_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(ids::new_flow_result_id())
        .bind(flow_id)
        .bind(status_str(result.status))
        .bind(result.total_nodes as i64)
        .bind(result.passed_nodes as i64)
        .bind(result.failed_nodes as i64)
        .bind(result.skipped_nodes as i64)
        .bind(result.total_steps as i64)
        .bind(result.passed_steps as i64)
        .bind(result.failed_steps as i64)
        .bind(result.skipped_steps as i64)
        .bind(serde_json::to_string(&result.node_results)?)
        .bind(result.started_at.to_rfc3339())
        .bind(result.ended_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_execution_results(&self, flow_id: &str) -> Result<Vec<FlowExecutionResult>> {
        let rows: Vec<FlowResultRow> = sqlx::query_as(
            "SELECT status, total_nodes, passed_nodes, failed_nodes, skipped_nodes, total_steps,
                    passed_steps, failed_steps, skipped_steps, node_results, started_at, ended_at
             FROM flow_execution_results WHERE flow_id = ? ORDER BY started_at ASC",
        )
        .bind(flow_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(FlowResultRow::into_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::FlowNode;

    fn sample_flow(id: &str) -> UserFlow {
        UserFlow {
            id: id.to_string(),
            name: "checkout".to_string(),
            nodes: vec![FlowNode::Start { id: "start".into() }, FlowNode::End { id: "end".into() }],
            edges: vec![],
            initial_variables: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let pool = crate::sqlite::connect("sqlite::memory:").await.unwrap();
        let repo = SqliteUserFlowRepository::new(pool);
        repo.create(sample_flow("flow-1")).await.unwrap();
        let fetched = repo.get_by_id("flow-1").await.unwrap().unwrap();
        assert_eq!(fetched.nodes.len(), 2);
    }

    #[tokio::test]
    async fn update_replaces_named_fields_only() {
        let pool = crate::sqlite::connect("sqlite::memory:").await.unwrap();
        let repo = SqliteUserFlowRepository::new(pool);
        repo.create(sample_flow("flow-1")).await.unwrap();
        let patch = UserFlowPatch { name: Some("renamed".into()), nodes: None, edges: None };
        let updated = repo.update("flow-1", patch).await.unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.nodes.len(), 2);
    }
}
