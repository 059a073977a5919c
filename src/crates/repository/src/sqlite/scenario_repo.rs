use crate::error::{RepoError, Result};
use crate::ports::{ScenarioPatch, ScenarioRepository};
use async_trait::async_trait;
use chrono::Utc;
use flow_core::{ids, ApiCall, RunStatus, Scenario, ScenarioExecutionResult, StepResult, Viewport};
use sqlx::SqlitePool;

pub struct SqliteScenarioRepository {
    pool: SqlitePool,
}

impl SqliteScenarioRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteScenarioRepository { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ScenarioRow {
    id: String,
    name: Option<String>,
    url: String,
    viewport: String,
    steps: String,
    setup: String,
    teardown: String,
    initial_variables: Option<String>,
    ast_schema_version: i64,
}

impl ScenarioRow {
    fn into_domain(self) -> Result<Scenario> {
        Ok(Scenario {
            id: self.id,
            name: self.name,
            url: self.url,
            viewport: serde_json::from_str::<Viewport>(&self.viewport)?,
            steps: serde_json::from_str(&self.steps)?,
            setup: serde_json::from_str(&self.setup)?,
            teardown: serde_json::from_str(&self.teardown)?,
            initial_variables: self.initial_variables.as_deref().map(serde_json::from_str).transpose()?,
            ast_schema_version: self.ast_schema_version as u32,
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
struct ScenarioResultRow {
    status: String,
    total_steps: i64,
    passed: i64,
    failed: i64,
    skipped: i64,
    duration_ms: i64,
    step_results: String,
    api_calls: String,
    environment: Option<String>,
    executed_at: String,
}

impl ScenarioResultRow {
    fn into_domain(self) -> Result<ScenarioExecutionResult> {
        Ok(ScenarioExecutionResult {
            status: status_from_str(&self.status)?,
            total_steps: self.total_steps as usize,
            passed: self.passed as usize,
            failed: self.failed as usize,
            skipped: self.skipped as usize,
            duration_ms: self.duration_ms as u64,
            step_results: serde_json::from_str::<Vec<StepResult>>(&self.step_results)?,
            api_calls: serde_json::from_str::<Vec<ApiCall>>(&self.api_calls)?,
            environment: self.environment.as_deref().map(serde_json::from_str).transpose()?,
            executed_at: self.executed_at.parse().map_err(|_| {
                RepoError::Constraint(format!("invalid executed_at timestamp '{}'", self.executed_at))
            })?,
        })
    }
}

#[async_trait]
impl ScenarioRepository for SqliteScenarioRepository {
    async fn create(&self, scenario: Scenario) -> Result<Scenario> {
        let now = Utc::now().to_rfc3339();
        let row: ScenarioRow = sqlx::query_as(
            "INSERT INTO scenarios
                (id, name, url, viewport, steps, setup, teardown, initial_variables,
                 ast_schema_version, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id, name, url, viewport, steps, setup, teardown, initial_variables, ast_schema_version",
        )
        .bind(&scenario.id)
        .bind(&scenario.name)
        .bind(&scenario.url)
        .bind(serde_json::to_string(&scenario.viewport)?)
        .bind(serde_json::to_string(&scenario.steps)?)
        .bind(serde_json::to_string(&scenario.setup)?)
        .bind(serde_json::to_string(&scenario.teardown)?)
        .bind(scenario.initial_variables.as_ref().map(serde_json::to_string).transpose()?)
        .bind(scenario.ast_schema_version as i64)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        row.into_domain()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Scenario>> {
        let row: Option<ScenarioRow> = sqlx::query_as(
            "SELECT id, name, url, viewport, steps, setup, teardown, initial_variables, ast_schema_version
             FROM scenarios WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ScenarioRow::into_domain).transpose()
    }

    async fn list(&self, page: u32, limit: u32) -> Result<Vec<Scenario>> {
        let offset = (page.saturating_sub(1)) as i64 * limit as i64;
        let rows: Vec<ScenarioRow> = sqlx::query_as(
            "SELECT id, name, url, viewport, steps, setup, teardown, initial_variables, ast_schema_version
             FROM scenarios ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ScenarioRow::into_domain).collect()
    }

    async fn update(&self, id: &str, patch: ScenarioPatch) -> Result<Scenario> {
        let mut current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| RepoError::not_found(format!("scenario {id}")))?;

        if let Some(name) = patch.name {
            current.name = Some(name);
        }
        if let Some(url) = patch.url {
            current.url = url;
        }
        if let Some(vars) = patch.initial_variables {
            current.initial_variables = Some(vars);
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE scenarios SET name = ?, url = ?, initial_variables = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&current.name)
        .bind(&current.url)
        .bind(current.initial_variables.as_ref().map(serde_json::to_string).transpose()?)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(current)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM scenarios WHERE id = ?").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn add_execution_result(&self, scenario_id: &str, result: ScenarioExecutionResult) -> Result<()> {
        sqlx::query(
            "INSERT INTO scenario_execution_results
                (id, scenario_id, status, total_steps, passed, failed, skipped, duration_ms,
                 step_results, api_calls, environment, executed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(ids::new_result_id())
        .bind(scenario_id)
        .bind(status_str(result.status))
        .bind(result.total_steps as i64)
        .bind(result.passed as i64)
        .bind(result.failed as i64)
        .bind(result.skipped as i64)
        .bind(result.duration_ms as i64)
        .bind(serde_json::to_string(&result.step_results)?)
        .bind(serde_json::to_string(&result.api_calls)?)
        .bind(result.environment.as_ref().map(serde_json::to_string).transpose()?)
        .bind(result.executed_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_execution_results(&self, scenario_id: &str) -> Result<Vec<ScenarioExecutionResult>> {
        let rows: Vec<ScenarioResultRow> = sqlx::query_as(
            "SELECT status, total_steps, passed, failed, skipped, duration_ms, step_results,
                    api_calls, environment, executed_at
             FROM scenario_execution_results WHERE scenario_id = ? ORDER BY executed_at ASC",
        )
        .bind(scenario_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ScenarioResultRow::into_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::Viewport as _Viewport;

    fn sample_scenario(id: &str) -> Scenario {
        Scenario {
            id: id.to_string(),
            name: Some("login".to_string()),
            url: "https://example.com/login".to_string(),
            viewport: _Viewport::default(),
            steps: vec![],
            setup: vec![],
            teardown: vec![],
            initial_variables: None,
            ast_schema_version: 1,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let pool = crate::sqlite::connect("sqlite::memory:").await.unwrap();
        let repo = SqliteScenarioRepository::new(pool);
        let created = repo.create(sample_scenario("scn-1")).await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, "scn-1");
        assert_eq!(fetched.url, "https://example.com/login");
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let pool = crate::sqlite::connect("sqlite::memory:").await.unwrap();
        let repo = SqliteScenarioRepository::new(pool);
        assert!(repo.get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn execution_results_accumulate_in_order() {
        let pool = crate::sqlite::connect("sqlite::memory:").await.unwrap();
        let repo = SqliteScenarioRepository::new(pool);
        repo.create(sample_scenario("scn-1")).await.unwrap();

        let result = ScenarioExecutionResult {
            status: RunStatus::Passed,
            total_steps: 1,
            passed: 1,
            failed: 0,
            skipped: 0,
            duration_ms: 12,
            step_results: vec![],
            api_calls: vec![],
            environment: None,
            executed_at: Utc::now(),
        };
        repo.add_execution_result("scn-1", result).await.unwrap();

        let results = repo.list_execution_results("scn-1").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, RunStatus::Passed);
    }
}
