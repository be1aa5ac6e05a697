use crate::core::{Deployer, Migration};
use crate::utils::error::{MigrateError, Result};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Outcome of one completed migration.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub number: u32,
    pub name: String,
    pub units: Vec<String>,
    pub duration: Duration,
}

/// State accumulated across the migrations of one run.
#[derive(Debug, Clone)]
pub struct MigrationContext {
    pub execution_id: String,
    pub completed: Vec<MigrationResult>,
}

impl MigrationContext {
    pub fn new(execution_id: String) -> Self {
        Self {
            execution_id,
            completed: Vec::new(),
        }
    }

    /// Highest migration number completed in this run.
    pub fn last_completed(&self) -> Option<u32> {
        self.completed.iter().map(|r| r.number).max()
    }

    /// Every unit deployed so far, in deployment order.
    pub fn deployed_units(&self) -> Vec<&str> {
        self.completed
            .iter()
            .flat_map(|r| r.units.iter().map(String::as_str))
            .collect()
    }

    pub fn result_by_number(&self, number: u32) -> Option<&MigrationResult> {
        self.completed.iter().find(|r| r.number == number)
    }

    pub fn add_result(&mut self, result: MigrationResult) {
        self.completed.push(result);
    }
}

/// Runs migrations in ascending number order, stopping at the first failure.
pub struct MigrationSequence {
    migrations: Vec<Migration>,
    start_from: Option<u32>,
    execution_id: String,
}

impl MigrationSequence {
    pub fn new(execution_id: String) -> Self {
        Self {
            migrations: Vec::new(),
            start_from: None,
            execution_id,
        }
    }

    /// Skip every migration numbered below `number`.
    pub fn starting_from(mut self, number: u32) -> Self {
        self.start_from = Some(number);
        self
    }

    pub fn add_migration(&mut self, migration: Migration) {
        self.migrations.push(migration);
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Migrations in the order they will be considered.
    pub fn ordered(&self) -> Vec<&Migration> {
        let mut ordered: Vec<&Migration> = self.migrations.iter().collect();
        ordered.sort_by_key(|m| m.number);
        ordered
    }

    fn should_execute(&self, migration: &Migration) -> bool {
        if !migration.enabled {
            tracing::info!("⏭️ Skipping migration {} (disabled)", migration.label());
            return false;
        }
        if let Some(start) = self.start_from {
            if migration.number < start {
                tracing::info!(
                    "⏭️ Skipping migration {} (starting from {})",
                    migration.label(),
                    start
                );
                return false;
            }
        }
        true
    }

    pub async fn execute_all<D>(&self, deployer: &D) -> Result<Vec<MigrationResult>>
    where
        D: Deployer + ?Sized,
    {
        let mut context = MigrationContext::new(self.execution_id.clone());
        tracing::info!(
            "🎬 Running {} migration(s) [execution: {}]",
            self.migrations.len(),
            self.execution_id
        );

        for migration in self.ordered() {
            if !self.should_execute(migration) {
                continue;
            }

            let start_time = Instant::now();
            tracing::info!(
                "📦 Migration {}: deploying {:?}",
                migration.label(),
                migration.plan.unit_names()
            );

            match migration.plan.run(deployer).await {
                Ok(()) => {
                    let result = MigrationResult {
                        number: migration.number,
                        name: migration.name.clone(),
                        units: migration
                            .plan
                            .unit_names()
                            .into_iter()
                            .map(str::to_string)
                            .collect(),
                        duration: start_time.elapsed(),
                    };

                    tracing::info!(
                        "✅ Migration completed: {} (units: {}, duration: {:?})",
                        migration.label(),
                        result.units.len(),
                        result.duration
                    );

                    context.add_result(result);
                }
                Err(e) => {
                    tracing::error!("❌ Migration {} failed: {}", migration.label(), e);
                    if let Some(last) = context.last_completed() {
                        tracing::info!("Last completed migration: {}", last);
                    }
                    return Err(MigrateError::MigrationFailed {
                        number: migration.number,
                        name: migration.name.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        tracing::debug!("Deployed units: {:?}", context.deployed_units());
        Ok(context.completed)
    }

    pub fn execution_summary(results: &[MigrationResult]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_units: usize = results.iter().map(|r| r.units.len()).sum();
        let total_duration: Duration = results.iter().map(|r| r.duration).sum();

        summary.insert(
            "total_migrations".to_string(),
            serde_json::Value::Number(results.len().into()),
        );
        summary.insert(
            "total_units".to_string(),
            serde_json::Value::Number(total_units.into()),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );

        let names: Vec<serde_json::Value> = results
            .iter()
            .map(|r| serde_json::Value::String(r.name.clone()))
            .collect();
        summary.insert(
            "executed_migrations".to_string(),
            serde_json::Value::Array(names),
        );

        summary
    }
}
