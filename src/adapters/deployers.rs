use crate::core::{DeployableUnit, Deployer};
use crate::utils::error::{MigrateError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;

/// Logs what would be deployed without touching a network.
#[derive(Debug, Default)]
pub struct DryRunDeployer {
    network: String,
    planned: Mutex<Vec<String>>,
}

impl DryRunDeployer {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            planned: Mutex::new(Vec::new()),
        }
    }

    pub fn planned(&self) -> Vec<String> {
        self.planned.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Deployer for DryRunDeployer {
    async fn deploy(&self, unit: &DeployableUnit) -> Result<()> {
        tracing::info!("🔍 [dry-run] would deploy {} to {}", unit.name, self.network);
        self.planned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(unit.name.clone());
        Ok(())
    }
}

/// Records every call; optionally fails on one unit.
#[derive(Debug, Default)]
pub struct RecordingDeployer {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, name: impl Into<String>) -> Self {
        self.fail_on = Some(name.into());
        self
    }

    /// Unit names passed to `deploy`, in call order, including a failed one.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Deployer for RecordingDeployer {
    async fn deploy(&self, unit: &DeployableUnit) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(unit.name.clone());
        if self.fail_on.as_deref() == Some(unit.name.as_str()) {
            return Err(MigrateError::DeployerFailed {
                unit: unit.name.clone(),
                message: "recording deployer configured to fail".to_string(),
            });
        }
        Ok(())
    }
}

/// Delegates each unit to an external deployment tool.
///
/// Arguments are templates: `{name}`, `{network}` and `{artifact_dir}` are
/// substituted per unit. A non-zero exit fails the unit with the tool's
/// stderr.
#[derive(Debug, Clone)]
pub struct CommandDeployer {
    program: String,
    args: Vec<String>,
    network: String,
    artifact_dir: Option<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl CommandDeployer {
    pub fn new(program: impl Into<String>, args: Vec<String>, network: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            network: network.into(),
            artifact_dir: None,
            working_dir: None,
        }
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Arguments for `unit` after placeholder substitution.
    pub fn render_args(&self, unit: &DeployableUnit) -> Vec<String> {
        let artifact_dir = self
            .artifact_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{name}", &unit.name)
                    .replace("{network}", &self.network)
                    .replace("{artifact_dir}", &artifact_dir)
            })
            .collect()
    }
}

#[async_trait]
impl Deployer for CommandDeployer {
    async fn deploy(&self, unit: &DeployableUnit) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.render_args(unit))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = ?cmd, "Running deployer for {}", unit.name);

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(MigrateError::DeployerFailed {
                unit: unit.name.clone(),
                message,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!("[{}] {}", unit.name, line);
        }
        tracing::info!("🚀 Deployed {} to {}", unit.name, self.network);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_records_plan() {
        let deployer = DryRunDeployer::new("development");
        deployer.deploy(&DeployableUnit::new("Migrations")).await.unwrap();
        deployer.deploy(&DeployableUnit::new("PharmaSupplyChain")).await.unwrap();

        assert_eq!(
            deployer.planned(),
            vec!["Migrations".to_string(), "PharmaSupplyChain".to_string()]
        );
    }

    #[tokio::test]
    async fn test_recording_deployer_failure_is_recorded() {
        let deployer = RecordingDeployer::new().failing_on("Escrow");
        assert!(deployer.deploy(&DeployableUnit::new("Escrow")).await.is_err());
        assert_eq!(deployer.calls(), vec!["Escrow".to_string()]);
    }

    #[test]
    fn test_recording_deployer_survives_poisoned_lock() {
        let deployer = std::sync::Arc::new(RecordingDeployer::new());
        tokio_test::block_on(deployer.deploy(&DeployableUnit::new("Migrations"))).unwrap();

        let poisoner = std::sync::Arc::clone(&deployer);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.calls.lock().unwrap();
            panic!("poison the call log");
        })
        .join();
        assert!(deployer.calls.is_poisoned());

        tokio_test::block_on(deployer.deploy(&DeployableUnit::new("PharmaSupplyChain"))).unwrap();
        assert_eq!(deployer.calls(), vec!["Migrations", "PharmaSupplyChain"]);
    }

    #[test]
    fn test_render_args_substitutes_placeholders() {
        let deployer = CommandDeployer::new(
            "deploy-tool",
            vec![
                "create".to_string(),
                "{name}".to_string(),
                "--network={network}".to_string(),
                "--artifacts".to_string(),
                "{artifact_dir}".to_string(),
            ],
            "development",
        )
        .with_artifact_dir("build/contracts");

        let args = deployer.render_args(&DeployableUnit::new("PharmaSupplyChain"));
        assert_eq!(
            args,
            vec![
                "create",
                "PharmaSupplyChain",
                "--network=development",
                "--artifacts",
                "build/contracts"
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_deployer_success() {
        let deployer = CommandDeployer::new("true", vec!["{name}".to_string()], "development");
        deployer.deploy(&DeployableUnit::new("Migrations")).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_deployer_reports_stderr() {
        let deployer = CommandDeployer::new(
            "sh",
            vec!["-c".to_string(), "echo 'insufficient funds' >&2; exit 1".to_string()],
            "development",
        );

        let err = deployer
            .deploy(&DeployableUnit::new("PharmaSupplyChain"))
            .await
            .unwrap_err();
        match err {
            MigrateError::DeployerFailed { unit, message } => {
                assert_eq!(unit, "PharmaSupplyChain");
                assert_eq!(message, "insufficient funds");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_command_deployer_missing_program() {
        let deployer = CommandDeployer::new("definitely-not-a-deploy-tool", vec![], "development");
        let err = deployer.deploy(&DeployableUnit::new("Migrations")).await.unwrap_err();
        assert!(matches!(err, MigrateError::Io(_)));
    }
}
