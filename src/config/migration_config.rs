use crate::adapters::artifacts::ArtifactRegistry;
use crate::adapters::deployers::{CommandDeployer, DryRunDeployer};
use crate::core::{Deployer, DeploymentPlan, Migration};
use crate::utils::error::{MigrateError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    pub project: ProjectInfo,
    pub network: NetworkConfig,
    pub artifacts: ArtifactsConfig,
    pub deployer: Option<DeployerConfig>,
    pub migrations: Vec<MigrationDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Compiled contracts directory, e.g. `build/contracts`.
    pub directory: Option<String>,
    /// Known contract names when no build directory is available.
    pub contracts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeployerKind {
    #[default]
    DryRun,
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployerConfig {
    #[serde(default)]
    pub kind: DeployerKind,
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub working_directory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationDefinition {
    pub number: u32,
    pub name: String,
    pub enabled: Option<bool>,
    pub units: Vec<String>,
}

impl MigrationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MigrateError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn deployer_kind(&self) -> DeployerKind {
        self.deployer.as_ref().map(|d| d.kind).unwrap_or_default()
    }

    pub fn build_registry(&self) -> Result<ArtifactRegistry> {
        if let Some(dir) = &self.artifacts.directory {
            return ArtifactRegistry::from_dir(dir);
        }
        let contracts = validation::validate_required_field(
            "artifacts.contracts",
            &self.artifacts.contracts,
        )?;
        let mut registry = ArtifactRegistry::new();
        for name in contracts {
            registry.register(crate::core::DeployableUnit::new(name.clone()))?;
        }
        Ok(registry)
    }

    /// Resolves every migration's units against `registry`.
    pub fn build_migrations(&self, registry: &ArtifactRegistry) -> Result<Vec<Migration>> {
        self.migrations
            .iter()
            .map(|def| {
                let plan = DeploymentPlan::resolve(registry, &def.units)?;
                let migration = Migration::new(def.number, def.name.clone(), plan);
                Ok(if def.enabled.unwrap_or(true) {
                    migration
                } else {
                    migration.disabled()
                })
            })
            .collect()
    }

    /// Deployer selected by `[deployer]`; `force_dry_run` overrides it.
    pub fn build_deployer(&self, force_dry_run: bool) -> Result<Box<dyn Deployer>> {
        if force_dry_run || self.deployer_kind() == DeployerKind::DryRun {
            return Ok(Box::new(DryRunDeployer::new(self.network.name.clone())));
        }
        Ok(Box::new(self.build_command_deployer()?))
    }

    /// `CommandDeployer` for the current network, regardless of `kind`.
    pub fn build_command_deployer(&self) -> Result<CommandDeployer> {
        let deployer_config = validation::validate_required_field("deployer", &self.deployer)?;
        let program = validation::validate_required_field("deployer.program", &deployer_config.program)?;

        let mut deployer = CommandDeployer::new(
            program.clone(),
            deployer_config.args.clone().unwrap_or_default(),
            self.network.name.clone(),
        );
        if let Some(dir) = &self.artifacts.directory {
            deployer = deployer.with_artifact_dir(PathBuf::from(dir));
        }
        if let Some(dir) = &deployer_config.working_directory {
            deployer = deployer.with_working_dir(PathBuf::from(dir));
        }
        Ok(deployer)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("project.name", &self.project.name)?;
        validation::validate_non_empty_string("network.name", &self.network.name)?;
        if let Some(url) = &self.network.url {
            validation::validate_rpc_url("network.url", url)?;
        }

        match (&self.artifacts.directory, &self.artifacts.contracts) {
            (Some(dir), _) => validation::validate_path("artifacts.directory", dir)?,
            (None, Some(_)) => {}
            (None, None) => {
                return Err(MigrateError::MissingConfig {
                    field: "artifacts.directory or artifacts.contracts".to_string(),
                })
            }
        }

        if self.deployer_kind() == DeployerKind::Command {
            let program = self.deployer.as_ref().and_then(|d| d.program.as_ref());
            let program = validation::validate_required_field("deployer.program", &program)?;
            validation::validate_non_empty_string("deployer.program", program)?;
        }

        if self.migrations.is_empty() {
            return Err(MigrateError::ConfigError {
                message: "at least one [[migrations]] entry is required".to_string(),
            });
        }

        let numbers: Vec<String> = self.migrations.iter().map(|m| m.number.to_string()).collect();
        validation::validate_unique_names("migrations.number", numbers.iter().map(String::as_str))?;

        for migration in &self.migrations {
            validation::validate_non_empty_string("migrations.name", &migration.name)?;
            for unit in &migration.units {
                validation::validate_non_empty_string("migrations.units", unit)?;
            }
            validation::validate_unique_names(
                "migrations.units",
                migration.units.iter().map(String::as_str),
            )?;
        }

        Ok(())
    }
}

impl Validate for MigrationConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
