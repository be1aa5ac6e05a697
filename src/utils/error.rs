use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Artifact not found: {name}")]
    NotFound { name: String },

    #[error("Duplicate deployable unit: {name}")]
    DuplicateUnit { name: String },

    #[error("Invalid artifact {path}: {reason}")]
    InvalidArtifact { path: String, reason: String },

    #[error("Deployment of {unit} failed: {message}")]
    DeployerFailed { unit: String, message: String },

    #[error("Migration {number} ({name}) failed: {source}")]
    MigrationFailed {
        number: u32,
        name: String,
        #[source]
        source: Box<MigrateError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

impl MigrateError {
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            MigrateError::ConfigError { .. }
                | MigrateError::InvalidConfigValue { .. }
                | MigrateError::MissingConfig { .. }
        )
    }

    /// Innermost error, unwrapping migration failures.
    pub fn root_cause(&self) -> &MigrateError {
        match self {
            MigrateError::MigrationFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MigrateError::NotFound { name } => format!(
                "Contract '{}' has no compiled artifact. Compile the contracts before migrating.",
                name
            ),
            MigrateError::DuplicateUnit { name } => {
                format!("Contract '{}' is declared more than once.", name)
            }
            MigrateError::InvalidArtifact { path, reason } => {
                format!("Artifact file {} is unusable: {}", path, reason)
            }
            MigrateError::DeployerFailed { unit, message } => {
                format!("Deploying '{}' failed: {}", unit, message)
            }
            MigrateError::MigrationFailed { number, name, source } => format!(
                "Migration {}_{} stopped: {}",
                number,
                name,
                source.user_friendly_message()
            ),
            MigrateError::Io(e) => format!("File or process error: {}", e),
            MigrateError::Serialization(e) => format!("Malformed JSON: {}", e),
            MigrateError::ConfigError { message } => {
                format!("Configuration problem: {}", message)
            }
            MigrateError::InvalidConfigValue { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            MigrateError::MissingConfig { field } => {
                format!("Configuration field '{}' is required.", field)
            }
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            1
        } else {
            2
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_migration_failure() {
        let err = MigrateError::MigrationFailed {
            number: 1,
            name: "initial_migration".to_string(),
            source: Box::new(MigrateError::NotFound {
                name: "Migrations".to_string(),
            }),
        };

        assert!(matches!(err.root_cause(), MigrateError::NotFound { name } if name == "Migrations"));
        assert_eq!(err.exit_code(), 2);
        assert!(err.user_friendly_message().contains("1_initial_migration"));
    }

    #[test]
    fn test_config_errors_exit_with_one() {
        let err = MigrateError::MissingConfig {
            field: "project.name".to_string(),
        };
        assert!(err.is_config_error());
        assert_eq!(err.exit_code(), 1);
    }
}
