pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::artifacts::ArtifactRegistry;
pub use config::MigrationConfig;
pub use crate::core::{
    descriptor::initial_migration, migration_sequence::MigrationSequence, ArtifactResolver,
    DeployableUnit, Deployer, DeploymentPlan, Migration,
};
pub use utils::error::{MigrateError, Result};
