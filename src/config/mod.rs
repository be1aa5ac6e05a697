#[cfg(feature = "cli")]
pub mod cli;
pub mod migration_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use migration_config::MigrationConfig;
