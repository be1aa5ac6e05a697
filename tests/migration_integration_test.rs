use anyhow::Result;
use chain_migrate::adapters::deployers::{DryRunDeployer, RecordingDeployer};
use chain_migrate::utils::validation::Validate;
use chain_migrate::{
    initial_migration, ArtifactRegistry, MigrateError, MigrationConfig, MigrationSequence,
};
use tempfile::TempDir;

fn write_build_dir(temp_dir: &TempDir) -> Result<String> {
    let build = temp_dir.path().join("build").join("contracts");
    std::fs::create_dir_all(&build)?;
    std::fs::write(
        build.join("Migrations.json"),
        r#"{"contractName": "Migrations", "abi": [], "bytecode": "0x60806040"}"#,
    )?;
    std::fs::write(
        build.join("PharmaSupplyChain.json"),
        r#"{"contractName": "PharmaSupplyChain", "abi": [], "bytecode": "0x60806041", "networks": {}}"#,
    )?;
    // TOML strings need forward slashes on Windows
    Ok(build.to_string_lossy().replace('\\', "/"))
}

fn config_with_build_dir(build_dir: &str) -> String {
    format!(
        r#"
[project]
name = "pharma-supply-chain"
version = "1.0.0"

[network]
name = "development"
url = "http://127.0.0.1:7545"

[artifacts]
directory = "{}"

[[migrations]]
number = 2
name = "supply_chain"
units = ["PharmaSupplyChain"]

[[migrations]]
number = 1
name = "initial_migration"
units = ["Migrations"]
"#,
        build_dir
    )
}

#[tokio::test]
async fn test_initial_migration_end_to_end() -> Result<()> {
    let registry = ArtifactRegistry::from_names(["Migrations", "PharmaSupplyChain"]);
    let migration = initial_migration(&registry)?;

    let deployer = RecordingDeployer::new();
    migration.plan.run(&deployer).await?;

    assert_eq!(deployer.calls(), vec!["Migrations", "PharmaSupplyChain"]);
    Ok(())
}

#[tokio::test]
async fn test_config_driven_sequence_from_build_dir() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let build_dir = write_build_dir(&temp_dir)?;

    let config = MigrationConfig::from_toml_str(&config_with_build_dir(&build_dir))?;
    config.validate()?;

    let registry = config.build_registry()?;
    assert_eq!(registry.names(), vec!["Migrations", "PharmaSupplyChain"]);

    let mut sequence = MigrationSequence::new("integration".to_string());
    for migration in config.build_migrations(&registry)? {
        sequence.add_migration(migration);
    }

    let deployer = RecordingDeployer::new();
    let results = sequence.execute_all(&deployer).await?;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "initial_migration");
    assert_eq!(results[1].name, "supply_chain");
    assert_eq!(deployer.calls(), vec!["Migrations", "PharmaSupplyChain"]);
    Ok(())
}

#[tokio::test]
async fn test_sequence_stops_on_deployer_failure() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let build_dir = write_build_dir(&temp_dir)?;
    let config = MigrationConfig::from_toml_str(&config_with_build_dir(&build_dir))?;
    let registry = config.build_registry()?;

    let mut sequence = MigrationSequence::new("integration".to_string());
    for migration in config.build_migrations(&registry)? {
        sequence.add_migration(migration);
    }

    let deployer = RecordingDeployer::new().failing_on("Migrations");
    let err = sequence.execute_all(&deployer).await.unwrap_err();

    assert!(matches!(err, MigrateError::MigrationFailed { number: 1, .. }));
    assert!(matches!(err.root_cause(), MigrateError::DeployerFailed { .. }));
    assert_eq!(deployer.calls(), vec!["Migrations"]);
    Ok(())
}

#[tokio::test]
async fn test_dry_run_deployer_from_config() -> Result<()> {
    let config = MigrationConfig::from_file("configs/migrations.toml")?;
    config.validate()?;

    let registry = config.build_registry()?;
    let mut sequence = MigrationSequence::new("dry".to_string());
    for migration in config.build_migrations(&registry)? {
        sequence.add_migration(migration);
    }

    let deployer = DryRunDeployer::new(config.network.name.clone());
    let results = sequence.execute_all(&deployer).await?;

    assert_eq!(results.len(), 1);
    assert_eq!(deployer.planned(), vec!["Migrations", "PharmaSupplyChain"]);

    let summary = MigrationSequence::execution_summary(&results);
    assert_eq!(summary["total_units"], serde_json::json!(2));
    Ok(())
}

#[test]
fn test_missing_build_dir_is_reported() {
    let config = MigrationConfig::from_toml_str(&config_with_build_dir("/nonexistent/build/contracts"))
        .unwrap();
    assert!(config.validate().is_ok());
    assert!(matches!(config.build_registry(), Err(MigrateError::Io(_))));
}

#[test]
fn test_rerun_is_deterministic() {
    let registry = ArtifactRegistry::from_names(["Migrations", "PharmaSupplyChain"]);
    let migration = initial_migration(&registry).unwrap();

    let first = RecordingDeployer::new();
    let second = RecordingDeployer::new();
    tokio_test::block_on(migration.plan.run(&first)).unwrap();
    tokio_test::block_on(migration.plan.run(&second)).unwrap();

    assert_eq!(first.calls(), second.calls());
}
