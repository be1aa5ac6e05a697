use chain_migrate::utils::{logger, validation::Validate};
use chain_migrate::{CliArgs, MigrationConfig, MigrationSequence};
use clap::Parser;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting chain-migrate");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match MigrationConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(network) = &args.network {
        tracing::info!("🔧 Network overridden to: {}", network);
        config.network.name = network.clone();
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let execution_id = args.execution_id();
    tracing::info!(
        "✅ Project {} on network {} [execution: {}]",
        config.project.name,
        config.network.name,
        execution_id
    );

    if let Err(e) = run(&config, &args, execution_id).await {
        tracing::error!("❌ Migration run failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }
}

async fn run(config: &MigrationConfig, args: &CliArgs, execution_id: String) -> chain_migrate::Result<()> {
    let registry = config.build_registry()?;
    let migrations = config.build_migrations(&registry)?;
    let deployer = config.build_deployer(args.dry_run)?;

    let mut sequence = MigrationSequence::new(execution_id.clone());
    if let Some(from) = args.from {
        sequence = sequence.starting_from(from);
    }
    for migration in migrations {
        sequence.add_migration(migration);
    }

    let results = sequence.execute_all(deployer.as_ref()).await?;
    let summary = MigrationSequence::execution_summary(&results);
    tracing::info!("📊 Summary: {}", serde_json::to_string(&summary)?);

    println!("✅ Migrations completed successfully!");
    println!("🆔 Execution ID: {}", execution_id);
    for result in &results {
        println!(
            "   {}_{}: {} ({:?})",
            result.number,
            result.name,
            result.units.join(", "),
            result.duration
        );
    }
    Ok(())
}
