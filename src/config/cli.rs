use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "chain-migrate")]
#[command(about = "Runs ordered contract deployment migrations")]
pub struct CliArgs {
    /// Path to the migration configuration file
    #[arg(short, long, default_value = "migrations.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Log what would be deployed instead of deploying
    #[arg(long)]
    pub dry_run: bool,

    /// Run migrations starting from this number
    #[arg(long)]
    pub from: Option<u32>,

    /// Override the network name from the config
    #[arg(long)]
    pub network: Option<String>,

    /// Execution ID for this run
    #[arg(long)]
    pub execution_id: Option<String>,
}

impl CliArgs {
    pub fn execution_id(&self) -> String {
        self.execution_id
            .clone()
            .unwrap_or_else(|| format!("mig_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S")))
    }
}
