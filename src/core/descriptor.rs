use crate::core::{ArtifactResolver, DeploymentPlan, Deployer, Migration};
use crate::utils::error::Result;

/// Contracts published by the first migration of the pharma supply chain project.
pub const INITIAL_MIGRATION_UNITS: [&str; 2] = ["Migrations", "PharmaSupplyChain"];

impl DeploymentPlan {
    /// Hands every unit to `deployer`, one at a time, in declaration order.
    ///
    /// Each `deploy` call completes before the next one starts. The first
    /// error is returned as the deployer produced it and no later unit is
    /// submitted.
    pub async fn run<D>(&self, deployer: &D) -> Result<()>
    where
        D: Deployer + ?Sized,
    {
        for unit in self.units() {
            deployer.deploy(unit).await?;
        }
        Ok(())
    }
}

/// `1_initial_migration`: deploys `Migrations`, then `PharmaSupplyChain`.
pub fn initial_migration<R>(resolver: &R) -> Result<Migration>
where
    R: ArtifactResolver + ?Sized,
{
    let plan = DeploymentPlan::resolve(resolver, INITIAL_MIGRATION_UNITS)?;
    Ok(Migration::new(1, "initial_migration", plan))
}
