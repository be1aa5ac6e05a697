use crate::domain::model::DeployableUnit;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Looks up a deployable unit by contract name.
pub trait ArtifactResolver: Send + Sync {
    /// Fails with `MigrateError::NotFound` for unknown names.
    fn require(&self, name: &str) -> Result<DeployableUnit>;
}

/// Publishes one unit to a network.
#[async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(&self, unit: &DeployableUnit) -> Result<()>;
}

