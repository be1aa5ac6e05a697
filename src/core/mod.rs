pub mod descriptor;
pub mod migration_sequence;

pub use crate::domain::model::{DeployableUnit, DeploymentPlan, Migration};
pub use crate::domain::ports::{ArtifactResolver, Deployer};
pub use crate::utils::error::Result;
