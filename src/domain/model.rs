use crate::domain::ports::ArtifactResolver;
use crate::utils::error::{MigrateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named contract artifact handed to a deployer.
///
/// The artifact document, when loaded from a build directory, is carried
/// as-is; its ABI and bytecode are the deployer's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployableUnit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<serde_json::Value>,
}

impl DeployableUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifact: None,
        }
    }

    pub fn with_artifact(mut self, artifact: serde_json::Value) -> Self {
        self.artifact = Some(artifact);
        self
    }
}

/// Ordered units for a single deployment run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentPlan {
    units: Vec<DeployableUnit>,
}

impl DeploymentPlan {
    pub fn new(units: Vec<DeployableUnit>) -> Self {
        Self { units }
    }

    /// Resolves each name in order, stopping at the first unknown or repeated one.
    pub fn resolve<R, I, S>(resolver: &R, names: I) -> Result<Self>
    where
        R: ArtifactResolver + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut units = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !seen.insert(name.to_string()) {
                return Err(MigrateError::DuplicateUnit {
                    name: name.to_string(),
                });
            }
            units.push(resolver.require(name)?);
        }
        Ok(Self { units })
    }

    pub fn units(&self) -> &[DeployableUnit] {
        &self.units
    }

    pub fn unit_names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// A numbered deployment step against a target network.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub number: u32,
    pub name: String,
    pub enabled: bool,
    pub plan: DeploymentPlan,
}

impl Migration {
    pub fn new(number: u32, name: impl Into<String>, plan: DeploymentPlan) -> Self {
        Self {
            number,
            name: name.into(),
            enabled: true,
            plan,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// File-style label, e.g. `1_initial_migration`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.number, self.name)
    }
}
