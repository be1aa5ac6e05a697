use crate::core::{ArtifactResolver, DeployableUnit};
use crate::utils::error::{MigrateError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// In-memory artifact registry keyed by contract name.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    units: BTreeMap<String, DeployableUnit>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of bare units with no artifact document attached.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let units = names
            .into_iter()
            .map(|name| {
                let unit = DeployableUnit::new(name);
                (unit.name.clone(), unit)
            })
            .collect();
        Self { units }
    }

    /// Loads every `*.json` artifact from a compiled contracts directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut registry = Self::new();

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let content = fs::read_to_string(&path)?;
            let document: serde_json::Value = serde_json::from_str(&content)?;

            let name = document
                .get("contractName")
                .and_then(|v| v.as_str())
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| MigrateError::InvalidArtifact {
                    path: path.display().to_string(),
                    reason: "missing string field 'contractName'".to_string(),
                })?
                .to_string();

            tracing::debug!("Loaded artifact {} from {}", name, path.display());
            registry.register(DeployableUnit::new(name).with_artifact(document))?;
        }

        tracing::info!(
            "📚 Loaded {} artifact(s) from {}",
            registry.len(),
            dir.display()
        );
        Ok(registry)
    }

    pub fn register(&mut self, unit: DeployableUnit) -> Result<()> {
        if self.units.contains_key(&unit.name) {
            return Err(MigrateError::DuplicateUnit { name: unit.name });
        }
        self.units.insert(unit.name.clone(), unit);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.units.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl ArtifactResolver for ArtifactRegistry {
    fn require(&self, name: &str) -> Result<DeployableUnit> {
        self.units
            .get(name)
            .cloned()
            .ok_or_else(|| MigrateError::NotFound {
                name: name.to_string(),
            })
    }
}
