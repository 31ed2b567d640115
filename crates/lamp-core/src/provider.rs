use lamp_schema::{CommitId, ConfigLayer, ConfigTable, NormalizedFleet, System, SystemId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const BASE_FILE: &str = "base.toml";
const SYSTEM_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no configuration source for system '{0}'")]
    NotFound(String),
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// The configuration layers and source pin for one system.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTree {
    pub layer: ConfigLayer,
    pub commit: Option<CommitId>,
}

/// Supplies the base and per-system configuration layers a system resolves from.
pub trait ConfigProvider: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self, system: &System) -> Result<SourceTree, ProviderError>;
}

/// Layers embedded in the fleet declaration itself.
#[derive(Debug, Clone, Default)]
pub struct FleetProvider {
    base: ConfigTable,
    overrides: BTreeMap<SystemId, ConfigTable>,
}

impl FleetProvider {
    pub fn new(base: ConfigTable, overrides: BTreeMap<SystemId, ConfigTable>) -> Self {
        Self { base, overrides }
    }

    pub fn from_fleet(fleet: &NormalizedFleet) -> Self {
        Self::new(fleet.base.clone(), fleet.overrides.clone())
    }
}

impl ConfigProvider for FleetProvider {
    fn name(&self) -> &'static str {
        "fleet"
    }

    fn source(&self, system: &System) -> Result<SourceTree, ProviderError> {
        let overlay = self
            .overrides
            .get(system.id.as_str())
            .ok_or_else(|| ProviderError::NotFound(system.id.to_string()))?;
        Ok(SourceTree {
            layer: ConfigLayer::new(self.base.clone(), overlay.clone()),
            commit: system.commit.clone(),
        })
    }
}

/// A checked-out configuration tree on disk.
///
/// Layout: `<root>/base.toml` holds the shared layer and
/// `<root>/<system>/config.toml` the system override. Both files are optional,
/// but the system directory must exist.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ConfigProvider for DirectoryProvider {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn source(&self, system: &System) -> Result<SourceTree, ProviderError> {
        let system_dir = self.root.join(system.id.as_str());
        if !system_dir.is_dir() {
            return Err(ProviderError::NotFound(system.id.to_string()));
        }

        let base = read_optional_table(&self.root.join(BASE_FILE))?;
        let overlay = read_optional_table(&system_dir.join(SYSTEM_FILE))?;
        debug!(
            "sourced {} base keys and {} override keys for {} from {}",
            base.len(),
            overlay.len(),
            system.id,
            self.root.display()
        );

        Ok(SourceTree {
            layer: ConfigLayer::new(base, overlay),
            commit: system.commit.clone(),
        })
    }
}

fn read_optional_table(path: &Path) -> Result<ConfigTable, ProviderError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ConfigTable::new()),
        Err(source) => {
            return Err(ProviderError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    lamp_schema::parse_table_str(&content).map_err(|e| ProviderError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
