use lamp_schema::{NormalizedFleet, SchemaError, System, SystemId};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown system: {0}")]
    NotFound(String),
}

/// Immutable catalog of the systems a fleet declares.
///
/// Built once; there is no way to add or change a system afterwards, so a
/// `Registry` can be shared across threads by reference.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    systems: BTreeMap<SystemId, System>,
}

impl Registry {
    pub fn from_fleet(fleet: &NormalizedFleet) -> Self {
        Self::from_systems(fleet.systems.iter().cloned())
    }

    pub fn from_systems(systems: impl IntoIterator<Item = System>) -> Self {
        Self {
            systems: systems.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    /// Registry of the built-in LAMP fleet.
    pub fn builtin() -> Result<Self, SchemaError> {
        Ok(Self::from_fleet(&lamp_schema::builtin_fleet()?))
    }

    /// Exact-match lookup. Ids are case-sensitive and never prefix-matched.
    pub fn lookup(&self, system_id: &str) -> Result<&System, RegistryError> {
        self.systems
            .get(system_id)
            .ok_or_else(|| RegistryError::NotFound(system_id.to_owned()))
    }

    /// Systems in id order.
    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.systems.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SystemId> {
        self.systems.keys()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
