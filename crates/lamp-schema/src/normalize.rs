use crate::capability::Capability;
use crate::fleet::{FleetDeclaration, HostDeclaration, SchemaError, SystemDeclaration};
use crate::host::{HostClass, HostProfile};
use crate::system::System;
use crate::types::{CommitId, SystemId};
use crate::value::ConfigTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Validated fleet: systems sorted by id, capabilities deduplicated, commits
/// checked, and a host profile for every host class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedFleet {
    pub systems: Vec<System>,
    pub base: ConfigTable,
    pub overrides: BTreeMap<SystemId, ConfigTable>,
    pub hosts: BTreeMap<HostClass, HostProfile>,
}

impl FleetDeclaration {
    /// Normalize the declaration: validate ids and pins, dedupe capabilities,
    /// fill host profiles from the built-in defaults.
    pub fn normalize(&self) -> Result<NormalizedFleet, SchemaError> {
        if self.fleet_version != 1 {
            return Err(SchemaError::UnsupportedVersion(self.fleet_version));
        }

        let mut systems = Vec::with_capacity(self.systems.len());
        let mut overrides = BTreeMap::new();
        for (raw_id, decl) in &self.systems {
            let system = normalize_system(raw_id, decl)?;
            if overrides.contains_key(&system.id) {
                return Err(SchemaError::DuplicateSystemId(system.id.to_string()));
            }
            overrides.insert(system.id.clone(), decl.config.clone());
            systems.push(system);
        }
        systems.sort_by(|a, b| a.id.cmp(&b.id));

        let mut hosts: BTreeMap<HostClass, HostProfile> = HostClass::ALL
            .into_iter()
            .map(|class| (class, HostProfile::builtin(class)))
            .collect();
        for (raw_class, decl) in &self.hosts {
            let class: HostClass = raw_class
                .parse()
                .map_err(|_| SchemaError::UnknownHostClass(raw_class.clone()))?;
            if let Some(profile) = hosts.get_mut(&class) {
                apply_host_override(profile, decl);
            }
        }

        Ok(NormalizedFleet {
            systems,
            base: self.base.clone(),
            overrides,
            hosts,
        })
    }
}

impl NormalizedFleet {
    pub fn host_profile(&self, host_class: HostClass) -> HostProfile {
        self.hosts
            .get(&host_class)
            .cloned()
            .unwrap_or_else(|| HostProfile::builtin(host_class))
    }
}

fn normalize_system(raw_id: &str, decl: &SystemDeclaration) -> Result<System, SchemaError> {
    let id = raw_id.trim();
    if id.is_empty() {
        return Err(SchemaError::EmptySystemId);
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(SchemaError::InvalidSystemId(id.to_owned()));
    }

    let host_class = decl.host_class.ok_or_else(|| SchemaError::MissingHostClass {
        system: id.to_owned(),
    })?;

    let commit = match &decl.commit {
        Some(raw) => Some(normalize_commit(id, raw)?),
        None => None,
    };

    Ok(System {
        id: SystemId::new(id),
        description: decl
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned),
        host_class,
        capabilities: dedup_in_order(&decl.capabilities),
        commit,
    })
}

fn normalize_commit(system: &str, raw: &str) -> Result<CommitId, SchemaError> {
    let commit = raw.trim().to_lowercase();
    if commit.len() != 40 || !commit.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SchemaError::UnpinnedCommit {
            system: system.to_owned(),
            commit: raw.to_owned(),
        });
    }
    Ok(CommitId::new(commit))
}

fn apply_host_override(profile: &mut HostProfile, decl: &HostDeclaration) {
    if let Some(devices) = &decl.devices {
        profile.devices = devices
            .iter()
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty())
            .collect();
    }
    if let Some(allow) = decl.allow_privileged {
        profile.allow_privileged = allow;
    }
}

fn dedup_in_order(values: &[Capability]) -> Vec<Capability> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(value) {
            out.push(*value);
        }
    }
    out
}
