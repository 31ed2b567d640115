use crate::provider::SourceTree;
use lamp_schema::{
    Capability, CommitId, ConfigLayer, ConfigTable, ConfigValue, HostClass, System, SystemId,
    ValueKind,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("merge conflict on key '{key}': base value is a {base}, override is a {overlay}")]
    Conflict {
        key: String,
        base: ValueKind,
        overlay: ValueKind,
    },
}

/// A system's fully merged configuration. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveDescriptor {
    system: SystemId,
    host_class: HostClass,
    capabilities: Vec<Capability>,
    config: ConfigTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<CommitId>,
}

impl EffectiveDescriptor {
    pub fn system(&self) -> &SystemId {
        &self.system
    }

    pub fn host_class(&self) -> HostClass {
        self.host_class
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn config(&self) -> &ConfigTable {
        &self.config
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.config.get(key)
    }

    pub fn commit(&self) -> Option<&CommitId> {
        self.commit.as_ref()
    }
}

/// Merge a system's configuration layers into its effective descriptor.
pub fn resolve(system: &System, layer: &ConfigLayer) -> Result<EffectiveDescriptor, ResolveError> {
    build(system, layer, system.commit.clone())
}

/// Like [`resolve`], taking the commit pin from the source tree when it has one.
pub fn resolve_source(
    system: &System,
    source: &SourceTree,
) -> Result<EffectiveDescriptor, ResolveError> {
    let commit = source.commit.clone().or_else(|| system.commit.clone());
    build(system, &source.layer, commit)
}

fn build(
    system: &System,
    layer: &ConfigLayer,
    commit: Option<CommitId>,
) -> Result<EffectiveDescriptor, ResolveError> {
    let config = merge_tables(&layer.base, &layer.overlay)?;
    debug!(
        "resolved {} with {} effective keys",
        system.id,
        config.len()
    );
    Ok(EffectiveDescriptor {
        system: system.id.clone(),
        host_class: system.host_class,
        capabilities: system.capabilities.clone(),
        config,
        commit,
    })
}

/// Overlay `overlay` onto `base`.
///
/// Override values win. Keys present in both layers must have the same kind.
/// Two maps under the same top-level key are merged one level deep; anything
/// below that is replaced wholesale.
pub fn merge_tables(base: &ConfigTable, overlay: &ConfigTable) -> Result<ConfigTable, ResolveError> {
    merge_level(base, overlay, None)
}

fn merge_level(
    base: &ConfigTable,
    overlay: &ConfigTable,
    parent: Option<&str>,
) -> Result<ConfigTable, ResolveError> {
    let mut merged = base.clone();
    for (key, over) in overlay {
        let value = match base.get(key) {
            None => over.clone(),
            Some(existing) if existing.kind() != over.kind() => {
                return Err(ResolveError::Conflict {
                    key: parent.map_or_else(|| key.clone(), |p| format!("{p}.{key}")),
                    base: existing.kind(),
                    overlay: over.kind(),
                });
            }
            Some(existing) => match (parent, existing, over) {
                (None, ConfigValue::Map(b), ConfigValue::Map(o)) => {
                    ConfigValue::Map(merge_level(b, o, Some(key))?)
                }
                _ => over.clone(),
            },
        };
        merged.insert(key.clone(), value);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(toml: &str) -> ConfigTable {
        lamp_schema::parse_table_str(toml).unwrap()
    }

    fn system() -> System {
        System {
            id: SystemId::new("polaris_v2"),
            description: None,
            host_class: HostClass::Nuc,
            capabilities: vec![Capability::Gpu, Capability::Lidar],
            commit: None,
        }
    }

    #[test]
    fn override_wins_and_base_keys_survive() {
        let merged = merge_tables(&table("a = 1\nb = 2"), &table("b = 3")).unwrap();
        assert_eq!(merged, table("a = 1\nb = 3"));
    }

    #[test]
    fn override_only_keys_pass_through() {
        let merged = merge_tables(&table("a = 1"), &table("c = \"x\"")).unwrap();
        assert_eq!(merged, table("a = 1\nc = \"x\""));
    }

    #[test]
    fn kind_mismatch_is_conflict() {
        let err = merge_tables(&table("a = [1, 2]"), &table("a = 5")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Conflict {
                key: "a".to_owned(),
                base: ValueKind::List,
                overlay: ValueKind::Number,
            }
        );
    }

    #[test]
    fn integer_and_float_are_both_numbers() {
        let merged = merge_tables(&table("rate = 10"), &table("rate = 12.5")).unwrap();
        assert_eq!(merged.get("rate"), Some(&ConfigValue::Float(12.5)));
    }

    #[test]
    fn maps_merge_one_level_deep() {
        let base = table("[env]\nA = \"1\"\nB = \"2\"\n[env.nested]\nx = 1\ny = 2");
        let overlay = table("[env]\nB = \"3\"\n[env.nested]\nx = 5");
        let merged = merge_tables(&base, &overlay).unwrap();
        let env = merged["env"].as_map().unwrap();
        assert_eq!(env["A"], ConfigValue::from("1"));
        assert_eq!(env["B"], ConfigValue::from("3"));
        // nested tables are replaced, so `y` is gone
        assert_eq!(env["nested"], ConfigValue::Map(table("x = 5")));
    }

    #[test]
    fn nested_conflict_uses_dotted_key() {
        let err =
            merge_tables(&table("[env]\nFOO = \"1\""), &table("[env]\nFOO = true")).unwrap_err();
        assert!(matches!(err, ResolveError::Conflict { ref key, .. } if key == "env.FOO"));
        assert!(err.to_string().starts_with("merge conflict on key 'env.FOO'"));
    }

    #[test]
    fn resolve_is_deterministic_and_pure() {
        let layer = ConfigLayer::new(table("tag = \"humble\"\n[env]\nA = \"1\""), table("tag = \"iron\""));
        let before = layer.clone();
        let a = resolve(&system(), &layer).unwrap();
        let b = resolve(&system(), &layer).unwrap();
        assert_eq!(a, b);
        assert_eq!(layer, before);
        assert_eq!(a.get("tag"), Some(&ConfigValue::from("iron")));
        assert_eq!(a.capabilities(), &[Capability::Gpu, Capability::Lidar]);
        assert_eq!(a.host_class(), HostClass::Nuc);
    }

    #[test]
    fn empty_layers_resolve_to_empty_config() {
        let descriptor = resolve(&system(), &ConfigLayer::default()).unwrap();
        assert!(descriptor.config().is_empty());
        assert_eq!(descriptor.system().as_str(), "polaris_v2");
    }

    #[test]
    fn source_commit_takes_precedence() {
        let mut sys = system();
        sys.commit = Some(CommitId::new("a".repeat(40)));
        let source = SourceTree {
            layer: ConfigLayer::default(),
            commit: Some(CommitId::new("b".repeat(40))),
        };
        let descriptor = resolve_source(&sys, &source).unwrap();
        assert_eq!(descriptor.commit().unwrap().as_str(), "b".repeat(40));
    }
}
