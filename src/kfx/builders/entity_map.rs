//! `$419` container entity map.
//!
//! Lets a reader find which fragments live in a physical container and which
//! resources a section needs without scanning the whole graph.

use crate::kfx::ion::IonValue;
use crate::kfx::symbols::sym;

/// Dependencies of one fragment on others, all by fragment name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityDependency {
    pub fragment: String,
    /// Required (section -> resources)
    pub mandatory: Vec<String>,
    /// Optional (resource -> raw media)
    pub optional: Vec<String>,
}

impl EntityDependency {
    pub fn is_empty(&self) -> bool {
        self.mandatory.is_empty() && self.optional.is_empty()
    }
}

/// Build the `$419` value.
///
/// `{$252: [{$155: container_id, $181: [fragment ids]}], $253: [dependencies]}`.
/// Dependencies with no edges are still listed so every section appears.
pub fn build_entity_map<S: AsRef<str>>(
    container_id: &str,
    fragment_ids: &[S],
    dependencies: &[EntityDependency],
) -> IonValue {
    let contains = fragment_ids
        .iter()
        .map(|id| symbol_ref(id.as_ref()))
        .collect();

    let container = IonValue::structure()
        .set_str(sym::ID, container_id)
        .set_list(sym::CONTAINS, contains)
        .build();

    let mut map = IonValue::structure().set_list(sym::CONTAINER_LIST, vec![container]);

    if !dependencies.is_empty() {
        let deps = dependencies
            .iter()
            .map(|dep| {
                let mut entry = IonValue::structure()
                    .set_symbol_name(sym::ID, dep.fragment.as_str());
                entry = entry.set_list(
                    sym::MANDATORY_DEPENDENCIES,
                    dep.mandatory.iter().map(|n| symbol_ref(n)).collect(),
                );
                if !dep.optional.is_empty() {
                    entry = entry.set_list(
                        sym::OPTIONAL_DEPENDENCIES,
                        dep.optional.iter().map(|n| symbol_ref(n)).collect(),
                    );
                }
                entry.build()
            })
            .collect();
        map = map.set_list(sym::ENTITY_DEPENDENCIES, deps);
    }

    map.build()
}

/// Root fragments are addressed as `$N`; everything else by name.
fn symbol_ref(name: &str) -> IonValue {
    IonValue::SymbolByName(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_list() {
        let map = build_entity_map("CR!X", &["c0", "$538"], &[]);
        let containers = map.get(sym::CONTAINER_LIST).and_then(|v| v.as_list()).unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(
            containers[0].get(sym::ID).and_then(|v| v.as_string()),
            Some("CR!X")
        );
        let ids: Vec<_> = containers[0]
            .get(sym::CONTAINS)
            .and_then(|v| v.as_list())
            .unwrap()
            .iter()
            .filter_map(|v| v.as_symbol_name())
            .collect();
        assert_eq!(ids, vec!["c0", "$538"]);
        assert!(map.get(sym::ENTITY_DEPENDENCIES).is_none());
    }

    #[test]
    fn test_dependencies() {
        let deps = vec![
            EntityDependency {
                fragment: "c0".into(),
                mandatory: vec!["e1".into()],
                optional: vec![],
            },
            EntityDependency {
                fragment: "e1".into(),
                mandatory: vec![],
                optional: vec!["resource/rsrc1".into()],
            },
        ];
        let map = build_entity_map::<&str>("CR!X", &[], &deps);
        let list = map.get(sym::ENTITY_DEPENDENCIES).and_then(|v| v.as_list()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list[0].get(sym::MANDATORY_DEPENDENCIES).and_then(|v| v.as_list()).map(<[_]>::len),
            Some(1)
        );
        assert!(list[0].get(sym::OPTIONAL_DEPENDENCIES).is_none());
        assert_eq!(
            list[1]
                .get(sym::OPTIONAL_DEPENDENCIES)
                .and_then(|v| v.as_list())
                .and_then(|l| l[0].as_symbol_name()),
            Some("resource/rsrc1")
        );
    }
}
