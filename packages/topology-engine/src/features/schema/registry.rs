//! Schema Registry
//!
//! Closed sets of entity and relationship kinds plus, per relationship kind,
//! the allowed (source kind, target kind) pairs. Built once and never mutated;
//! the process-wide default is shared through [`SchemaRegistry::global`].

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use super::kinds::{EntityKind, RelationshipKind};
use crate::errors::{Result, TopologyError};

/// Allowed (source kind, target kind) pair
pub type EndpointPair = (EntityKind, EntityKind);

static GLOBAL_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::standard);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    endpoints: BTreeMap<RelationshipKind, Vec<EndpointPair>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl SchemaRegistry {
    /// Shared immutable registry with the standard allow-list
    pub fn global() -> &'static SchemaRegistry {
        &GLOBAL_REGISTRY
    }

    /// The standard infrastructure allow-list
    pub fn standard() -> Self {
        use EntityKind::*;
        use RelationshipKind::*;

        Self::from_rules([
            (Contains, vec![(NetworkSwitch, NetworkPort), (KubernetesPod, Container)]),
            (BelongsTo, vec![(NetworkPort, Vlan), (Server, Vlan)]),
            (Hosts, vec![(Server, VirtualMachine)]),
            (RunsOn, vec![(VirtualMachine, KubernetesPod)]),
            (
                ConnectedTo,
                vec![
                    (Container, NetworkPort),
                    (Server, Vlan),
                    (NetworkSwitch, NetworkSwitch),
                    (NetworkPort, NetworkPort),
                ],
            ),
            (
                DeployedOn,
                vec![(KubernetesPod, VirtualMachine), (Container, VirtualMachine)],
            ),
            (
                PartOf,
                vec![
                    (NetworkPort, NetworkSwitch),
                    (VirtualMachine, Server),
                    (Container, KubernetesPod),
                ],
            ),
        ])
    }

    /// Registry restricted to the given rules
    ///
    /// A relationship kind absent from `rules` is treated as unregistered.
    pub fn from_rules<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = (RelationshipKind, Vec<EndpointPair>)>,
    {
        let mut endpoints: BTreeMap<RelationshipKind, Vec<EndpointPair>> = BTreeMap::new();
        for (kind, pairs) in rules {
            let entry = endpoints.entry(kind).or_default();
            for pair in pairs {
                if !entry.contains(&pair) {
                    entry.push(pair);
                }
            }
        }
        Self { endpoints }
    }

    /// All entity kinds, in hierarchy order
    pub fn entity_kinds(&self) -> &'static [EntityKind] {
        &EntityKind::ALL
    }

    /// Relationship kinds this registry knows about
    pub fn relationship_kinds(&self) -> Vec<RelationshipKind> {
        self.endpoints.keys().copied().collect()
    }

    /// Resolve an entity kind by wire name (`"VLAN"`)
    pub fn entity_kind(&self, name: &str) -> Result<EntityKind> {
        name.parse()
    }

    /// Resolve a relationship kind by wire name, registered in this registry
    pub fn relationship_kind(&self, name: &str) -> Result<RelationshipKind> {
        let kind: RelationshipKind = name.parse()?;
        if !self.endpoints.contains_key(&kind) {
            return Err(TopologyError::KindNotRegistered(name.to_string()));
        }
        Ok(kind)
    }

    /// Allowed endpoint pairs for a relationship kind
    pub fn allowed_endpoints(&self, kind: RelationshipKind) -> Result<&[EndpointPair]> {
        self.endpoints
            .get(&kind)
            .map(Vec::as_slice)
            .ok_or_else(|| TopologyError::KindNotRegistered(kind.to_string()))
    }

    /// Allowed endpoint pairs, looked up by wire name (`"HOSTS"`)
    pub fn allowed_endpoints_by_name(&self, name: &str) -> Result<&[EndpointPair]> {
        let kind: RelationshipKind = name.parse()?;
        self.allowed_endpoints(kind)
    }

    /// Whether `name` is a registered entity or relationship kind
    pub fn is_valid_kind(&self, name: &str) -> bool {
        name.parse::<EntityKind>().is_ok()
            || name
                .parse::<RelationshipKind>()
                .is_ok_and(|kind| self.endpoints.contains_key(&kind))
    }

    pub fn allows(&self, kind: RelationshipKind, source: EntityKind, target: EntityKind) -> bool {
        self.endpoints
            .get(&kind)
            .is_some_and(|pairs| pairs.contains(&(source, target)))
    }

    /// Fail with `SchemaViolation` unless the pair is allowed
    pub fn check(&self, kind: RelationshipKind, source: EntityKind, target: EntityKind) -> Result<()> {
        let pairs = self.allowed_endpoints(kind)?;
        if pairs.contains(&(source, target)) {
            Ok(())
        } else {
            Err(TopologyError::SchemaViolation {
                relationship: kind,
                source_kind: source,
                target_kind: target,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EntityKind::*;
    use RelationshipKind::*;

    #[test]
    fn test_standard_registry_covers_all_relationship_kinds() {
        let registry = SchemaRegistry::global();
        assert_eq!(registry.relationship_kinds(), RelationshipKind::ALL.to_vec());
        assert_eq!(registry.entity_kinds().len(), 7);
    }

    #[test]
    fn test_allowed_endpoints_hosts() {
        let pairs = SchemaRegistry::global().allowed_endpoints(Hosts).unwrap();
        assert_eq!(pairs, &[(Server, VirtualMachine)]);
    }

    #[test]
    fn test_allowed_endpoints_by_name() {
        let pairs = SchemaRegistry::global()
            .allowed_endpoints_by_name("CONNECTED_TO")
            .unwrap();
        assert_eq!(pairs.len(), 4);
        assert!(pairs.contains(&(NetworkSwitch, NetworkSwitch)));

        let err = SchemaRegistry::global()
            .allowed_endpoints_by_name("MANAGES")
            .unwrap_err();
        assert!(matches!(err, TopologyError::KindNotRegistered(_)));
    }

    #[test]
    fn test_is_valid_kind() {
        let registry = SchemaRegistry::global();
        assert!(registry.is_valid_kind("VLAN"));
        assert!(registry.is_valid_kind("PART_OF"));
        assert!(!registry.is_valid_kind("Router"));
        assert!(!registry.is_valid_kind("vlan"));
    }

    #[test]
    fn test_kind_lookup_by_name() {
        let registry = SchemaRegistry::global();
        assert_eq!(registry.entity_kind("KubernetesPod").unwrap(), KubernetesPod);
        assert_eq!(registry.relationship_kind("RUNS_ON").unwrap(), RunsOn);
        assert!(matches!(
            registry.entity_kind("Pod"),
            Err(TopologyError::KindNotRegistered(_))
        ));
    }

    #[test]
    fn test_check_rejects_disallowed_pair() {
        let registry = SchemaRegistry::global();
        assert!(registry.check(Hosts, Server, VirtualMachine).is_ok());

        let err = registry.check(Hosts, VirtualMachine, Server).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::SchemaViolation {
                relationship: Hosts,
                source_kind: VirtualMachine,
                target_kind: Server,
            }
        ));
    }

    #[test]
    fn test_custom_registry_unregistered_kind() {
        let registry = SchemaRegistry::from_rules([(Hosts, vec![(Server, VirtualMachine)])]);
        assert!(!registry.allows(RunsOn, VirtualMachine, KubernetesPod));
        assert!(matches!(
            registry.check(RunsOn, VirtualMachine, KubernetesPod),
            Err(TopologyError::KindNotRegistered(_))
        ));
        assert!(!registry.is_valid_kind("RUNS_ON"));
    }

    #[test]
    fn test_from_rules_deduplicates_pairs() {
        let registry = SchemaRegistry::from_rules([
            (Hosts, vec![(Server, VirtualMachine)]),
            (Hosts, vec![(Server, VirtualMachine)]),
        ]);
        assert_eq!(registry.allowed_endpoints(Hosts).unwrap().len(), 1);
    }
}
