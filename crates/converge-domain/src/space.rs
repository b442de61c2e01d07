//! Fluent assertions for [`Space`].

use converge_core::{shared_list, Assertion, AssertionFixer, FailureSink, FluentAssertions, SharedAssertions};

use crate::conditions::ConditionsAssertions;
use crate::metadata::MetadataAssertions;
use crate::resources::Space;

/// The space is provisioned from the given tier
#[derive(Debug, Clone, PartialEq)]
pub struct HasTier(pub String);

impl Assertion<Space> for HasTier {
    fn test(&self, sink: &mut dyn FailureSink, obj: &Space) {
        if obj.spec.tier_name != self.0 {
            sink.error(format!("expected tier '{}', got '{}'", self.0, obj.spec.tier_name));
        }
    }

    fn describe(&self) -> String {
        format!("tier is {}", self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<Space>> {
        Some(self)
    }
}

impl AssertionFixer<Space> for HasTier {
    fn adapt_to_match(&self, obj: &mut Space) {
        obj.spec.tier_name = self.0.clone();
    }
}

/// The space targets the given cluster
#[derive(Debug, Clone, PartialEq)]
pub struct HasTargetCluster(pub String);

impl Assertion<Space> for HasTargetCluster {
    fn test(&self, sink: &mut dyn FailureSink, obj: &Space) {
        match obj.spec.target_cluster.as_deref() {
            Some(cluster) if cluster == self.0 => {}
            Some(cluster) => sink.error(format!(
                "expected target cluster '{}', got '{}'",
                self.0, cluster
            )),
            None => sink.error(format!("expected target cluster '{}', none set", self.0)),
        }
    }

    fn describe(&self) -> String {
        format!("target cluster is {}", self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<Space>> {
        Some(self)
    }
}

impl AssertionFixer<Space> for HasTargetCluster {
    fn adapt_to_match(&self, obj: &mut Space) {
        obj.spec.target_cluster = Some(self.0.clone());
    }
}

/// Builder of assertions on a [`Space`].
#[derive(Clone)]
pub struct SpaceAssertions {
    list: SharedAssertions<Space>,
}

impl SpaceAssertions {
    /// Start an empty chain
    pub fn new() -> Self {
        Self { list: shared_list() }
    }

    /// Metadata assertions
    pub fn metadata(self) -> MetadataAssertions<Self, Space> {
        self.embed()
    }

    /// Condition assertions
    pub fn conditions(self) -> ConditionsAssertions<Self, Space> {
        self.embed()
    }

    /// Expect the given tier
    pub fn has_tier(self, tier: impl Into<String>) -> Self {
        self.satisfies(HasTier(tier.into()))
    }

    /// Expect the given target cluster
    pub fn has_target_cluster(self, cluster: impl Into<String>) -> Self {
        self.satisfies(HasTargetCluster(cluster.into()))
    }
}

impl Default for SpaceAssertions {
    fn default() -> Self {
        Self::new()
    }
}

impl FluentAssertions<Space> for SpaceAssertions {
    fn shared(&self) -> &SharedAssertions<Space> {
        &self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Condition, ConditionStatus, ObjectMeta};
    use converge_core::{explain, resolve_key, ObjectKey};
    use pretty_assertions::assert_eq;

    fn space() -> Space {
        let mut space = Space {
            metadata: ObjectMeta::namespaced("toolchain", "john"),
            ..Default::default()
        };
        space.spec.tier_name = "base".to_string();
        space.status.conditions.push(Condition::new("Ready", ConditionStatus::False));
        space
    }

    #[test]
    fn test_chain_accumulates_in_call_order() {
        let list = SpaceAssertions::new()
            .metadata()
            .has_name("john")
            .has_tier("base")
            .conditions()
            .is_ready()
            .metadata()
            .in_namespace("toolchain")
            .build();

        let described: Vec<String> = list.iter().map(|a| a.describe()).collect();
        assert_eq!(
            described,
            vec!["name is john", "tier is base", "condition Ready=True", "namespace is toolchain"]
        );
        assert_eq!(
            list.failures(&space()),
            vec!["expected condition 'Ready' to be True, got False"]
        );
    }

    #[test]
    fn test_markers_survive_metadata_mixin() {
        let list = SpaceAssertions::new()
            .has_tier("base")
            .metadata()
            .in_namespace("toolchain")
            .metadata()
            .has_name("john")
            .build();

        assert_eq!(resolve_key(&list), Ok(ObjectKey::new("toolchain", "john")));
    }

    #[test]
    fn test_explain_covers_every_layer() {
        let list = SpaceAssertions::new()
            .metadata()
            .has_label("owner", "john")
            .has_tier("advanced")
            .has_target_cluster("member-1")
            .conditions()
            .is_ready()
            .build();

        let explanation = explain(&space(), &list).expect("space serialises");
        assert!(explanation.unexplained.is_empty());
        assert_eq!(
            explanation.diff_text(),
            [
                "+ metadata.labels: {\"owner\":\"john\"}",
                "~ spec.tierName: \"base\" -> \"advanced\"",
                "+ spec.targetCluster: \"member-1\"",
                "~ status.conditions[0].status: \"False\" -> \"True\"",
            ]
            .join("\n")
        );
    }
}
