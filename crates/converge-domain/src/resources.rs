//! Resource model shared by the domain assertion packages.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use converge_core::{AsAny, Keyed, ObjectKey};

/// Standard object metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Object name, unique within its namespace
    pub name: String,
    /// Namespace, `None` for cluster scoped objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Identifying labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Non-identifying annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Finalizers blocking deletion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
    /// Store assigned unique id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    /// Spec generation
    #[serde(default)]
    pub generation: i64,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// Metadata of a namespaced object
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    /// Store key derived from name and namespace
    pub fn key(&self) -> ObjectKey {
        ObjectKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }
}

/// Status of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    /// The condition holds
    True,
    /// The condition does not hold
    False,
    /// Not known yet
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionStatus::True => write!(f, "True"),
            ConditionStatus::False => write!(f, "False"),
            ConditionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A status condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type, e.g. `Ready`
    #[serde(rename = "type")]
    pub type_: String,
    /// Condition status
    pub status: ConditionStatus,
    /// Machine readable reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Last time the status changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    /// Condition with a type and status
    pub fn new(type_: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: None,
            message: None,
            last_transition_time: None,
        }
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Find a condition by type
pub fn find_condition<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

/// Objects carrying [`ObjectMeta`]
pub trait HasMetadata {
    /// Borrow the metadata
    fn metadata(&self) -> &ObjectMeta;
    /// Mutably borrow the metadata
    fn metadata_mut(&mut self) -> &mut ObjectMeta;
}

/// Objects carrying status conditions
pub trait HasConditions {
    /// Borrow the conditions
    fn conditions(&self) -> &Vec<Condition>;
    /// Mutably borrow the conditions
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;
}

/// Any resource kind, usable as a trait object
pub trait Resource: HasMetadata + AsAny + Send + Sync {
    /// Kind name
    fn kind(&self) -> &'static str;
}

/// Spec of a [`Space`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceSpec {
    /// Tier the space is provisioned from
    pub tier_name: String,
    /// Cluster the space should land on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cluster: Option<String>,
}

/// Status of a [`Space`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceStatus {
    /// Cluster the space landed on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cluster: Option<String>,
    /// Namespaces provisioned for the space
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provisioned_namespaces: Vec<String>,
    /// Status conditions
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// A tenant space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Space {
    /// Metadata
    pub metadata: ObjectMeta,
    /// Desired state
    pub spec: SpaceSpec,
    /// Observed state
    #[serde(default)]
    pub status: SpaceStatus,
}

/// Spec of a [`UserSignup`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSignupSpec {
    /// Requested user name
    pub username: String,
    /// Whether the signup has been approved
    #[serde(default)]
    pub approved: bool,
}

/// Status of a [`UserSignup`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSignupStatus {
    /// User name after sanitisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliant_username: Option<String>,
    /// Status conditions
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// A user signup request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSignup {
    /// Metadata
    pub metadata: ObjectMeta,
    /// Desired state
    pub spec: UserSignupSpec,
    /// Observed state
    #[serde(default)]
    pub status: UserSignupStatus,
}

macro_rules! impl_resource {
    ($kind:ident) => {
        impl HasMetadata for $kind {
            fn metadata(&self) -> &ObjectMeta {
                &self.metadata
            }

            fn metadata_mut(&mut self) -> &mut ObjectMeta {
                &mut self.metadata
            }
        }

        impl HasConditions for $kind {
            fn conditions(&self) -> &Vec<Condition> {
                &self.status.conditions
            }

            fn conditions_mut(&mut self) -> &mut Vec<Condition> {
                &mut self.status.conditions
            }
        }

        impl Keyed for $kind {
            fn object_key(&self) -> ObjectKey {
                self.metadata.key()
            }
        }

        impl Resource for $kind {
            fn kind(&self) -> &'static str {
                stringify!($kind)
            }
        }
    };
}

impl_resource!(Space);
impl_resource!(UserSignup);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_space_serialises_camel_case() {
        let mut space = Space {
            metadata: ObjectMeta::namespaced("toolchain", "john"),
            ..Default::default()
        };
        space.spec.tier_name = "base".to_string();
        space.status.conditions.push(Condition::new("Ready", ConditionStatus::True));

        let value = serde_json::to_value(&space).expect("serialises");
        assert_eq!(
            value,
            json!({
                "metadata": {"name": "john", "namespace": "toolchain", "generation": 0},
                "spec": {"tierName": "base"},
                "status": {"conditions": [{"type": "Ready", "status": "True"}]}
            })
        );
    }

    #[test]
    fn test_resource_trait_object() {
        let signup: Box<dyn Resource> = Box::new(UserSignup {
            metadata: ObjectMeta::namespaced("toolchain", "jane"),
            ..Default::default()
        });

        assert_eq!(signup.kind(), "UserSignup");
        assert_eq!(signup.metadata().key(), ObjectKey::new("toolchain", "jane"));
        assert!((*signup).as_any().downcast_ref::<UserSignup>().is_some());
    }
}
