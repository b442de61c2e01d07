//! # Converge Domain
//!
//! Ready-made assertion packages for resource kinds: metadata and condition
//! mixins that mount on any kind, and fluent builders for [`Space`] and
//! [`UserSignup`].
//!
//! ```ignore
//! let assertions = SpaceAssertions::new()
//!     .metadata().in_namespace("toolchain")
//!     .metadata().has_name("john")
//!     .conditions().is_ready()
//!     .has_tier("base")
//!     .build();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Condition assertions and their mixin
pub mod conditions;

/// Metadata assertions and their mixin
pub mod metadata;

/// Resource model
pub mod resources;

/// Space builder
pub mod space;

/// UserSignup builder
pub mod user_signup;

pub use conditions::{on_conditions, ConditionsAssertions, HasCondition, HasConditionType, LacksCondition};
pub use metadata::{
    on_metadata, HasAnnotation, HasFinalizer, HasLabel, HasName, InNamespace, LacksLabel, MetadataAssertions,
};
pub use resources::{
    find_condition, Condition, ConditionStatus, HasConditions, HasMetadata, ObjectMeta, Resource, Space, SpaceSpec,
    SpaceStatus, UserSignup, UserSignupSpec, UserSignupStatus,
};
pub use space::{HasTargetCluster, HasTier, SpaceAssertions};
pub use user_signup::{HasUsername, IsApproved, UserSignupAssertions};
