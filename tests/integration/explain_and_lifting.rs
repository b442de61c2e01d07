//! Collect-all evaluation, explanations and lifting across resource kinds.

use converge_core::{
    adapted_copy, assertion_fn, cast, convert, explain, resolve_key, Assertion, AssertionList, Collector,
    FailureSink, FluentAssertions, IdentityError, ObjectKey,
};
use converge_domain::{
    on_metadata, HasLabel, HasName, HasTier, InNamespace, ObjectMeta, Resource, Space, SpaceAssertions,
    UserSignupAssertions,
};
use converge_tests::fixtures::{ready, space, user_signup};
use pretty_assertions::assert_eq;

#[test]
fn test_every_failure_is_collected() {
    let list = SpaceAssertions::new()
        .metadata()
        .has_label("owner", "john")
        .has_tier("advanced")
        .has_target_cluster("member-1")
        .conditions()
        .is_ready()
        .build();

    let mut sink = Collector::new();
    list.test(&mut sink, &space("toolchain", "john", "base"));

    assert_eq!(
        sink.failures(),
        [
            "missing label 'owner'",
            "expected tier 'advanced', got 'base'",
            "expected target cluster 'member-1', none set",
            "missing condition 'Ready'",
        ]
    );
}

#[test]
fn test_explanation_lists_what_cannot_be_fixed() {
    let signup = user_signup("toolchain", "jane", "jane@example.com");
    let list = UserSignupAssertions::new()
        .metadata()
        .has_label("approved-by", "admin")
        .is_approved()
        .has_compliant_username("jane")
        .build();

    let explanation = explain(&signup, &list).expect("serialisable");

    assert_eq!(
        explanation.to_string(),
        [
            "+ metadata.labels: {\"approved-by\":\"admin\"}",
            "~ spec.approved: false -> true",
            "unexplained: compliant username is jane",
        ]
        .join("\n")
    );
}

#[test]
fn test_adapted_copy_passes_every_fixable_assertion() {
    let mut current = space("toolchain", "john", "base");
    current.status.conditions.push(ready("Provisioned"));
    let list = SpaceAssertions::new()
        .metadata()
        .has_name("jane")
        .metadata()
        .has_finalizer("finalizer.toolchain")
        .conditions()
        .lacks_condition("Ready")
        .has_tier("advanced")
        .build();

    let (adapted, unexplained) = adapted_copy(&current, &list);

    assert!(unexplained.is_empty());
    assert!(list.passes(&adapted));
    assert_eq!(current.metadata.name, "john");
    assert_eq!(current.status.conditions.len(), 1);
}

#[test]
fn test_identity_markers_survive_lifting() {
    let nested: AssertionList<ObjectMeta> = AssertionList::new()
        .with(InNamespace("toolchain".to_string()))
        .with(HasName("john".to_string()));
    let lifted = on_metadata::<Space>(nested);
    let twice = convert(|s: &Space| Some(s), lifted);

    let list = AssertionList::new().with(twice).with(HasTier("base".to_string()));

    assert_eq!(resolve_key(&list), Ok(ObjectKey::new("toolchain", "john")));
}

#[test]
fn test_conflicting_markers_are_ambiguous() {
    let list = SpaceAssertions::new()
        .metadata()
        .has_name("john")
        .metadata()
        .has_name("jane")
        .metadata()
        .in_namespace("toolchain")
        .build();

    assert_eq!(
        resolve_key(&list),
        Err(IdentityError::AmbiguousName(vec!["john".to_string(), "jane".to_string()]))
    );
}

#[test]
fn test_cast_from_resource_trait_object() {
    let tier: AssertionList<dyn Resource> = AssertionList::new()
        .with(cast::<Space, dyn Resource>(HasTier("base".to_string())))
        .with(on_metadata::<dyn Resource>(HasLabel {
            key: "tier".to_string(),
            value: "base".to_string(),
        }));

    let mut labelled = space("toolchain", "john", "base");
    labelled.metadata.labels.insert("tier".to_string(), "base".to_string());
    let as_space: Box<dyn Resource> = Box::new(labelled);
    assert!(tier.passes(&*as_space));

    let as_signup: Box<dyn Resource> = Box::new(user_signup("toolchain", "jane", "jane"));
    let mut sink = Collector::new();
    tier.test(&mut sink, &*as_signup);

    let err = sink.conversion_error().expect("a signup is not a space");
    assert_eq!(err.to, "Space");
    assert_eq!(err.from, "dyn Resource");
    assert_eq!(err.assertion, "tier is base");
    assert_eq!(sink.failures().len(), 2);
    assert_eq!(sink.failures()[1], "missing label 'tier'");
}

#[test]
fn test_lifted_metadata_list_keeps_partial_explanation() {
    let metadata: AssertionList<ObjectMeta> = AssertionList::new()
        .with(HasLabel {
            key: "owner".to_string(),
            value: "john".to_string(),
        })
        .with(assertion_fn("created by the operator", |_: &mut dyn FailureSink, _: &ObjectMeta| {}));
    let list = AssertionList::new().with(on_metadata::<Space>(metadata));

    let explanation = explain(&space("toolchain", "john", "base"), &list).expect("serialisable");

    assert_eq!(
        explanation.to_string(),
        "+ metadata.labels: {\"owner\":\"john\"}\nunexplained: created by the operator"
    );
}

#[test]
fn test_conflict_inside_lifted_list_is_ambiguous() {
    let conflicting: AssertionList<ObjectMeta> = AssertionList::new()
        .with(HasName("john".to_string()))
        .with(HasName("jane".to_string()));
    let list = AssertionList::new()
        .with(on_metadata::<Space>(InNamespace("toolchain".to_string())))
        .with(on_metadata::<Space>(HasName("john".to_string())))
        .with(on_metadata::<Space>(conflicting));

    assert_eq!(
        resolve_key(&list),
        Err(IdentityError::AmbiguousName(vec!["john".to_string(), "jane".to_string()]))
    );
}
