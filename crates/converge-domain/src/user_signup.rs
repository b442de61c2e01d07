//! Fluent assertions for [`UserSignup`].

use converge_core::{shared_list, Assertion, AssertionFixer, FailureSink, FluentAssertions, SharedAssertions};

use crate::conditions::ConditionsAssertions;
use crate::metadata::MetadataAssertions;
use crate::resources::UserSignup;

/// The signup requests the given user name
#[derive(Debug, Clone, PartialEq)]
pub struct HasUsername(pub String);

impl Assertion<UserSignup> for HasUsername {
    fn test(&self, sink: &mut dyn FailureSink, obj: &UserSignup) {
        if obj.spec.username != self.0 {
            sink.error(format!("expected username '{}', got '{}'", self.0, obj.spec.username));
        }
    }

    fn describe(&self) -> String {
        format!("username is {}", self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<UserSignup>> {
        Some(self)
    }
}

impl AssertionFixer<UserSignup> for HasUsername {
    fn adapt_to_match(&self, obj: &mut UserSignup) {
        obj.spec.username = self.0.clone();
    }
}

/// The signup approval flag has the given value
#[derive(Debug, Clone, PartialEq)]
pub struct IsApproved(pub bool);

impl Assertion<UserSignup> for IsApproved {
    fn test(&self, sink: &mut dyn FailureSink, obj: &UserSignup) {
        if obj.spec.approved != self.0 {
            sink.error(format!("expected approved {}, got {}", self.0, obj.spec.approved));
        }
    }

    fn describe(&self) -> String {
        format!("approved is {}", self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<UserSignup>> {
        Some(self)
    }
}

impl AssertionFixer<UserSignup> for IsApproved {
    fn adapt_to_match(&self, obj: &mut UserSignup) {
        obj.spec.approved = self.0;
    }
}

/// Builder of assertions on a [`UserSignup`].
#[derive(Clone)]
pub struct UserSignupAssertions {
    list: SharedAssertions<UserSignup>,
}

impl UserSignupAssertions {
    /// Start an empty chain
    pub fn new() -> Self {
        Self { list: shared_list() }
    }

    /// Metadata assertions
    pub fn metadata(self) -> MetadataAssertions<Self, UserSignup> {
        self.embed()
    }

    /// Condition assertions
    pub fn conditions(self) -> ConditionsAssertions<Self, UserSignup> {
        self.embed()
    }

    /// Expect the given user name
    pub fn has_username(self, username: impl Into<String>) -> Self {
        self.satisfies(HasUsername(username.into()))
    }

    /// Expect the signup to be approved
    pub fn is_approved(self) -> Self {
        self.satisfies(IsApproved(true))
    }

    /// Expect the signup not to be approved
    pub fn is_not_approved(self) -> Self {
        self.satisfies(IsApproved(false))
    }

    /// Expect the sanitised user name in the status
    pub fn has_compliant_username(self, username: impl Into<String>) -> Self {
        let expected = username.into();
        self.satisfies_fn(
            format!("compliant username is {}", expected),
            move |sink: &mut dyn FailureSink, obj: &UserSignup| {
                match obj.status.compliant_username.as_deref() {
                    Some(actual) if actual == expected => {}
                    Some(actual) => sink.error(format!(
                        "expected compliant username '{}', got '{}'",
                        expected, actual
                    )),
                    None => sink.error(format!("expected compliant username '{}', none set", expected)),
                }
            },
        )
    }
}

impl Default for UserSignupAssertions {
    fn default() -> Self {
        Self::new()
    }
}

impl FluentAssertions<UserSignup> for UserSignupAssertions {
    fn shared(&self) -> &SharedAssertions<UserSignup> {
        &self.list
    }
}
