//! Assertions over status conditions.

use converge_core::{convert_with_lens, Assertion, AssertionFixer, EmbeddableAssertions, FailureSink, Lifted};

use crate::resources::{find_condition, Condition, ConditionStatus, HasConditions};

/// A condition of the given type is present, whatever its status
#[derive(Debug, Clone, PartialEq)]
pub struct HasConditionType(pub String);

impl Assertion<Vec<Condition>> for HasConditionType {
    fn test(&self, sink: &mut dyn FailureSink, obj: &Vec<Condition>) {
        if find_condition(obj, &self.0).is_none() {
            sink.error(format!("missing condition '{}'", self.0));
        }
    }

    fn describe(&self) -> String {
        format!("condition {} present", self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<Vec<Condition>>> {
        Some(self)
    }
}

impl AssertionFixer<Vec<Condition>> for HasConditionType {
    fn adapt_to_match(&self, obj: &mut Vec<Condition>) {
        if find_condition(obj, &self.0).is_none() {
            obj.push(Condition::new(self.0.clone(), ConditionStatus::Unknown));
        }
    }
}

/// A condition has the given status, and optionally the given reason
#[derive(Debug, Clone, PartialEq)]
pub struct HasCondition {
    /// Condition type
    pub type_: String,
    /// Expected status
    pub status: ConditionStatus,
    /// Expected reason, unchecked when `None`
    pub reason: Option<String>,
}

impl Assertion<Vec<Condition>> for HasCondition {
    fn test(&self, sink: &mut dyn FailureSink, obj: &Vec<Condition>) {
        let Some(condition) = find_condition(obj, &self.type_) else {
            sink.error(format!("missing condition '{}'", self.type_));
            return;
        };
        if condition.status != self.status {
            sink.error(format!(
                "expected condition '{}' to be {}, got {}",
                self.type_, self.status, condition.status
            ));
        }
        if let Some(reason) = &self.reason {
            if condition.reason.as_ref() != Some(reason) {
                sink.error(format!(
                    "expected condition '{}' reason '{}', got '{}'",
                    self.type_,
                    reason,
                    condition.reason.as_deref().unwrap_or_default()
                ));
            }
        }
    }

    fn describe(&self) -> String {
        match &self.reason {
            Some(reason) => format!("condition {}={} ({})", self.type_, self.status, reason),
            None => format!("condition {}={}", self.type_, self.status),
        }
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<Vec<Condition>>> {
        Some(self)
    }
}

impl AssertionFixer<Vec<Condition>> for HasCondition {
    fn adapt_to_match(&self, obj: &mut Vec<Condition>) {
        let index = match obj.iter().position(|c| c.type_ == self.type_) {
            Some(index) => index,
            None => {
                obj.push(Condition::new(self.type_.clone(), self.status));
                obj.len() - 1
            }
        };
        let condition = &mut obj[index];
        condition.status = self.status;
        if let Some(reason) = &self.reason {
            condition.reason = Some(reason.clone());
        }
    }
}

/// No condition of the given type is present
#[derive(Debug, Clone, PartialEq)]
pub struct LacksCondition(pub String);

impl Assertion<Vec<Condition>> for LacksCondition {
    fn test(&self, sink: &mut dyn FailureSink, obj: &Vec<Condition>) {
        if let Some(condition) = find_condition(obj, &self.0) {
            sink.error(format!(
                "expected no condition '{}', got status {}",
                self.0, condition.status
            ));
        }
    }

    fn describe(&self) -> String {
        format!("no condition {}", self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<Vec<Condition>>> {
        Some(self)
    }
}

impl AssertionFixer<Vec<Condition>> for LacksCondition {
    fn adapt_to_match(&self, obj: &mut Vec<Condition>) {
        obj.retain(|c| c.type_ != self.0);
    }
}

/// Lift a condition assertion onto any kind carrying conditions
pub fn on_conditions<T>(assertion: impl Assertion<Vec<Condition>> + 'static) -> Lifted<Vec<Condition>, T>
where
    T: HasConditions + ?Sized + 'static,
{
    convert_with_lens(
        |obj: &T| Some(obj.conditions()),
        |obj: &mut T| Some(obj.conditions_mut()),
        assertion,
    )
}

/// Conditions mixin, mounted with `FluentAssertions::embed`.
pub struct ConditionsAssertions<S, T: ?Sized> {
    inner: EmbeddableAssertions<S, T>,
}

impl<S, T: ?Sized> From<EmbeddableAssertions<S, T>> for ConditionsAssertions<S, T> {
    fn from(inner: EmbeddableAssertions<S, T>) -> Self {
        Self { inner }
    }
}

impl<S, T> ConditionsAssertions<S, T>
where
    T: HasConditions + ?Sized + 'static,
{
    fn lift(self, assertion: impl Assertion<Vec<Condition>> + 'static) -> S {
        self.inner.then(on_conditions::<T>(assertion))
    }

    /// Expect a condition of this type to exist
    pub fn has_condition_type(self, type_: impl Into<String>) -> S {
        self.lift(HasConditionType(type_.into()))
    }

    /// Expect a condition with the given status
    pub fn has_condition(self, type_: impl Into<String>, status: ConditionStatus) -> S {
        self.lift(HasCondition {
            type_: type_.into(),
            status,
            reason: None,
        })
    }

    /// Expect a condition with the given status and reason
    pub fn has_condition_with_reason(
        self,
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
    ) -> S {
        self.lift(HasCondition {
            type_: type_.into(),
            status,
            reason: Some(reason.into()),
        })
    }

    /// Expect no condition of this type
    pub fn lacks_condition(self, type_: impl Into<String>) -> S {
        self.lift(LacksCondition(type_.into()))
    }

    /// Shorthand for `Ready=True`
    pub fn is_ready(self) -> S {
        self.has_condition("Ready", ConditionStatus::True)
    }
}
