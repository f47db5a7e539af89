//! Render skipping by composition
//!
//! Components decide whether new props warrant a render through an injected
//! `ShouldSkipUpdate` policy instead of inheriting the behaviour from a mixin.
//! `ShallowEqual` is the pure-render policy: props with the same keys and
//! identical top-level values skip the render.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

/// A single prop value
#[derive(Debug, Clone)]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(f64),
    Str(Arc<str>),
    /// Structured value compared by identity, not by content
    Shared(Arc<Value>),
}

impl PropValue {
    /// Top-level comparison: scalars by value, shared values by pointer
    pub fn shallow_eq(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Null, PropValue::Null) => true,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Number(a), PropValue::Number(b)) => a == b,
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Shared(a), PropValue::Shared(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PropValue::Null,
            Value::Bool(b) => PropValue::Bool(b),
            Value::Number(n) => n.as_f64().map_or(PropValue::Null, PropValue::Number),
            Value::String(s) => PropValue::Str(s.into()),
            other => PropValue::Shared(Arc::new(other)),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.into())
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

/// Component props keyed by name
pub type Props = BTreeMap<String, PropValue>;

/// Decides whether a component can skip rendering for new props
pub trait ShouldSkipUpdate<P> {
    fn should_skip_update(&self, prev: &P, next: &P) -> bool;
}

/// Never skips; every offer renders
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysUpdate;

impl<P> ShouldSkipUpdate<P> for AlwaysUpdate {
    fn should_skip_update(&self, _prev: &P, _next: &P) -> bool {
        false
    }
}

/// Skips when both prop sets are shallowly equal
#[derive(Debug, Clone, Copy, Default)]
pub struct ShallowEqual;

impl ShouldSkipUpdate<Props> for ShallowEqual {
    fn should_skip_update(&self, prev: &Props, next: &Props) -> bool {
        prev.len() == next.len()
            && prev
                .iter()
                .all(|(key, value)| next.get(key).is_some_and(|other| value.shallow_eq(other)))
    }
}

/// Tracks the last rendered props of a component and consults its policy
#[derive(Debug)]
pub struct UpdateGate<P, S = AlwaysUpdate> {
    policy: S,
    rendered: Option<P>,
}

impl<P, S: ShouldSkipUpdate<P>> UpdateGate<P, S> {
    pub fn new(policy: S) -> Self {
        Self {
            policy,
            rendered: None,
        }
    }

    /// Offer new props; returns true when the component must render them
    pub fn offer(&mut self, next: P) -> bool {
        if let Some(prev) = &self.rendered {
            if self.policy.should_skip_update(prev, &next) {
                return false;
            }
        }
        self.rendered = Some(next);
        true
    }

    /// Props of the last render
    pub fn rendered(&self) -> Option<&P> {
        self.rendered.as_ref()
    }
}
