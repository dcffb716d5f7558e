//! # Override Model
//!
//! Caller-supplied values that preempt generation. Each entry is tagged at
//! the API boundary as a scalar, a nested override map, or an existing
//! instance — the resolver never has to sniff the shape of an untyped value
//! to decide what it was given.

use indexmap::IndexMap;

use crate::instance::Instance;
use crate::value::Value;

/// Overrides for one build call, keyed by attribute or relationship name.
pub type OverrideMap = IndexMap<String, Override>;

/// A single override entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    /// An explicit scalar for an attribute (or a raw identifier for a
    /// foreign-key attribute).
    Value(Value),
    /// A nested override map, resolved recursively against the relationship's
    /// target model.
    Nested(OverrideMap),
    /// An already-persisted instance of the target model; reused as-is, no
    /// new row is created for it.
    Instance(Instance),
}

impl Override {
    pub fn value(value: impl Into<Value>) -> Self {
        Override::Value(value.into())
    }

    pub fn nested(map: OverrideMap) -> Self {
        Override::Nested(map)
    }

    pub fn instance(instance: Instance) -> Self {
        Override::Instance(instance)
    }

    /// Human-readable description of the entry kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Override::Value(_) => "a scalar value",
            Override::Nested(_) => "a nested override map",
            Override::Instance(_) => "an instance",
        }
    }
}

impl From<Value> for Override {
    fn from(value: Value) -> Self {
        Override::Value(value)
    }
}

impl From<OverrideMap> for Override {
    fn from(map: OverrideMap) -> Self {
        Override::Nested(map)
    }
}

impl From<Instance> for Override {
    fn from(instance: Instance) -> Self {
        Override::Instance(instance)
    }
}
