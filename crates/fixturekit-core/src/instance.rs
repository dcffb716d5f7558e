use std::sync::Arc;

use indexmap::IndexMap;

use crate::schema::ModelDescriptor;
use crate::value::Value;

/// A persisted row: the stored attribute values plus in-memory relationship
/// slots.
///
/// `related` is populated by the post-persistence hydration step in `build`:
/// the store's own `create` only returns row data, so resolved related
/// instances are re-attached here under their relationship names.
#[derive(Debug, Clone)]
pub struct Instance {
    pub model: Arc<ModelDescriptor>,
    pub values: IndexMap<String, Value>,
    pub related: IndexMap<String, Instance>,
}

impl Instance {
    pub fn new(model: Arc<ModelDescriptor>, values: IndexMap<String, Value>) -> Self {
        Self {
            model,
            values,
            related: IndexMap::new(),
        }
    }

    /// The value of the named attribute, if present on the stored row.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// The primary-key value assigned by the store.
    pub fn id(&self) -> Option<&Value> {
        self.values.get(&self.model.primary_key)
    }

    /// The related instance attached under the given relationship name.
    pub fn related(&self, relationship: &str) -> Option<&Instance> {
        self.related.get(relationship)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.model.name == other.model.name
            && self.values == other.values
            && self.related == other.related
    }
}
