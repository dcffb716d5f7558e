//! # In-Memory Store
//!
//! A process-local persistence bridge: one table of rows per model name,
//! sequential integer identifiers (UUID identifiers assigned for UUID-keyed
//! models). Backs the unit and integration tests, and any caller who wants
//! fixtures without a database.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::Result;
use crate::instance::Instance;
use crate::schema::{FieldType, ModelDescriptor};
use crate::store::Store;
use crate::value::Value;

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Instance>>,
    next_ids: HashMap<String, i64>,
}

/// In-memory persistence bridge.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows for a model.
    pub fn count(&self, model: &ModelDescriptor) -> usize {
        let tables = self.tables.lock().expect("store poisoned");
        tables.rows.get(&model.name).map(Vec::len).unwrap_or(0)
    }

    /// All stored rows of `model` whose `column` equals `value`. Test-side
    /// stand-in for the filtered queries a live database would serve.
    pub fn find_where(
        &self,
        model: &ModelDescriptor,
        column: &str,
        value: &Value,
    ) -> Vec<Instance> {
        let tables = self.tables.lock().expect("store poisoned");
        tables
            .rows
            .get(&model.name)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.get(column) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create(
        &self,
        model: &Arc<ModelDescriptor>,
        values: &IndexMap<String, Value>,
    ) -> Result<Instance> {
        let mut stored = values.clone();

        if !stored.contains_key(&model.primary_key) {
            let id = match model.attributes.get(&model.primary_key).map(|a| a.field_type) {
                Some(FieldType::Uuid) => Value::Uuid(Uuid::new_v4()),
                _ => {
                    let mut tables = self.tables.lock().expect("store poisoned");
                    let next = tables.next_ids.entry(model.name.clone()).or_insert(0);
                    *next += 1;
                    Value::Int(*next)
                }
            };
            stored.insert(model.primary_key.clone(), id);
        }

        let instance = Instance::new(model.clone(), stored);
        let mut tables = self.tables.lock().expect("store poisoned");
        tables
            .rows
            .entry(model.name.clone())
            .or_default()
            .push(instance.clone());
        Ok(instance)
    }

    async fn find_one(
        &self,
        model: &Arc<ModelDescriptor>,
        id: &Value,
    ) -> Result<Option<Instance>> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables
            .rows
            .get(&model.name)
            .and_then(|rows| rows.iter().find(|row| row.id() == Some(id)).cloned()))
    }
}
