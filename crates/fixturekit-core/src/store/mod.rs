//! # Persistence Bridge
//!
//! The storage collaborator behind fixture builds. The resolver only ever
//! needs two operations: insert a resolved value map and get back the stored
//! row with its identifier populated, and look a row up by identifier for
//! the raw-identifier attachment convenience path.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::Result;
use crate::instance::Instance;
use crate::schema::ModelDescriptor;
use crate::value::Value;

/// Storage operations consumed by the fixture resolver.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert one row for `model` and return the stored instance with its
    /// identifier populated.
    async fn create(
        &self,
        model: &Arc<ModelDescriptor>,
        values: &IndexMap<String, Value>,
    ) -> Result<Instance>;

    /// Fetch one row of `model` by primary-key value.
    async fn find_one(
        &self,
        model: &Arc<ModelDescriptor>,
        id: &Value,
    ) -> Result<Option<Instance>>;
}

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
