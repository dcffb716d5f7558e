pub mod build;
pub mod error;
pub mod generate;
pub mod instance;
pub mod overrides;
pub mod schema;
pub mod store;
pub mod value;

// Re-export key types for convenience
pub use build::{build, resolve, BuildOptions, FillPolicy, ResolvedValues};
pub use error::{FixtureError, Result};
pub use instance::Instance;
pub use overrides::{Override, OverrideMap};
pub use schema::{Attribute, FieldType, ModelDescriptor, Relationship, Validator};
pub use store::{MemoryStore, SqliteStore, Store};
pub use value::Value;
