//! # Error Types
//!
//! Defines `FixtureError`, the unified error enum for every failure mode in
//! a fixture build. Every variant carries enough context (model name,
//! attribute name, offending rule) to debug without digging through logs.
//!
//! All errors are terminal to the build that raised them: nothing is
//! retried, and rows persisted by earlier steps of a failed cascade are left
//! in place.

use thiserror::Error;

/// All errors that can occur while resolving or persisting a fixture.
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("fixturekit does not currently support generating values for type {type_name} (attribute `{attribute}`)")]
    UnsupportedType {
        type_name: String,
        attribute: String,
    },

    #[error("fixturekit does not currently support the `{rule}` validator (attribute `{attribute}`)")]
    UnsupportedValidator { rule: String, attribute: String },

    #[error("You need to supply a `{target}` instance or a nested override map under `{relationship}` on `{model}`, not a raw identifier.\n  To pre-resolve by identifier, put the value under the foreign-key attribute instead")]
    InvalidAssociationOverride {
        model: String,
        relationship: String,
        target: String,
    },

    #[error("`{key}` does not match any attribute or relationship declared on `{model}`")]
    UnknownAssociation { model: String, key: String },

    #[error("expected a scalar value for attribute `{attribute}` on `{model}`, got {found}")]
    InvalidScalarOverride {
        model: String,
        attribute: String,
        found: &'static str,
    },

    #[error("instance of `{model}` has no identifier; only persisted instances can back a relationship override")]
    MissingIdentifier { model: String },

    #[error("Database connection failed: {source}")]
    Connection {
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to sync table for `{model}`: {source}")]
    Sync {
        model: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Insert into `{model}` failed\n  SQL: {sql_preview}\n  DB error: {source}")]
    InsertFailed {
        model: String,
        sql_preview: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Lookup on `{model}` failed: {source}")]
    LookupFailed {
        model: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to decode column `{column}` of `{model}`: {source}")]
    Decode {
        model: String,
        column: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FixtureError>;
