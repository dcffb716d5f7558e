//! # SQLite Store
//!
//! Persistence bridge over a live SQLite database via sqlx. Rows are
//! inserted as literal-SQL `INSERT ... RETURNING *` statements and decoded
//! back into instances by the declared attribute types. `sync` synthesizes
//! the table DDL from a descriptor so tests can stand up a schema without
//! hand-written migrations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{FixtureError, Result};
use crate::instance::Instance;
use crate::schema::{FieldType, ModelDescriptor};
use crate::store::Store;
use crate::value::Value;

/// SQLite-backed persistence bridge.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to a SQLite database.
    ///
    /// The pool is capped at one connection so `sqlite::memory:` databases
    /// keep a single shared handle instead of one empty database per
    /// connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| FixtureError::Connection { source: e })?;
        Ok(Self { pool })
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Drop and re-create the table for a model from its descriptor.
    pub async fn sync(&self, model: &ModelDescriptor) -> Result<()> {
        let drop_sql = format!("DROP TABLE IF EXISTS {}", quote_identifier(&model.name));
        sqlx::query(&drop_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| FixtureError::Sync {
                model: model.name.clone(),
                source: e,
            })?;

        let create_sql = create_table_sql(model);
        sqlx::query(&create_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| FixtureError::Sync {
                model: model.name.clone(),
                source: e,
            })?;
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn create(
        &self,
        model: &Arc<ModelDescriptor>,
        values: &IndexMap<String, Value>,
    ) -> Result<Instance> {
        let mut row_values = values.clone();

        // SQLite assigns integer keys through the rowid; UUID keys have no
        // engine-side default, so the store assigns them here.
        if !row_values.contains_key(&model.primary_key) {
            let pk_type = model
                .attributes
                .get(&model.primary_key)
                .map(|attr| attr.field_type);
            if pk_type == Some(FieldType::Uuid) {
                row_values.insert(model.primary_key.clone(), Value::Uuid(Uuid::new_v4()));
            }
        }

        let sql = if row_values.is_empty() {
            format!(
                "INSERT INTO {} DEFAULT VALUES RETURNING *",
                quote_identifier(&model.name)
            )
        } else {
            let columns = row_values
                .keys()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ");
            let literals = row_values
                .values()
                .map(Value::to_sql_literal)
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
                quote_identifier(&model.name),
                columns,
                literals
            )
        };

        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| FixtureError::InsertFailed {
                model: model.name.clone(),
                sql_preview: truncate_sql(&sql, 200),
                source: e,
            })?;

        decode_row(model, &row)
    }

    async fn find_one(
        &self,
        model: &Arc<ModelDescriptor>,
        id: &Value,
    ) -> Result<Option<Instance>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = {} LIMIT 1",
            quote_identifier(&model.name),
            quote_identifier(&model.primary_key),
            id.to_sql_literal()
        );

        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| FixtureError::LookupFailed {
                model: model.name.clone(),
                source: e,
            })?;

        row.map(|row| decode_row(model, &row)).transpose()
    }
}

/// Decode a fetched row into an instance using the declared attribute types.
/// NULL columns are omitted from the instance, mirroring the resolver's
/// absent-not-null convention.
fn decode_row(model: &Arc<ModelDescriptor>, row: &SqliteRow) -> Result<Instance> {
    let mut values = IndexMap::new();

    for (name, attr) in &model.attributes {
        let decode_err = |e: sqlx::Error| FixtureError::Decode {
            model: model.name.clone(),
            column: name.clone(),
            source: e,
        };

        let value = match attr.field_type {
            FieldType::Integer | FieldType::BigInt => row
                .try_get::<Option<i64>, _>(name.as_str())
                .map_err(decode_err)?
                .map(Value::Int),
            FieldType::Text | FieldType::LongText => row
                .try_get::<Option<String>, _>(name.as_str())
                .map_err(decode_err)?
                .map(Value::from),
            FieldType::DateTime => row
                .try_get::<Option<NaiveDateTime>, _>(name.as_str())
                .map_err(decode_err)?
                .map(Value::Timestamp),
            FieldType::Date => row
                .try_get::<Option<NaiveDate>, _>(name.as_str())
                .map_err(decode_err)?
                .map(Value::Date),
            FieldType::Uuid => row
                .try_get::<Option<String>, _>(name.as_str())
                .map_err(decode_err)?
                .map(|raw| {
                    Uuid::parse_str(&raw).map(Value::Uuid).map_err(|e| {
                        FixtureError::Other(format!(
                            "stored identifier `{}` on `{}` is not a UUID: {}",
                            raw, model.name, e
                        ))
                    })
                })
                .transpose()?,
            FieldType::Decimal => row
                .try_get::<Option<f64>, _>(name.as_str())
                .map_err(decode_err)?
                .map(Value::Float),
            FieldType::Boolean => row
                .try_get::<Option<bool>, _>(name.as_str())
                .map_err(decode_err)?
                .map(Value::Bool),
        };

        if let Some(value) = value {
            values.insert(name.clone(), value);
        }
    }

    Ok(Instance::new(model.clone(), values))
}

fn create_table_sql(model: &ModelDescriptor) -> String {
    let columns: Vec<String> = model
        .attributes
        .values()
        .map(|attr| {
            let mut def = format!(
                "{} {}",
                quote_identifier(&attr.name),
                sqlite_type(attr.field_type)
            );
            if attr.name == model.primary_key {
                def.push_str(" PRIMARY KEY");
                if attr.field_type == FieldType::Integer {
                    def.push_str(" AUTOINCREMENT");
                }
            } else if !attr.nullable {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect();

    format!(
        "CREATE TABLE {} ({})",
        quote_identifier(&model.name),
        columns.join(", ")
    )
}

fn sqlite_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Integer | FieldType::BigInt | FieldType::Boolean => "INTEGER",
        FieldType::Text
        | FieldType::LongText
        | FieldType::DateTime
        | FieldType::Date
        | FieldType::Uuid => "TEXT",
        FieldType::Decimal => "REAL",
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    if sql.len() <= max_len {
        sql.to_string()
    } else {
        format!("{}...", &sql[..max_len])
    }
}
