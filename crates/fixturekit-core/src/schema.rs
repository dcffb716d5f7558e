//! # Model Descriptors
//!
//! Static declarations of the entities fixtures are built for: attributes
//! with their types, nullability, defaults and validation rules, plus the
//! relationships backing foreign-key attributes. Descriptors are read-only
//! to the resolver and shared via `Arc` so a relationship can point at its
//! target model.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

/// A named entity type: ordered attributes plus declared relationships.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub name: String,
    /// Attributes in declaration order.
    pub attributes: IndexMap<String, Attribute>,
    /// Relationships keyed by relationship name.
    pub relationships: IndexMap<String, Relationship>,
    /// Name of the identifier attribute. Assigned by the store, never generated.
    pub primary_key: String,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
            primary_key: primary_key.into(),
        }
    }

    /// The relationship backed by the given foreign-key attribute, if any.
    ///
    /// An attribute is a foreign key exactly when one declared relationship
    /// names it as its key.
    pub fn relationship_by_fk(&self, attribute: &str) -> Option<&Relationship> {
        self.relationships
            .values()
            .find(|rel| rel.foreign_key == attribute)
    }

    /// A relationship is required when its foreign-key attribute is
    /// non-nullable.
    pub fn relationship_required(&self, rel: &Relationship) -> bool {
        self.attributes
            .get(&rel.foreign_key)
            .map(|attr| !attr.nullable)
            .unwrap_or(false)
    }
}

/// A scalar field of a model.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub default: Option<Value>,
    pub max_length: Option<u32>,
    pub validators: Vec<Validator>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
            default: None,
            max_length: None,
            validators: Vec::new(),
        }
    }
}

/// A declared reference from one model to another, backed by a foreign-key
/// attribute on the owning model.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub name: String,
    pub foreign_key: String,
    pub target: Arc<ModelDescriptor>,
}

impl Relationship {
    pub fn new(
        name: impl Into<String>,
        foreign_key: impl Into<String>,
        target: Arc<ModelDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            foreign_key: foreign_key.into(),
            target,
        }
    }
}

/// Closed enumeration of declarable attribute types.
///
/// Only a subset has registered generators (see `generate`); the rest exist
/// so descriptors can declare identifier and defaulted columns, and so that
/// asking to generate one fails loudly instead of silently falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    BigInt,
    /// Short, bounded text (varchar-style).
    Text,
    /// Unbounded text.
    LongText,
    DateTime,
    Date,
    Uuid,
    Decimal,
    Boolean,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "INTEGER"),
            FieldType::BigInt => write!(f, "BIGINT"),
            FieldType::Text => write!(f, "STRING"),
            FieldType::LongText => write!(f, "TEXT"),
            FieldType::DateTime => write!(f, "DATETIME"),
            FieldType::Date => write!(f, "DATE"),
            FieldType::Uuid => write!(f, "UUID"),
            FieldType::Decimal => write!(f, "DECIMAL"),
            FieldType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// Validation rules the generator knows how to satisfy, plus a carrier for
/// anything else a schema may declare. Generating against `Other` is a hard
/// error: silently producing invalid data would be worse than failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    Email,
    Ip,
    Ipv4,
    Ipv6,
    CreditCard,
    Other(String),
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Email => write!(f, "isEmail"),
            Validator::Ip => write!(f, "isIP"),
            Validator::Ipv4 => write!(f, "isIPv4"),
            Validator::Ipv6 => write!(f, "isIPv6"),
            Validator::CreditCard => write!(f, "isCreditCard"),
            Validator::Other(rule) => write!(f, "{}", rule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_lookup_finds_owning_relationship() {
        let target = Arc::new(ModelDescriptor::new("users", "id"));
        let mut model = ModelDescriptor::new("accounts", "id");

        let mut user_id = Attribute::new("user_id", FieldType::Integer);
        user_id.nullable = false;
        model.attributes.insert("user_id".to_string(), user_id);
        model.relationships.insert(
            "user".to_string(),
            Relationship::new("user", "user_id", target),
        );

        let rel = model.relationship_by_fk("user_id").expect("fk backed");
        assert_eq!(rel.name, "user");
        assert!(model.relationship_required(rel));
        assert!(model.relationship_by_fk("name").is_none());
    }

    #[test]
    fn nullable_foreign_key_makes_relationship_optional() {
        let target = Arc::new(ModelDescriptor::new("users", "id"));
        let mut model = ModelDescriptor::new("accounts", "id");
        model
            .attributes
            .insert("manager_id".to_string(), Attribute::new("manager_id", FieldType::Integer));
        model.relationships.insert(
            "manager".to_string(),
            Relationship::new("manager", "manager_id", target),
        );

        let rel = model.relationships.get("manager").unwrap();
        assert!(!model.relationship_required(rel));
    }
}
