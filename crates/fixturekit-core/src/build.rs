//! # Fixture Resolver
//!
//! The recursive association-resolution algorithm. `resolve` walks a model's
//! declared attributes in order and produces a fully-populated value map;
//! `build` persists that map through the store and re-attaches the resolved
//! related instances onto the returned row.
//!
//! Every relationship that gets resolved here performs a real insert through
//! the store (unless an existing instance or raw identifier was supplied), so
//! one `build` call may cascade into several persisted rows. There is no
//! rollback on failure: rows persisted by earlier steps of a failed cascade
//! stay in the store.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::error::{FixtureError, Result};
use crate::generate::generate;
use crate::instance::Instance;
use crate::overrides::{Override, OverrideMap};
use crate::schema::{ModelDescriptor, Relationship};
use crate::store::Store;
use crate::value::Value;

/// Controls whether nullable attributes are populated when the caller did
/// not supply a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FillPolicy {
    /// Leave nullable attributes unset.
    #[default]
    Skip,
    /// Generate values for every nullable attribute.
    All,
    /// Generate values only for the named nullable attributes.
    Only(Vec<String>),
}

impl FillPolicy {
    fn includes(&self, attribute: &str) -> bool {
        match self {
            FillPolicy::Skip => false,
            FillPolicy::All => true,
            FillPolicy::Only(names) => names.iter().any(|n| n == attribute),
        }
    }
}

/// Options for one build call. Propagated unchanged into recursive child
/// builds so nested optional fields respect the same fill policy.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub fill_optional: FillPolicy,
}

impl BuildOptions {
    pub fn fill_all() -> Self {
        Self {
            fill_optional: FillPolicy::All,
        }
    }

    pub fn fill_only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fill_optional: FillPolicy::Only(names.into_iter().map(Into::into).collect()),
        }
    }
}

/// The output of `resolve`: a value map ready for persistence, plus the side
/// tables `build` needs for post-persistence hydration.
#[derive(Debug, Default)]
pub struct ResolvedValues {
    /// Attribute name to final scalar value. Attributes left unset by the
    /// fill policy are absent, not null.
    pub values: IndexMap<String, Value>,
    /// Relationship name to resolved instance, re-attached after persistence.
    pub related: IndexMap<String, Instance>,
    /// Relationship name to caller-supplied raw identifier; the related row
    /// is fetched and attached after persistence as a convenience.
    pub pending_fetches: IndexMap<String, Value>,
}

/// Build one persisted instance of `model`, recursively building required
/// related instances first.
///
/// Returns a boxed future so the resolver can recurse through it for nested
/// relationship builds.
pub fn build<'a>(
    store: &'a dyn Store,
    model: &'a Arc<ModelDescriptor>,
    overrides: &'a OverrideMap,
    options: &'a BuildOptions,
) -> BoxFuture<'a, Result<Instance>> {
    Box::pin(async move {
        let resolved = resolve(store, model, overrides, options).await?;
        let mut instance = store.create(model, &resolved.values).await?;

        // Hydration: the store's create only returns row data, so resolved
        // related instances are re-attached onto the in-memory slots.
        for (rel_name, related) in resolved.related {
            instance.related.insert(rel_name, related);
        }

        for (rel_name, id) in resolved.pending_fetches {
            let Some(rel) = model.relationships.get(&rel_name) else {
                continue;
            };
            match store.find_one(&rel.target, &id).await? {
                Some(found) => {
                    instance.related.insert(rel_name, found);
                }
                None => warn!(
                    model = %model.name,
                    relationship = %rel_name,
                    id = %id,
                    "supplied identifier does not match a stored row; leaving slot empty"
                ),
            }
        }

        Ok(instance)
    })
}

/// Resolve a fully-populated value map for `model` without persisting it.
///
/// The caller's override map is never mutated; resolution writes into a
/// fresh `ResolvedValues`, so the same overrides can be reused across
/// sibling builds.
pub async fn resolve(
    store: &dyn Store,
    model: &Arc<ModelDescriptor>,
    overrides: &OverrideMap,
    options: &BuildOptions,
) -> Result<ResolvedValues> {
    debug!(model = %model.name, "resolving fixture");

    // Reject override keys that match nothing on the model before any work
    // (or inserts) happen.
    for key in overrides.keys() {
        if !model.attributes.contains_key(key) && !model.relationships.contains_key(key) {
            return Err(FixtureError::UnknownAssociation {
                model: model.name.clone(),
                key: key.clone(),
            });
        }
    }

    let mut rng = StdRng::from_os_rng();
    let mut resolved = ResolvedValues::default();

    for (name, attr) in &model.attributes {
        if let Some(rel) = model.relationship_by_fk(name) {
            resolve_relationship(store, model, rel, overrides, options, &mut resolved).await?;
            continue;
        }

        // Plain attribute: explicit override wins over everything, including
        // the primary-key skip.
        if let Some(entry) = overrides.get(name) {
            match entry {
                Override::Value(value) => {
                    resolved.values.insert(name.clone(), value.clone());
                }
                other => {
                    return Err(FixtureError::InvalidScalarOverride {
                        model: model.name.clone(),
                        attribute: name.clone(),
                        found: other.kind(),
                    });
                }
            }
            continue;
        }

        // The store assigns identifiers.
        if *name == model.primary_key {
            continue;
        }

        if attr.nullable && !options.fill_optional.includes(name) {
            continue;
        }

        if let Some(default) = &attr.default {
            resolved.values.insert(name.clone(), default.clone());
            continue;
        }

        let value = generate(attr, &mut rng)?;
        resolved.values.insert(name.clone(), value);
    }

    Ok(resolved)
}

/// Resolve one foreign-key attribute through its relationship.
///
/// Overrides are consulted under the relationship name first; a raw scalar
/// there is a caller error, while the same scalar under the foreign-key
/// attribute name is accepted as a pre-resolved identifier.
async fn resolve_relationship(
    store: &dyn Store,
    model: &Arc<ModelDescriptor>,
    rel: &Relationship,
    overrides: &OverrideMap,
    options: &BuildOptions,
    resolved: &mut ResolvedValues,
) -> Result<()> {
    match overrides.get(&rel.name) {
        Some(Override::Instance(instance)) => {
            attach_existing(rel, instance, resolved)?;
        }
        Some(Override::Nested(nested)) => {
            build_child(store, rel, nested, options, resolved).await?;
        }
        Some(Override::Value(_)) => {
            return Err(FixtureError::InvalidAssociationOverride {
                model: model.name.clone(),
                relationship: rel.name.clone(),
                target: rel.target.name.clone(),
            });
        }
        None => match overrides.get(&rel.foreign_key) {
            // Pre-resolved by identifier: used as-is, no recursion; the row
            // is fetched and attached after persistence.
            Some(Override::Value(id)) => {
                resolved.values.insert(rel.foreign_key.clone(), id.clone());
                resolved
                    .pending_fetches
                    .insert(rel.name.clone(), id.clone());
            }
            Some(Override::Instance(instance)) => {
                attach_existing(rel, instance, resolved)?;
            }
            Some(other @ Override::Nested(_)) => {
                return Err(FixtureError::InvalidScalarOverride {
                    model: model.name.clone(),
                    attribute: rel.foreign_key.clone(),
                    found: other.kind(),
                });
            }
            None => {
                // Optional relationships are only built when asked for;
                // required ones always recurse.
                if model.relationship_required(rel) {
                    let empty = OverrideMap::new();
                    build_child(store, rel, &empty, options, resolved).await?;
                }
            }
        },
    }

    Ok(())
}

fn attach_existing(
    rel: &Relationship,
    instance: &Instance,
    resolved: &mut ResolvedValues,
) -> Result<()> {
    let id = instance
        .id()
        .cloned()
        .ok_or_else(|| FixtureError::MissingIdentifier {
            model: instance.model.name.clone(),
        })?;
    resolved.values.insert(rel.foreign_key.clone(), id);
    resolved.related.insert(rel.name.clone(), instance.clone());
    Ok(())
}

async fn build_child(
    store: &dyn Store,
    rel: &Relationship,
    overrides: &OverrideMap,
    options: &BuildOptions,
    resolved: &mut ResolvedValues,
) -> Result<()> {
    debug!(
        relationship = %rel.name,
        target = %rel.target.name,
        "building related instance"
    );
    let child = build(store, &rel.target, overrides, options).await?;
    let id = child
        .id()
        .cloned()
        .ok_or_else(|| FixtureError::MissingIdentifier {
            model: rel.target.name.clone(),
        })?;
    resolved.values.insert(rel.foreign_key.clone(), id);
    resolved.related.insert(rel.name.clone(), child);
    Ok(())
}
