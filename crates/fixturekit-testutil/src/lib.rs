//! Shared model descriptors for fixturekit tests: a three-level
//! `users` ← `accounts` ← `wallets` hierarchy plus validator-heavy models.

use std::sync::Arc;

use fixturekit_core::schema::{Attribute, FieldType, ModelDescriptor, Relationship, Validator};
use fixturekit_core::value::Value;

/// `users`: integer key, one required text field, a spread of nullable
/// fields (including a bounded 3-character one and soft-delete style
/// timestamps).
pub fn user_model() -> Arc<ModelDescriptor> {
    let mut model = ModelDescriptor::new("users", "id");

    let mut id = Attribute::new("id", FieldType::Integer);
    id.nullable = false;
    model.attributes.insert("id".to_string(), id);

    let mut username = Attribute::new("username", FieldType::Text);
    username.nullable = false;
    model.attributes.insert("username".to_string(), username);

    model
        .attributes
        .insert("email".to_string(), Attribute::new("email", FieldType::Text));

    model.attributes.insert(
        "date_of_birth".to_string(),
        Attribute::new("date_of_birth", FieldType::DateTime),
    );

    let mut initials = Attribute::new("initials", FieldType::Text);
    initials.max_length = Some(3);
    model.attributes.insert("initials".to_string(), initials);

    model.attributes.insert(
        "created_at".to_string(),
        Attribute::new("created_at", FieldType::DateTime),
    );
    model.attributes.insert(
        "updated_at".to_string(),
        Attribute::new("updated_at", FieldType::DateTime),
    );
    model.attributes.insert(
        "deleted_at".to_string(),
        Attribute::new("deleted_at", FieldType::DateTime),
    );

    Arc::new(model)
}

/// `accounts`: required `user` relationship plus an optional `manager`
/// relationship, both targeting `users`.
pub fn account_model(user: Arc<ModelDescriptor>) -> Arc<ModelDescriptor> {
    let mut model = ModelDescriptor::new("accounts", "id");

    let mut id = Attribute::new("id", FieldType::Integer);
    id.nullable = false;
    model.attributes.insert("id".to_string(), id);

    let mut name = Attribute::new("name", FieldType::Text);
    name.nullable = false;
    model.attributes.insert("name".to_string(), name);

    let mut user_id = Attribute::new("user_id", FieldType::Integer);
    user_id.nullable = false;
    model.attributes.insert("user_id".to_string(), user_id);

    model.attributes.insert(
        "manager_id".to_string(),
        Attribute::new("manager_id", FieldType::Integer),
    );

    model.relationships.insert(
        "user".to_string(),
        Relationship::new("user", "user_id", user.clone()),
    );
    model.relationships.insert(
        "manager".to_string(),
        Relationship::new("manager", "manager_id", user),
    );

    Arc::new(model)
}

/// `wallets`: UUID key assigned by the store, required `account`
/// relationship, defaulted balance.
pub fn wallet_model(account: Arc<ModelDescriptor>) -> Arc<ModelDescriptor> {
    let mut model = ModelDescriptor::new("wallets", "id");

    let mut id = Attribute::new("id", FieldType::Uuid);
    id.nullable = false;
    model.attributes.insert("id".to_string(), id);

    let mut name = Attribute::new("name", FieldType::Text);
    name.nullable = false;
    model.attributes.insert("name".to_string(), name);

    let mut account_id = Attribute::new("account_id", FieldType::Integer);
    account_id.nullable = false;
    model.attributes.insert("account_id".to_string(), account_id);

    let mut balance = Attribute::new("balance", FieldType::Decimal);
    balance.nullable = false;
    balance.default = Some(Value::Float(0.0));
    model.attributes.insert("balance".to_string(), balance);

    model.relationships.insert(
        "account".to_string(),
        Relationship::new("account", "account_id", account),
    );

    Arc::new(model)
}

/// The full wired hierarchy: `(users, accounts, wallets)`.
pub fn fixture_models() -> (
    Arc<ModelDescriptor>,
    Arc<ModelDescriptor>,
    Arc<ModelDescriptor>,
) {
    let user = user_model();
    let account = account_model(user.clone());
    let wallet = wallet_model(account.clone());
    (user, account, wallet)
}

/// One string attribute per recognized validator, all required so a plain
/// build exercises every specialized generator.
pub fn validators_model() -> Arc<ModelDescriptor> {
    let mut model = ModelDescriptor::new("validated_fields", "id");

    let mut id = Attribute::new("id", FieldType::Integer);
    id.nullable = false;
    model.attributes.insert("id".to_string(), id);

    for (name, validator) in [
        ("email", Validator::Email),
        ("ip", Validator::Ip),
        ("ipv4", Validator::Ipv4),
        ("ipv6", Validator::Ipv6),
        ("credit_card", Validator::CreditCard),
    ] {
        let mut attr = Attribute::new(name, FieldType::Text);
        attr.nullable = false;
        attr.validators.push(validator);
        model.attributes.insert(name.to_string(), attr);
    }

    Arc::new(model)
}

/// A model declaring a validation rule the generator does not recognize.
pub fn unsupported_validator_model() -> Arc<ModelDescriptor> {
    let mut model = ModelDescriptor::new("unvalidatable_fields", "id");

    let mut id = Attribute::new("id", FieldType::Integer);
    id.nullable = false;
    model.attributes.insert("id".to_string(), id);

    let mut random = Attribute::new("random", FieldType::Text);
    random.nullable = false;
    random.validators.push(Validator::Other("isArray".to_string()));
    model.attributes.insert("random".to_string(), random);

    Arc::new(model)
}
