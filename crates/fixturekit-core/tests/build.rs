//! Behavioral tests for the fixture resolver against the in-memory store,
//! covering defaults, fill policies, relationship resolution, overrides at
//! every depth, and the hard-error paths.

use fixturekit_core::{
    build, BuildOptions, FixtureError, MemoryStore, Override, OverrideMap, Value,
};
use fixturekit_testutil::{
    fixture_models, unsupported_validator_model, user_model, validators_model,
};
use indexmap::IndexMap;

fn over<const N: usize>(entries: [(&str, Override); N]) -> OverrideMap {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn none() -> OverrideMap {
    OverrideMap::new()
}

// --- just create ---------------------------------------------------------

#[tokio::test]
async fn uses_default_values_when_available() {
    let store = MemoryStore::new();
    let (_, _, wallet_model) = fixture_models();

    let wallet = build(&store, &wallet_model, &none(), &BuildOptions::default())
        .await
        .unwrap();

    assert_eq!(wallet.get("balance"), Some(&Value::Float(0.0)));
    assert!(matches!(wallet.id(), Some(Value::Uuid(_))));
}

#[tokio::test]
async fn skips_nullable_fields() {
    let store = MemoryStore::new();
    let user_model = user_model();

    let user = build(&store, &user_model, &none(), &BuildOptions::default())
        .await
        .unwrap();

    assert!(user.get("username").is_some());
    assert!(user.get("email").is_none());
    assert!(user.get("date_of_birth").is_none());
    assert!(user.get("deleted_at").is_none());
}

#[tokio::test]
async fn generates_nullable_fields_if_requested() {
    let store = MemoryStore::new();
    let user_model = user_model();

    let user = build(&store, &user_model, &none(), &BuildOptions::fill_all())
        .await
        .unwrap();

    assert!(user.get("email").is_some());
    assert!(user.get("date_of_birth").is_some());
}

#[tokio::test]
async fn generates_specific_nullable_fields_if_requested() {
    let store = MemoryStore::new();
    let user_model = user_model();
    let options = BuildOptions::fill_only(["date_of_birth"]);

    let user = build(&store, &user_model, &none(), &options).await.unwrap();

    assert!(user.get("email").is_none());
    assert!(user.get("date_of_birth").is_some());
}

#[tokio::test]
async fn respects_maximum_length_of_bounded_fields() {
    let store = MemoryStore::new();
    let user_model = user_model();
    let options = BuildOptions::fill_only(["initials"]);

    for _ in 0..20 {
        let user = build(&store, &user_model, &none(), &options).await.unwrap();
        let initials = user.get("initials").and_then(Value::as_str).unwrap();
        assert!(initials.len() <= 3);
    }
}

#[tokio::test]
async fn repeated_builds_vary_values_but_not_structure() {
    let store = MemoryStore::new();
    let user_model = user_model();

    let first = build(&store, &user_model, &none(), &BuildOptions::default())
        .await
        .unwrap();
    let second = build(&store, &user_model, &none(), &BuildOptions::default())
        .await
        .unwrap();

    let keys = |instance: &fixturekit_core::Instance| {
        instance.values.keys().cloned().collect::<Vec<_>>()
    };
    assert_eq!(keys(&first), keys(&second));
    assert_ne!(first.get("username"), second.get("username"));
}

// --- create with relations ----------------------------------------------

#[tokio::test]
async fn creates_an_instance_with_a_required_relation() {
    let store = MemoryStore::new();
    let (user_model, account_model, _) = fixture_models();

    let account = build(
        &store,
        &account_model,
        &over([(
            "user",
            Override::nested(over([("username", Override::value("Brock"))])),
        )]),
        &BuildOptions::default(),
    )
    .await
    .unwrap();

    let stored = store.find_where(&user_model, "username", &Value::from("Brock"));
    assert_eq!(stored.len(), 1);
    assert_eq!(account.get("user_id"), stored[0].id());

    let related = account.related("user").expect("relation attached");
    assert_eq!(related.get("username"), Some(&Value::from("Brock")));
}

#[tokio::test]
async fn does_not_create_an_optional_relation() {
    let store = MemoryStore::new();
    let (user_model, account_model, _) = fixture_models();

    let account = build(&store, &account_model, &none(), &BuildOptions::default())
        .await
        .unwrap();

    assert!(account.get("manager_id").is_none());
    assert!(account.related("manager").is_none());
    // Only the required user was cascaded.
    assert_eq!(store.count(&user_model), 1);
}

#[tokio::test]
async fn rejects_a_raw_identifier_under_the_relationship_name() {
    let store = MemoryStore::new();
    let (user_model, account_model, _) = fixture_models();

    let user = build(&store, &user_model, &none(), &BuildOptions::default())
        .await
        .unwrap();
    let id = user.id().cloned().unwrap();

    let err = build(
        &store,
        &account_model,
        &over([("user", Override::Value(id))]),
        &BuildOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FixtureError::InvalidAssociationOverride { .. }));
    assert!(err.to_string().contains("You need to supply"));
}

#[tokio::test]
async fn rejects_override_keys_that_match_nothing() {
    let store = MemoryStore::new();
    let (_, account_model, _) = fixture_models();

    let err = build(
        &store,
        &account_model,
        &over([("nickname", Override::value("x"))]),
        &BuildOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FixtureError::UnknownAssociation { .. }));
}

// --- create with overrides ----------------------------------------------

#[tokio::test]
async fn overrides_a_primitive_value() {
    let store = MemoryStore::new();
    let (_, account_model, _) = fixture_models();

    let account = build(
        &store,
        &account_model,
        &over([("name", Override::value("overridden"))]),
        &BuildOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(account.get("name"), Some(&Value::from("overridden")));
}

#[tokio::test]
async fn overrides_a_primitive_in_a_nested_created_relation() {
    let store = MemoryStore::new();
    let (_, account_model, _) = fixture_models();

    let account = build(
        &store,
        &account_model,
        &over([(
            "user",
            Override::nested(over([("username", Override::value("overridden"))])),
        )]),
        &BuildOptions::default(),
    )
    .await
    .unwrap();

    let related = account.related("user").unwrap();
    assert_eq!(related.get("username"), Some(&Value::from("overridden")));
}

#[tokio::test]
async fn overrides_a_relation_with_an_existing_instance() {
    let store = MemoryStore::new();
    let (user_model, account_model, _) = fixture_models();

    let predefined = build(
        &store,
        &user_model,
        &over([
            ("username", Override::value("custom user")),
            ("email", Override::value("test@example.com")),
        ]),
        &BuildOptions::default(),
    )
    .await
    .unwrap();

    let account = build(
        &store,
        &account_model,
        &over([("user", Override::instance(predefined.clone()))]),
        &BuildOptions::default(),
    )
    .await
    .unwrap();

    // No second user was created; the exact instance is attached.
    assert_eq!(store.count(&user_model), 1);
    assert_eq!(account.get("user_id"), predefined.id());
    assert_eq!(account.related("user"), Some(&predefined));
}

#[tokio::test]
async fn populates_an_optional_relation_when_an_instance_is_supplied() {
    let store = MemoryStore::new();
    let (user_model, account_model, _) = fixture_models();

    let predefined = build(&store, &user_model, &none(), &BuildOptions::default())
        .await
        .unwrap();

    let account = build(
        &store,
        &account_model,
        &over([("manager", Override::instance(predefined.clone()))]),
        &BuildOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(account.get("manager_id"), predefined.id());
    assert_eq!(account.related("manager"), Some(&predefined));
}

#[tokio::test]
async fn overrides_a_relation_by_identifier_under_the_foreign_key() {
    let store = MemoryStore::new();
    let (user_model, account_model, _) = fixture_models();

    let predefined = build(
        &store,
        &user_model,
        &over([
            ("username", Override::value("custom user")),
            ("email", Override::value("test@example.com")),
        ]),
        &BuildOptions::default(),
    )
    .await
    .unwrap();
    let id = predefined.id().cloned().unwrap();

    let account = build(
        &store,
        &account_model,
        &over([("user_id", Override::Value(id.clone()))]),
        &BuildOptions::default(),
    )
    .await
    .unwrap();

    // No recursion: the identifier was used as-is, and the existing row was
    // fetched for the relationship slot.
    assert_eq!(store.count(&user_model), 1);
    assert_eq!(account.get("user_id"), Some(&id));
    let related = account.related("user").expect("fetched and attached");
    assert_eq!(related.get("username"), Some(&Value::from("custom user")));
    assert_eq!(related.get("email"), Some(&Value::from("test@example.com")));
}

// --- create nested -------------------------------------------------------

#[tokio::test]
async fn creates_a_deep_hierarchy() {
    let store = MemoryStore::new();
    let (user_model, account_model, wallet_model) = fixture_models();

    let wallet = build(&store, &wallet_model, &none(), &BuildOptions::default())
        .await
        .unwrap();

    let account = wallet.related("account").expect("account attached");
    assert!(account.get("user_id").is_some());

    // Three rows: wallet, account, user.
    assert_eq!(store.count(&wallet_model), 1);
    assert_eq!(store.count(&account_model), 1);
    assert_eq!(store.count(&user_model), 1);
}

#[tokio::test]
async fn overrides_a_skip_level_in_the_hierarchy() {
    let store = MemoryStore::new();
    let (_, _, wallet_model) = fixture_models();

    let wallet = build(
        &store,
        &wallet_model,
        &over([(
            "account",
            Override::nested(over([(
                "user",
                Override::nested(over([("username", Override::value("overridden"))])),
            )])),
        )]),
        &BuildOptions::default(),
    )
    .await
    .unwrap();

    let username = wallet
        .related("account")
        .and_then(|account| account.related("user"))
        .and_then(|user| user.get("username"));
    assert_eq!(username, Some(&Value::from("overridden")));
}

#[tokio::test]
async fn shares_a_predefined_instance_across_builds() {
    let store = MemoryStore::new();
    let (user_model, account_model, wallet_model) = fixture_models();

    let user = build(&store, &user_model, &none(), &BuildOptions::default())
        .await
        .unwrap();
    let shared = over([(
        "account",
        Override::nested(over([("user", Override::instance(user.clone()))])),
    )]);

    build(&store, &wallet_model, &shared, &BuildOptions::default())
        .await
        .unwrap();
    build(&store, &wallet_model, &shared, &BuildOptions::default())
        .await
        .unwrap();
    // This wallet does _not_ belong to the shared user.
    build(&store, &wallet_model, &none(), &BuildOptions::default())
        .await
        .unwrap();

    let accounts = store.find_where(&account_model, "user_id", user.id().unwrap());
    let wallets: Vec<_> = accounts
        .iter()
        .flat_map(|account| {
            store.find_where(&wallet_model, "account_id", account.id().unwrap())
        })
        .collect();
    assert_eq!(wallets.len(), 2);
}

// --- specialized fields ---------------------------------------------------

#[tokio::test]
async fn generates_validator_shaped_values() {
    let store = MemoryStore::new();
    let model = validators_model();

    let instance = build(&store, &model, &none(), &BuildOptions::default())
        .await
        .unwrap();

    let text = |name: &str| instance.get(name).and_then(Value::as_str).unwrap().to_string();

    assert!(text("email").contains('@'));
    assert!(text("ip").parse::<std::net::IpAddr>().is_ok());
    assert!(text("ipv4").parse::<std::net::Ipv4Addr>().is_ok());
    assert!(text("ipv6").parse::<std::net::Ipv6Addr>().is_ok());
    assert!(text("credit_card")
        .chars()
        .all(|c| c.is_ascii_digit() || c == '-' || c == ' '));
}

#[tokio::test]
async fn fails_loudly_on_an_unsupported_validator() {
    let store = MemoryStore::new();
    let model = unsupported_validator_model();

    let err = build(&store, &model, &none(), &BuildOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FixtureError::UnsupportedValidator { .. }));
    assert!(err.to_string().contains("does not currently support"));
    assert!(err.to_string().contains("isArray"));
}

#[tokio::test]
async fn rejects_non_scalar_overrides_for_plain_attributes() {
    let store = MemoryStore::new();
    let (_, account_model, _) = fixture_models();

    let err = build(
        &store,
        &account_model,
        &over([("name", Override::nested(IndexMap::new()))]),
        &BuildOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FixtureError::InvalidScalarOverride { .. }));
}
