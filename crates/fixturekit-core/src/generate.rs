//! # Value Generation
//!
//! Maps declared attribute types (and validator specializations) to random
//! value producers. Dispatch is a closed match over the type and validator
//! enums: asking for anything outside the registered set is a hard error
//! naming the offender, never a silent fallback.

use std::borrow::Cow;

use chrono::{Duration as ChronoDuration, Utc};
use fake::faker::creditcard::en::CreditCardNumber;
use fake::faker::internet::en::{SafeEmail, IPv4, IPv6};
use fake::faker::lorem::en::Sentences;
use fake::Fake;
use rand::Rng;

use crate::error::{FixtureError, Result};
use crate::schema::{Attribute, FieldType, Validator};
use crate::value::Value;

/// Default length for generated short text when no bound is declared.
const DEFAULT_TEXT_LEN: usize = 10;

/// Wrap a dynamically generated String into a Value::String.
#[inline]
fn owned(s: String) -> Value {
    Value::String(Cow::Owned(s))
}

/// Generate a random value for an attribute.
///
/// A declared validator takes precedence over the attribute's type: an
/// email-validated string column gets an email-shaped value, not generic
/// text. String results never exceed the attribute's `max_length`.
pub fn generate(attr: &Attribute, rng: &mut impl Rng) -> Result<Value> {
    let value = match attr.validators.first() {
        Some(validator) => generate_validated(attr, validator, rng)?,
        None => generate_typed(attr, rng)?,
    };

    Ok(bound_length(value, attr.max_length))
}

fn generate_validated(
    attr: &Attribute,
    validator: &Validator,
    rng: &mut impl Rng,
) -> Result<Value> {
    let value = match validator {
        Validator::Email => owned(SafeEmail().fake_with_rng(rng)),
        // A plain isIP accepts either family; v4 satisfies it.
        Validator::Ip | Validator::Ipv4 => owned(IPv4().fake_with_rng(rng)),
        Validator::Ipv6 => owned(IPv6().fake_with_rng(rng)),
        Validator::CreditCard => owned(CreditCardNumber().fake_with_rng(rng)),
        Validator::Other(rule) => {
            return Err(FixtureError::UnsupportedValidator {
                rule: rule.clone(),
                attribute: attr.name.clone(),
            });
        }
    };
    Ok(value)
}

fn generate_typed(attr: &Attribute, rng: &mut impl Rng) -> Result<Value> {
    let value = match attr.field_type {
        FieldType::Integer => Value::Int(rng.random_range(0..100_000)),
        FieldType::BigInt => Value::Int(rng.random_range(0..1_000_000_000_000i64)),
        FieldType::Text => {
            let len = attr
                .max_length
                .map(|max| (max as usize).min(DEFAULT_TEXT_LEN))
                .unwrap_or(DEFAULT_TEXT_LEN);
            owned(random_alphanumeric(rng, len))
        }
        FieldType::LongText => {
            let sentences: Vec<String> = Sentences(2..4).fake_with_rng(rng);
            owned(sentences.join(" "))
        }
        FieldType::DateTime => {
            let base = Utc::now().naive_utc();
            let days = rng.random_range(0..365);
            let seconds = rng.random_range(0..86_400);
            Value::Timestamp(
                base - ChronoDuration::days(days) - ChronoDuration::seconds(seconds),
            )
        }
        FieldType::Date => {
            let base = Utc::now().date_naive();
            let days = rng.random_range(0..365);
            Value::Date(base - ChronoDuration::days(days))
        }
        FieldType::Uuid | FieldType::Decimal | FieldType::Boolean => {
            return Err(FixtureError::UnsupportedType {
                type_name: attr.field_type.to_string(),
                attribute: attr.name.clone(),
            });
        }
    };
    Ok(value)
}

/// Truncate a generated string to the declared maximum length.
fn bound_length(value: Value, max_length: Option<u32>) -> Value {
    match (value, max_length) {
        (Value::String(s), Some(max)) if s.chars().count() > max as usize => {
            let truncated: String = s.chars().take(max as usize).collect();
            Value::String(Cow::Owned(truncated))
        }
        (value, _) => value,
    }
}

fn random_alphanumeric(rng: &mut impl Rng, len: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..len)
        .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
        .collect()
}
