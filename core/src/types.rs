//! Entity types for the `/users` and `/items` collections.
//!
//! # Design
//! Records are schema-less on the store side. Entities pin down only the
//! `id`; every other field, including the ones this crate reads through
//! accessors, stays in `attributes`. Any JSON object with an id parses, and
//! caller-defined fields survive a read-modify-write untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open-ended field map sent to and received from the store.
pub type Attributes = Map<String, Value>;

/// A user record, keyed by the externally supplied `uid`.
///
/// `stripeCustomerId` stays in `attributes`; [`User::stripe_customer_id`]
/// reads it when it is a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(deserialize_with = "record_id::deserialize")]
    pub id: String,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl User {
    pub fn stripe_customer_id(&self) -> Option<&str> {
        self.attributes.get("stripeCustomerId").and_then(Value::as_str)
    }
}

/// An item record.
///
/// `owner` and `createdAt` live in `attributes` like any other field, so a
/// record written by another client still parses whatever their shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    #[serde(deserialize_with = "record_id::deserialize")]
    pub id: String,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Item {
    pub fn owner(&self) -> Option<&str> {
        self.attributes.get("owner").and_then(Value::as_str)
    }

    /// Milliseconds since the Unix epoch, if the record carries an integer
    /// `createdAt`.
    pub fn created_at(&self) -> Option<i64> {
        self.attributes.get("createdAt").and_then(Value::as_i64)
    }
}

/// json-server hands out numeric ids; callers supply string ones.
mod record_id {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            other => Err(de::Error::custom(format!("invalid record id: {other}"))),
        }
    }
}
