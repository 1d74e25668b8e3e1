use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// The account attached to the current auth token, as returned by `user/me`.
///
/// Only the fields the desktop app relies on are typed; everything else the
/// API sends is kept in `extra` so nothing is lost on a round trip. The
/// typed fields tolerate `null` and missing values.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub has_verified_email: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_identity_verified: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_reward_approved: bool,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

impl User {
    /// Identity handed out while the API is disabled.
    pub fn placeholder() -> Self {
        User {
            id: Some(1),
            language: Some("en".to_string()),
            primary_email: Some("disabled@lbry.io".to_string()),
            has_verified_email: true,
            is_identity_verified: true,
            is_reward_approved: false,
            extra: HashMap::new(),
        }
    }

    /// Build a user from a `user/me` payload. Never fails: a payload whose
    /// typed fields do not decode is kept whole in `extra`.
    pub fn from_payload(data: Value) -> Self {
        match User::deserialize(&data) {
            Ok(user) => user,
            Err(e) => {
                debug!(error = %e, "user payload kept untyped");
                let extra = match data {
                    Value::Object(fields) => fields.into_iter().collect(),
                    Value::Null => HashMap::new(),
                    other => HashMap::from([("data".to_string(), other)]),
                };
                User {
                    extra,
                    ..User::default()
                }
            }
        }
    }
}
