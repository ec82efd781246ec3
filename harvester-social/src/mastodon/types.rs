use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Subset of the account entity returned by `GET /api/v1/accounts/lookup`.
///
/// Only the id is read; the rest of the entity is ignored.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Account {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
}

/// Subset of the status entity returned by `GET /api/v1/accounts/:id/statuses`.
///
/// Every field is optional: servers (and forks) differ, and a missing
/// timestamp must not throw the whole post away.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Status {
    #[serde(default)]
    pub created_at: Option<String>,
    /// HTML body.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, found {other}"
        ))),
    }
}
