//! Bearer token payload decoding.
//!
//! Only the payload is read; signature verification is the backend's job.

use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::{DecodePaddingMode, general_purpose};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// URL-safe alphabet that accepts both padded and unpadded input.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Standard alphabet, same padding tolerance.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Realm role block as issued by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RealmAccess {
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<String>,
}

/// Claims read from the access token payload. Every field is optional, and a
/// field with an unexpected type is dropped on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenClaims {
    #[serde(deserialize_with = "lenient_string")]
    pub sub: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub preferred_username: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub given_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub family_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(deserialize_with = "lenient_realm_access")]
    pub realm_access: Option<RealmAccess>,
}

/// Strings as-is, numbers and booleans in their JSON text form.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn string_items(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn lenient_roles<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(string_items(&Value::deserialize(deserializer)?))
}

fn lenient_realm_access<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RealmAccess>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_object().map(|block| RealmAccess {
        roles: block.get("roles").map(string_items).unwrap_or_default(),
    }))
}

/// Decodes the payload (second dot-separated part) of a bearer token.
///
/// Returns `None` when the token has no payload part, the payload is not
/// base64, or the decoded bytes are not a JSON object.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    if payload.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))
        .ok()?;

    let value: Value = serde_json::from_slice(&bytes).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Encodes a claims object into an unsigned token. Test helper for callers
/// that need a decodable bearer token.
pub fn unsigned_token(claims: &Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
