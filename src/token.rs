use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

use crate::error::Error;

const ROLE_CLAIM_KEYS: &[&str] = &[
    "role",
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
];

/// Claims read from an access token WITHOUT signature verification.
///
/// The backend is the only party that validates tokens; the client reads
/// claims to decide whether a stored session is worth restoring.
#[derive(Debug, Clone)]
pub struct UnverifiedClaims {
    inner: JsonValue,
}

impl UnverifiedClaims {
    #[must_use]
    pub fn get_claim(&self, key: &str) -> Option<&JsonValue> {
        self.inner.get(key)
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.inner.get("sub").and_then(JsonValue::as_str)
    }

    /// Role claim, accepting both the short and the WS-Federation claim name.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        ROLE_CLAIM_KEYS
            .iter()
            .find_map(|key| self.inner.get(*key).and_then(JsonValue::as_str))
    }

    /// `exp` claim, if present and numeric.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        let exp = self.inner.get("exp")?.as_i64()?;
        OffsetDateTime::from_unix_timestamp(exp).ok()
    }

    /// Whether the token's `exp` lies at or before `now`. Tokens without `exp` never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}

/// Decodes the payload segment of a JWT.
///
/// # Errors
///
/// Returns `Error::Token` if the token does not have three segments or the
/// payload is not base64url-encoded JSON.
pub fn decode_unverified(token: &str) -> Result<UnverifiedClaims, Error> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::Token("invalid token format".into()));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|_| Error::Token("invalid payload encoding".into()))?;

    let inner: JsonValue = serde_json::from_slice(&payload)
        .map_err(|_| Error::Token("invalid payload".into()))?;
    if !inner.is_object() {
        return Err(Error::Token("invalid payload".into()));
    }

    Ok(UnverifiedClaims { inner })
}

#[cfg(test)]
pub(crate) fn encode_unsigned(claims: &JsonValue) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
