//! Session token codec
//!
//! A session token is `base64url(seal(json(SessionState)))`. The JSON payload is
//! never exposed outside the sealed token. Opening a token only proves integrity
//! and recovers structure: expired sessions decode like any other, staleness is
//! decided by [`crate::session::expiration`].

use base64::{engine::general_purpose, Engine as _};

use crate::models::SessionState;
use crate::session::errors::SessionError;
use crate::utils::crypto::Cipher;

/// Serialize a session into its plaintext payload
///
/// # Errors
///
/// Returns [`SessionError::Encoding`] if serialization fails
pub fn encode(state: &SessionState) -> Result<Vec<u8>, SessionError> {
    serde_json::to_vec(state).map_err(SessionError::Encoding)
}

/// Parse a plaintext payload back into a session
///
/// # Errors
///
/// Returns [`SessionError::MalformedEncoding`] if the payload has missing or
/// unknown fields, wrong types, or timestamps outside the supported range
pub fn decode(bytes: &[u8]) -> Result<SessionState, SessionError> {
    serde_json::from_slice(bytes).map_err(SessionError::MalformedEncoding)
}

/// Encode and seal a session into an opaque token
///
/// Two calls with the same session and cipher may produce different tokens.
///
/// # Errors
///
/// Returns [`SessionError::Encoding`] if serialization fails, or
/// [`SessionError::Seal`] if the cipher rejects the payload
pub fn marshal_session(state: &SessionState, cipher: &dyn Cipher) -> Result<String, SessionError> {
    let plaintext = encode(state)?;
    let sealed = cipher.seal(&plaintext).map_err(|e| {
        log::warn!("Failed to seal session for provider {}: {e}", state.provider_slug);
        SessionError::Seal(e)
    })?;

    Ok(general_purpose::URL_SAFE_NO_PAD.encode(sealed))
}

/// Open and decode a token produced by [`marshal_session`]
///
/// # Errors
///
/// Returns [`SessionError::AuthenticationFailed`] if the token is not valid
/// base64url or fails the cipher's integrity check, and
/// [`SessionError::MalformedEncoding`] if the authenticated payload is not a session
pub fn unmarshal_session(token: &str, cipher: &dyn Cipher) -> Result<SessionState, SessionError> {
    // Anything that is not our own base64 output has been altered in transit
    let sealed = general_purpose::URL_SAFE_NO_PAD.decode(token).map_err(|_| {
        log::debug!("Rejecting session token: invalid encoding");
        SessionError::AuthenticationFailed
    })?;

    let plaintext = cipher.open(&sealed).map_err(|e| {
        log::debug!("Rejecting session token: {e}");
        SessionError::AuthenticationFailed
    })?;

    decode(&plaintext).inspect_err(|e| {
        log::warn!("Authenticated session token carried an invalid payload: {e}");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::{generate_key, Aes256GcmCipher};
    use chrono::{DateTime, Duration, Utc};

    fn test_cipher() -> Aes256GcmCipher {
        Aes256GcmCipher::new(&generate_key()).unwrap()
    }

    fn test_session() -> SessionState {
        let now = Utc::now();
        SessionState {
            provider_slug: "slug".to_string(),
            provider_type: "sso".to_string(),
            access_token: "token1234".to_string(),
            refresh_token: "refresh4321".to_string(),
            lifetime_deadline: Some(now + Duration::hours(1)),
            refresh_deadline: Some(now + Duration::hours(1)),
            valid_deadline: Some(now + Duration::minutes(1)),
            grace_period_start: None,
            email: "user@domain.com".to_string(),
            user: "user".to_string(),
        }
    }

    #[test]
    fn test_session_state_serialization() {
        let cipher = test_cipher();
        let want = test_session();

        let token = marshal_session(&want, &cipher).unwrap();
        let got = unmarshal_session(&token, &cipher).unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let session = test_session();
        assert_eq!(encode(&session).unwrap(), encode(&session).unwrap());
    }

    #[test]
    fn test_zero_values_round_trip() {
        let session = SessionState::default();
        let decoded = decode(&encode(&session).unwrap()).unwrap();

        assert_eq!(decoded, session);
        assert!(decoded.lifetime_deadline.is_none());
        assert!(decoded.grace_period_start.is_none());
    }

    #[test]
    fn test_extreme_timestamps_round_trip() {
        let mut session = test_session();
        session.lifetime_deadline = Some(DateTime::<Utc>::MAX_UTC);
        session.refresh_deadline = Some(DateTime::<Utc>::MIN_UTC);
        session.valid_deadline = Some(DateTime::<Utc>::UNIX_EPOCH);
        session.grace_period_start = DateTime::from_timestamp(-1, 999_999_999);

        let decoded = decode(&encode(&session).unwrap()).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_epoch_is_distinct_from_unset() {
        let mut session = SessionState::default();
        session.grace_period_start = Some(DateTime::<Utc>::UNIX_EPOCH);

        let decoded = decode(&encode(&session).unwrap()).unwrap();
        assert_eq!(decoded.grace_period_start, Some(DateTime::<Utc>::UNIX_EPOCH));
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        let valid: serde_json::Value = serde_json::from_slice(&encode(&test_session()).unwrap()).unwrap();

        let mut missing_field = valid.clone();
        missing_field.as_object_mut().unwrap().remove("email");

        let mut extra_field = valid.clone();
        extra_field["groups"] = serde_json::json!(["admins"]);

        let mut wrong_type = valid.clone();
        wrong_type["user"] = serde_json::json!(42);

        let mut bad_timestamp = valid.clone();
        bad_timestamp["valid_deadline"] = serde_json::json!("2024-01-01T00:00:00Z");

        let mut out_of_range = valid;
        out_of_range["lifetime_deadline"] = serde_json::json!([i64::MAX, 0]);

        for payload in [missing_field, extra_field, wrong_type, bad_timestamp, out_of_range] {
            let bytes = serde_json::to_vec(&payload).unwrap();
            assert!(
                matches!(decode(&bytes), Err(SessionError::MalformedEncoding(_))),
                "payload should be rejected: {payload}"
            );
        }

        assert!(matches!(decode(b""), Err(SessionError::MalformedEncoding(_))));
        assert!(matches!(decode(b"\xff\xfe"), Err(SessionError::MalformedEncoding(_))));
    }

    #[test]
    fn test_unmarshal_propagates_malformed_encoding() {
        let cipher = test_cipher();
        let sealed = cipher.seal(br#"{"not":"a session"}"#).unwrap();
        let token = general_purpose::URL_SAFE_NO_PAD.encode(sealed);

        assert!(matches!(
            unmarshal_session(&token, &cipher),
            Err(SessionError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_unmarshal_rejects_invalid_base64() {
        let cipher = test_cipher();
        assert!(matches!(
            unmarshal_session("not base64!", &cipher),
            Err(SessionError::AuthenticationFailed)
        ));
        assert!(matches!(
            unmarshal_session("", &cipher),
            Err(SessionError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_unmarshal_with_wrong_key() {
        let token = marshal_session(&test_session(), &test_cipher()).unwrap();

        assert!(matches!(
            unmarshal_session(&token, &test_cipher()),
            Err(SessionError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_expired_session_still_decodes() {
        let cipher = test_cipher();
        let now = Utc::now();
        let mut session = test_session();
        session.lifetime_deadline = Some(now - Duration::days(30));
        session.refresh_deadline = Some(now - Duration::days(30));
        session.valid_deadline = Some(now - Duration::days(30));

        let token = marshal_session(&session, &cipher).unwrap();
        let decoded = unmarshal_session(&token, &cipher).unwrap();

        assert_eq!(decoded, session);
        assert!(decoded.lifetime_period_expired(now));
    }

    #[test]
    fn test_token_does_not_leak_plaintext() {
        let token = marshal_session(&test_session(), &test_cipher()).unwrap();

        assert!(!token.contains("token1234"));
        assert!(!token.contains("user@domain.com"));
        let raw = general_purpose::URL_SAFE_NO_PAD.decode(&token).unwrap();
        assert!(!raw.windows(9).any(|w| w == b"token1234"));
    }
}
