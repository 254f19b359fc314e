//! # Credentials and Tokens
//!
//! Password hashing and bearer-token signing.
//!
//! Both are deliberately plain: a salted, stretched blake3 keyed hash for
//! passwords and a blake3 keyed MAC over postcard-encoded claims for
//! tokens. All comparisons go through `subtle` so they run in constant
//! time. The 32-byte server secret is provisioned by the store (or the
//! `MURMUR_SECRET` environment variable) and never leaves the process.

use crate::error::CoreError;
use crate::UserId;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Token lifetime: 7 days.
pub const TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Password stretching rounds.
const HASH_ROUNDS: u32 = 4096;

// Key-derivation contexts. Changing either invalidates every stored
// credential or issued token, so they are versioned.
const PASSWORD_CONTEXT: &str = "murmur v1 password hash";
const TOKEN_CONTEXT: &str = "murmur v1 session token";

// =============================================================================
// PASSWORDS
// =============================================================================

/// Salt and stretched hash, as stored with the user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRecord {
    pub salt: [u8; 16],
    pub hash: [u8; 32],
}

/// Hash a password with the given salt.
#[must_use]
pub fn hash_password(password: &str, salt: [u8; 16]) -> PasswordRecord {
    let key = blake3::derive_key(PASSWORD_CONTEXT, password.as_bytes());
    let mut state = blake3::keyed_hash(&key, &salt);
    for _ in 1..HASH_ROUNDS {
        state = blake3::keyed_hash(&key, state.as_bytes());
    }
    PasswordRecord {
        salt,
        hash: *state.as_bytes(),
    }
}

/// Verify a password against a stored record in constant time.
#[must_use]
pub fn verify_password(password: &str, record: &PasswordRecord) -> bool {
    let candidate = hash_password(password, record.salt);
    bool::from(candidate.hash.ct_eq(&record.hash))
}

// =============================================================================
// BEARER TOKENS
// =============================================================================

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user: UserId,
    /// Unix seconds.
    pub issued_at: u64,
    /// Unix seconds; tokens at or past this instant are rejected.
    pub expires_at: u64,
}

/// Sign a token for the given user.
///
/// Format: `base64url(postcard(claims)) . base64url(mac)`.
pub fn sign_token(
    secret: &[u8; 32],
    user: UserId,
    now: u64,
    ttl_secs: u64,
) -> Result<String, CoreError> {
    let claims = Claims {
        user,
        issued_at: now,
        expires_at: now.saturating_add(ttl_secs),
    };
    let payload = postcard::to_allocvec(&claims)?;
    let key = blake3::derive_key(TOKEN_CONTEXT, secret);
    let mac = blake3::keyed_hash(&key, &payload);

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&payload),
        URL_SAFE_NO_PAD.encode(mac.as_bytes())
    ))
}

/// Verify a token and return its claims.
///
/// Any malformed, forged, or expired token maps to
/// [`CoreError::Unauthorized`]; callers never learn which check failed.
pub fn verify_token(secret: &[u8; 32], token: &str, now: u64) -> Result<Claims, CoreError> {
    let (payload_b64, mac_b64) = token.split_once('.').ok_or(CoreError::Unauthorized)?;
    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| CoreError::Unauthorized)?;
    let mac = URL_SAFE_NO_PAD
        .decode(mac_b64)
        .map_err(|_| CoreError::Unauthorized)?;

    let key = blake3::derive_key(TOKEN_CONTEXT, secret);
    let expected = blake3::keyed_hash(&key, &payload);
    if !bool::from(expected.as_bytes().ct_eq(mac.as_slice())) {
        return Err(CoreError::Unauthorized);
    }

    let claims: Claims = postcard::from_bytes(&payload).map_err(|_| CoreError::Unauthorized)?;
    if now >= claims.expires_at {
        return Err(CoreError::Unauthorized);
    }

    Ok(claims)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: [u8; 32] = [42; 32];

    #[test]
    fn password_verifies_with_correct_input() {
        let record = hash_password("hunter42", [1; 16]);

        assert!(verify_password("hunter42", &record));
        assert!(!verify_password("hunter43", &record));
        assert!(!verify_password("", &record));
    }

    #[test]
    fn same_password_different_salt_differs() {
        let a = hash_password("hunter42", [1; 16]);
        let b = hash_password("hunter42", [2; 16]);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn token_round_trip() {
        let token = sign_token(&SECRET, UserId(7), 1_000, TOKEN_TTL_SECS).unwrap();
        let claims = verify_token(&SECRET, &token, 2_000).unwrap();

        assert_eq!(claims.user, UserId(7));
        assert_eq!(claims.issued_at, 1_000);
        assert_eq!(claims.expires_at, 1_000 + TOKEN_TTL_SECS);
    }

    #[test]
    fn expired_token_rejected() {
        let token = sign_token(&SECRET, UserId(7), 1_000, 60).unwrap();

        assert!(verify_token(&SECRET, &token, 1_059).is_ok());
        assert!(verify_token(&SECRET, &token, 1_060).is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = sign_token(&SECRET, UserId(7), 1_000, 60).unwrap();
        let other = [43; 32];

        assert!(matches!(
            verify_token(&other, &token, 1_001),
            Err(CoreError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_tokens_rejected() {
        assert!(verify_token(&SECRET, "", 0).is_err());
        assert!(verify_token(&SECRET, "no-dot-here", 0).is_err());
        assert!(verify_token(&SECRET, "a.b", 0).is_err());
        assert!(verify_token(&SECRET, "!!!.???", 0).is_err());
    }

    #[test]
    fn tampered_payload_rejected() {
        let token = sign_token(&SECRET, UserId(7), 1_000, 60).unwrap();
        let (payload, mac) = token.split_once('.').unwrap();

        // Re-point the token at another user, keeping the original MAC.
        let forged_payload = URL_SAFE_NO_PAD.encode(
            postcard::to_allocvec(&Claims {
                user: UserId(8),
                issued_at: 1_000,
                expires_at: 1_060,
            })
            .unwrap(),
        );
        assert_ne!(forged_payload, payload);

        let forged = format!("{forged_payload}.{mac}");
        assert!(verify_token(&SECRET, &forged, 1_001).is_err());
    }

    proptest! {
        #[test]
        fn any_signed_token_verifies_before_expiry(
            user in 0u64..u64::MAX,
            now in 0u64..1u64 << 40,
            ttl in 1u64..1u64 << 30,
        ) {
            let token = sign_token(&SECRET, UserId(user), now, ttl).unwrap();
            let claims = verify_token(&SECRET, &token, now).unwrap();
            prop_assert_eq!(claims.user, UserId(user));
        }
    }
}
