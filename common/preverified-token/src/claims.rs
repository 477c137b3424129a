use std::fmt;

use serde::Serialize;

/// Algorithm declared in every token header.
pub const RS256: &str = "RS256";

/// Lifetime of a preverified email token, in milliseconds.
pub const TOKEN_LIFETIME_MS: i64 = 10_000;

/// JOSE header of a preverified email token. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenHeader<'a> {
    pub alg: &'static str,
    pub jku: &'a str,
    pub kid: &'a str,
}

impl<'a> TokenHeader<'a> {
    pub fn rs256(jku: &'a str, kid: &'a str) -> Self {
        Self {
            alg: RS256,
            jku,
            kid,
        }
    }
}

/// Claims asserting that `sub` is a preverified email address.
///
/// `exp` is in epoch milliseconds, not seconds.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct PreverifiedClaims<'a> {
    pub exp: i64,
    pub aud: &'a str,
    pub sub: &'a str,
}

impl<'a> PreverifiedClaims<'a> {
    pub fn new(issued_at_ms: i64, aud: &'a str, sub: &'a str) -> Self {
        Self {
            exp: issued_at_ms.saturating_add(TOKEN_LIFETIME_MS),
            aud,
            sub,
        }
    }
}

// The subject is an email address; keep it out of logs.
impl fmt::Debug for PreverifiedClaims<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreverifiedClaims")
            .field("exp", &self.exp)
            .field("aud", &self.aud)
            .field("sub", &"[REDACTED]")
            .finish()
    }
}
