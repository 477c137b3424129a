use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::Serialize;

use crate::claims::{PreverifiedClaims, TokenHeader};
use crate::error::EncodeError;
use crate::keys::SecretKey;

/// Build and sign a preverified email token issued now.
///
/// The clock is read on every call; nothing is cached between tokens.
pub fn build_token<S: SecretKey>(
    email: &str,
    jku: &str,
    secret_key: &S,
    kid: &str,
    audience: &str,
) -> Result<String, EncodeError<S::Error>> {
    build_token_at(
        Utc::now().timestamp_millis(),
        email,
        jku,
        secret_key,
        kid,
        audience,
    )
}

/// Build and sign a token as if issued at `issued_at_ms` (epoch milliseconds).
pub fn build_token_at<S: SecretKey>(
    issued_at_ms: i64,
    email: &str,
    jku: &str,
    secret_key: &S,
    kid: &str,
    audience: &str,
) -> Result<String, EncodeError<S::Error>> {
    let header = encode_segment(&TokenHeader::rs256(jku, kid))?;
    let payload = encode_segment(&PreverifiedClaims::new(issued_at_ms, audience, email))?;

    let signing_input = format!("{header}.{payload}");
    let signature = secret_key
        .sign(signing_input.as_bytes())
        .map_err(EncodeError::Signing)?;

    Ok(format!("{signing_input}.{signature}"))
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}
