use std::fmt;

use tracing::debug;

use crate::config::{GeneratorConfig, IssuanceConfig};
use crate::encoder::build_token;
use crate::error::{ConfigError, GenerateError};
use crate::keys::{KeyPair, SecretKey};

/// Error returned by [`PreverifiedTokenGenerator::generate`] for key handle `K`.
pub type GeneratorError<K> =
    GenerateError<<K as KeyPair>::Error, <<K as KeyPair>::SecretKey as SecretKey>::Error>;

/// Issues preverified email tokens signed with the current key of `K`.
pub struct PreverifiedTokenGenerator<K> {
    config: IssuanceConfig<K>,
}

impl<K> PreverifiedTokenGenerator<K> {
    /// Validate `config` in one pass. Nothing is constructed unless every field is present.
    pub fn new(config: GeneratorConfig<K>) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    pub fn builder() -> PreverifiedTokenGeneratorBuilder<K> {
        PreverifiedTokenGeneratorBuilder::new()
    }

    pub fn secret_key_id(&self) -> &str {
        &self.config.secret_key_id
    }

    pub fn audience(&self) -> &str {
        &self.config.audience
    }

    pub fn jku(&self) -> &str {
        &self.config.jku
    }
}

impl<K: KeyPair> PreverifiedTokenGenerator<K> {
    /// Produce a signed token asserting `email` as preverified.
    ///
    /// Fetches the current secret key once, then builds and signs the token.
    /// Key retrieval and signing failures are returned as-is; nothing is retried.
    pub async fn generate(&self, email: &str) -> Result<String, GeneratorError<K>> {
        let secret_key = self
            .config
            .key_pair
            .secret_key()
            .await
            .map_err(GenerateError::KeyRetrieval)?;

        let token = build_token(
            email,
            &self.config.jku,
            &secret_key,
            &self.config.secret_key_id,
            &self.config.audience,
        )?;

        debug!(
            kid = %self.config.secret_key_id,
            aud = %self.config.audience,
            "issued preverified email token"
        );
        Ok(token)
    }
}

impl<K> fmt::Debug for PreverifiedTokenGenerator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreverifiedTokenGenerator")
            .field("secret_key_id", &self.config.secret_key_id)
            .field("audience", &self.config.audience)
            .field("jku", &self.config.jku)
            .finish_non_exhaustive()
    }
}

pub struct PreverifiedTokenGeneratorBuilder<K> {
    config: GeneratorConfig<K>,
}

impl<K> PreverifiedTokenGeneratorBuilder<K> {
    fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
        }
    }

    pub fn key_pair(mut self, key_pair: K) -> Self {
        self.config.key_pair = Some(key_pair);
        self
    }

    pub fn secret_key_id(mut self, secret_key_id: impl Into<String>) -> Self {
        self.config.secret_key_id = Some(secret_key_id.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.config.audience = Some(audience.into());
        self
    }

    pub fn jku(mut self, jku: impl Into<String>) -> Self {
        self.config.jku = Some(jku.into());
        self
    }

    pub fn build(self) -> Result<PreverifiedTokenGenerator<K>, ConfigError> {
        PreverifiedTokenGenerator::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;
    use async_trait::async_trait;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use thiserror::Error;

    const JKU: &str = "https://issuer.example.com/.well-known/public-keys";
    const KID: &str = "kid-1";
    const AUD: &str = "https://relier.example.com";

    #[derive(Debug, Clone, Error, PartialEq)]
    enum StubError {
        #[error("key store unavailable: {0}")]
        Unavailable(String),
        #[error("key revoked")]
        Revoked,
    }

    #[derive(Clone)]
    struct StubSecret {
        revoked: bool,
    }

    impl SecretKey for StubSecret {
        type Error = StubError;

        fn sign(&self, _signing_input: &[u8]) -> Result<String, StubError> {
            if self.revoked {
                Err(StubError::Revoked)
            } else {
                Ok("c3R1Yg".to_string())
            }
        }
    }

    /// Key handle double: counts fetches and can fail retrieval or signing.
    #[derive(Default)]
    struct StubKeyPair {
        fetches: AtomicUsize,
        unavailable: Option<String>,
        revoked: bool,
    }

    #[async_trait]
    impl KeyPair for StubKeyPair {
        type SecretKey = StubSecret;
        type Error = StubError;

        async fn secret_key(&self) -> Result<StubSecret, StubError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match &self.unavailable {
                Some(reason) => Err(StubError::Unavailable(reason.clone())),
                None => Ok(StubSecret {
                    revoked: self.revoked,
                }),
            }
        }
    }

    fn generator(key_pair: StubKeyPair) -> PreverifiedTokenGenerator<StubKeyPair> {
        PreverifiedTokenGenerator::builder()
            .key_pair(key_pair)
            .secret_key_id(KID)
            .audience(AUD)
            .jku(JKU)
            .build()
            .expect("complete config")
    }

    fn decode_segment(segment: &str) -> Value {
        let bytes = URL_SAFE_NO_PAD.decode(segment).expect("base64url segment");
        serde_json::from_slice(&bytes).expect("json segment")
    }

    #[test]
    fn builder_requires_every_field() {
        let err = PreverifiedTokenGenerator::<StubKeyPair>::builder()
            .secret_key_id(KID)
            .audience(AUD)
            .jku(JKU)
            .build()
            .expect_err("key pair missing");
        assert_eq!(err, ConfigError::MissingKeyPair);

        let err = PreverifiedTokenGenerator::builder()
            .key_pair(StubKeyPair::default())
            .audience(AUD)
            .jku(JKU)
            .build()
            .expect_err("kid missing");
        assert_eq!(err, ConfigError::MissingSecretKeyId);

        let err = PreverifiedTokenGenerator::builder()
            .key_pair(StubKeyPair::default())
            .secret_key_id(KID)
            .jku(JKU)
            .build()
            .expect_err("audience missing");
        assert_eq!(err, ConfigError::MissingAudience);

        let err = PreverifiedTokenGenerator::builder()
            .key_pair(StubKeyPair::default())
            .secret_key_id(KID)
            .audience(AUD)
            .build()
            .expect_err("jku missing");
        assert_eq!(err, ConfigError::MissingJku);
    }

    #[test]
    fn new_keeps_configured_values() {
        let config = GeneratorConfig::new(StubKeyPair::default(), KID, AUD, JKU);
        let generator = PreverifiedTokenGenerator::new(config).expect("complete config");
        assert_eq!(generator.secret_key_id(), KID);
        assert_eq!(generator.audience(), AUD);
        assert_eq!(generator.jku(), JKU);
    }

    #[tokio::test]
    async fn generate_fetches_key_once_per_token() {
        let generator = generator(StubKeyPair::default());

        let token = generator.generate("user@example.com").await.expect("token");
        generator.generate("user@example.com").await.expect("token");

        assert_eq!(generator.config.key_pair.fetches.load(Ordering::SeqCst), 2);

        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(
            decode_segment(segments[0]),
            json!({"alg": "RS256", "jku": JKU, "kid": KID})
        );
        let claims = decode_segment(segments[1]);
        assert_eq!(claims["aud"], AUD);
        assert_eq!(claims["sub"], "user@example.com");
        assert_eq!(segments[2], "c3R1Yg");
    }

    #[tokio::test]
    async fn key_retrieval_failure_propagates_unchanged() {
        let generator = generator(StubKeyPair {
            unavailable: Some("hsm offline".to_string()),
            ..StubKeyPair::default()
        });

        let err = generator
            .generate("user@example.com")
            .await
            .expect_err("retrieval fails");
        assert_eq!(err.to_string(), "key store unavailable: hsm offline");
        match err {
            GenerateError::KeyRetrieval(inner) => {
                assert_eq!(inner, StubError::Unavailable("hsm offline".to_string()))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(generator.config.key_pair.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn signing_failure_propagates_unchanged() {
        let generator = generator(StubKeyPair {
            revoked: true,
            ..StubKeyPair::default()
        });

        let err = generator
            .generate("user@example.com")
            .await
            .expect_err("signing fails");
        match err {
            GenerateError::Encode(EncodeError::Signing(inner)) => {
                assert_eq!(inner, StubError::Revoked)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn debug_omits_key_handle() {
        let rendered = format!("{:?}", generator(StubKeyPair::default()));
        assert!(rendered.contains(KID));
        assert!(!rendered.contains("fetches"));
    }
}
