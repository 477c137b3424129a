use thiserror::Error;

/// Returned when a generator is constructed without one of its required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("key_pair must be specified")]
    MissingKeyPair,
    #[error("secret_key_id must be specified")]
    MissingSecretKeyId,
    #[error("audience must be specified")]
    MissingAudience,
    #[error("jku must be specified")]
    MissingJku,
}

impl ConfigError {
    /// Name of the configuration field that was missing.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::MissingKeyPair => "key_pair",
            ConfigError::MissingSecretKeyId => "secret_key_id",
            ConfigError::MissingAudience => "audience",
            ConfigError::MissingJku => "jku",
        }
    }
}

/// Failure while encoding or signing a single token.
///
/// `S` is the signing error of the secret key in use; it is carried as-is.
#[derive(Debug, Error)]
pub enum EncodeError<S> {
    #[error("failed to serialize token segment: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Signing(S),
}

/// Failure of [`PreverifiedTokenGenerator::generate`](crate::PreverifiedTokenGenerator::generate).
///
/// `K` is the key handle's retrieval error and `S` the secret key's signing
/// error. Both are surfaced untouched so callers can match on the original value.
#[derive(Debug, Error)]
pub enum GenerateError<K, S> {
    #[error(transparent)]
    KeyRetrieval(K),
    #[error(transparent)]
    Encode(#[from] EncodeError<S>),
}

impl<K, S> GenerateError<K, S> {
    /// The key retrieval error, if that is what failed.
    pub fn key_retrieval(&self) -> Option<&K> {
        match self {
            GenerateError::KeyRetrieval(err) => Some(err),
            GenerateError::Encode(_) => None,
        }
    }

    /// The signing error, if the secret key refused to sign.
    pub fn signing(&self) -> Option<&S> {
        match self {
            GenerateError::Encode(EncodeError::Signing(err)) => Some(err),
            _ => None,
        }
    }
}
