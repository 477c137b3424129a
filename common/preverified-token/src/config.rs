use crate::error::ConfigError;

/// Issuance configuration handed to [`PreverifiedTokenGenerator::new`](crate::PreverifiedTokenGenerator::new).
///
/// Every field is required. String fields that are present but empty count as
/// missing.
#[derive(Debug, Clone)]
pub struct GeneratorConfig<K> {
    /// Handle yielding the current signing secret.
    pub key_pair: Option<K>,
    /// Key id (`kid`) verifiers use to pick the public key.
    pub secret_key_id: Option<String>,
    /// Intended relying party (`aud`).
    pub audience: Option<String>,
    /// Where the public key set is published (`jku`).
    pub jku: Option<String>,
}

impl<K> Default for GeneratorConfig<K> {
    fn default() -> Self {
        Self {
            key_pair: None,
            secret_key_id: None,
            audience: None,
            jku: None,
        }
    }
}

impl<K> GeneratorConfig<K> {
    /// Construct a config with every field populated.
    pub fn new(
        key_pair: K,
        secret_key_id: impl Into<String>,
        audience: impl Into<String>,
        jku: impl Into<String>,
    ) -> Self {
        Self {
            key_pair: Some(key_pair),
            secret_key_id: Some(secret_key_id.into()),
            audience: Some(audience.into()),
            jku: Some(jku.into()),
        }
    }

    pub(crate) fn validate(self) -> Result<IssuanceConfig<K>, ConfigError> {
        let key_pair = self.key_pair.ok_or(ConfigError::MissingKeyPair)?;
        let secret_key_id = required(self.secret_key_id, ConfigError::MissingSecretKeyId)?;
        let audience = required(self.audience, ConfigError::MissingAudience)?;
        let jku = required(self.jku, ConfigError::MissingJku)?;

        Ok(IssuanceConfig {
            key_pair,
            secret_key_id,
            audience,
            jku,
        })
    }
}

fn required(value: Option<String>, missing: ConfigError) -> Result<String, ConfigError> {
    value.filter(|value| !value.is_empty()).ok_or(missing)
}

/// Validated configuration owned by a single generator.
pub(crate) struct IssuanceConfig<K> {
    pub(crate) key_pair: K,
    pub(crate) secret_key_id: String,
    pub(crate) audience: String,
    pub(crate) jku: String,
}
