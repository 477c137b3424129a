use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{crypto, Algorithm, EncodingKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use thiserror::Error;

/// A signing secret bound to RS256.
///
/// `sign` returns the signature already encoded for the third token segment.
pub trait SecretKey: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn sign(&self, signing_input: &[u8]) -> Result<String, Self::Error>;
}

/// Asynchronous access to the current signing secret.
#[async_trait]
pub trait KeyPair: Send + Sync {
    type SecretKey: SecretKey;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve the secret key to sign with right now. Called once per token.
    async fn secret_key(&self) -> Result<Self::SecretKey, Self::Error>;
}

#[async_trait]
impl<K: KeyPair> KeyPair for Arc<K> {
    type SecretKey = K::SecretKey;
    type Error = K::Error;

    async fn secret_key(&self) -> Result<Self::SecretKey, Self::Error> {
        self.as_ref().secret_key().await
    }
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("failed to parse RSA private key: {0}")]
    Parse(String),
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

/// Key handle over a single RSA private key loaded at startup.
#[derive(Clone)]
pub struct RsaKeyPair {
    encoding_key: Arc<EncodingKey>,
}

impl RsaKeyPair {
    /// Load a PEM-encoded RSA private key, PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8 (`PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let private_key = match RsaPrivateKey::from_pkcs1_pem(pem) {
            Ok(key) => key,
            Err(_) => RsaPrivateKey::from_pkcs8_pem(pem)
                .map_err(|err| KeyError::Parse(err.to_string()))?,
        };
        Self::from_private_key(&private_key)
    }

    pub fn from_private_key(private_key: &RsaPrivateKey) -> Result<Self, KeyError> {
        let der = private_key
            .to_pkcs1_der()
            .map_err(|err| KeyError::Parse(err.to_string()))?;
        Ok(Self::from_encoding_key(EncodingKey::from_rsa_der(
            der.as_bytes(),
        )))
    }

    /// Wrap an already parsed key. It must hold RSA material.
    pub fn from_encoding_key(encoding_key: EncodingKey) -> Self {
        Self {
            encoding_key: Arc::new(encoding_key),
        }
    }
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("encoding_key", &"***redacted***")
            .finish()
    }
}

#[async_trait]
impl KeyPair for RsaKeyPair {
    type SecretKey = RsaSecretKey;
    type Error = KeyError;

    async fn secret_key(&self) -> Result<RsaSecretKey, KeyError> {
        Ok(RsaSecretKey {
            encoding_key: Arc::clone(&self.encoding_key),
        })
    }
}

/// RS256 signer handed out by [`RsaKeyPair`].
#[derive(Clone)]
pub struct RsaSecretKey {
    encoding_key: Arc<EncodingKey>,
}

impl std::fmt::Debug for RsaSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSecretKey")
            .field("encoding_key", &"***redacted***")
            .finish()
    }
}

impl SecretKey for RsaSecretKey {
    type Error = KeyError;

    /// Base64url (unpadded) RS256 signature over `signing_input`.
    fn sign(&self, signing_input: &[u8]) -> Result<String, KeyError> {
        crypto::sign(signing_input, &self.encoding_key, Algorithm::RS256).map_err(KeyError::Sign)
    }
}
