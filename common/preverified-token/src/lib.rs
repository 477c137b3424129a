pub mod claims;
pub mod config;
pub mod encoder;
pub mod error;
pub mod generator;
pub mod keys;

pub use claims::{PreverifiedClaims, TokenHeader, RS256, TOKEN_LIFETIME_MS};
pub use config::GeneratorConfig;
pub use encoder::{build_token, build_token_at};
pub use error::{ConfigError, EncodeError, GenerateError};
pub use generator::{GeneratorError, PreverifiedTokenGenerator, PreverifiedTokenGeneratorBuilder};
pub use keys::{KeyError, KeyPair, RsaKeyPair, RsaSecretKey, SecretKey};
