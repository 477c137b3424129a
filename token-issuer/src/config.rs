use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;

pub const SECRET_KEY_ID_VAR: &str = "PREVERIFIED_SECRET_KEY_ID";
pub const AUDIENCE_VAR: &str = "PREVERIFIED_AUDIENCE";
pub const JKU_VAR: &str = "PREVERIFIED_JKU";
pub const PRIVATE_KEY_PEM_VAR: &str = "PREVERIFIED_PRIVATE_KEY_PEM";
pub const PRIVATE_KEY_PATH_VAR: &str = "PREVERIFIED_PRIVATE_KEY_PATH";

#[derive(Clone)]
pub struct IssuerSettings {
    pub secret_key_id: String,
    pub audience: String,
    pub jku: String,
    pub private_key_pem: String,
}

impl std::fmt::Debug for IssuerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerSettings")
            .field("secret_key_id", &self.secret_key_id)
            .field("audience", &self.audience)
            .field("jku", &self.jku)
            .field("private_key_pem", &"***redacted***")
            .finish()
    }
}

pub fn load_issuer_settings() -> Result<IssuerSettings> {
    settings_from(|name| env::var(name).ok())
}

pub fn settings_from<F>(lookup: F) -> Result<IssuerSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let secret_key_id = required(&lookup, SECRET_KEY_ID_VAR)?;
    let audience = required(&lookup, AUDIENCE_VAR)?;
    let jku = required(&lookup, JKU_VAR)?;

    // Inline PEM wins over a key file when both are set.
    let private_key_pem = match non_empty(lookup(PRIVATE_KEY_PEM_VAR)) {
        Some(pem) => pem,
        None => {
            let path = non_empty(lookup(PRIVATE_KEY_PATH_VAR)).ok_or_else(|| {
                anyhow!("{PRIVATE_KEY_PEM_VAR} or {PRIVATE_KEY_PATH_VAR} must be set")
            })?;
            fs::read_to_string(&path)
                .with_context(|| format!("failed to read private key from {path}"))?
        }
    };

    Ok(IssuerSettings {
        secret_key_id,
        audience,
        jku,
        private_key_pem,
    })
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(name)).ok_or_else(|| anyhow!("{name} must be set"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
