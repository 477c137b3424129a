use anyhow::{bail, Context};
use common_preverified_token::{PreverifiedTokenGenerator, RsaKeyPair};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries tokens only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let emails: Vec<String> = env::args().skip(1).collect();
    if emails.is_empty() {
        bail!("usage: token-issuer <email>...");
    }

    let settings = config::load_issuer_settings()?;
    let key_pair = RsaKeyPair::from_pem(&settings.private_key_pem)
        .context("failed to load preverified signing key")?;

    let generator = PreverifiedTokenGenerator::builder()
        .key_pair(key_pair)
        .secret_key_id(settings.secret_key_id)
        .audience(settings.audience)
        .jku(settings.jku)
        .build()?;

    info!(
        kid = generator.secret_key_id(),
        aud = generator.audience(),
        count = emails.len(),
        "issuing preverified email tokens"
    );

    for email in &emails {
        let token = generator
            .generate(email)
            .await
            .context("failed to issue preverified email token")?;
        println!("{token}");
    }

    Ok(())
}
