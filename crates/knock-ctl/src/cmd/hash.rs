//! `hash`: produce a `gate.key_hash` value for the config file.

use anyhow::{Context, Result};

use knock_core::secret::hash_secret;

pub fn cmd_hash(secret: &str) -> Result<()> {
    if secret.is_empty() {
        anyhow::bail!("refusing to hash an empty secret");
    }
    let hash = hash_secret(secret).context("failed to hash secret")?;

    println!("{hash}");
    eprintln!();
    eprintln!("Add to config.toml:");
    eprintln!("  [gate]");
    eprintln!("  key_hash = \"{hash}\"");
    Ok(())
}
