//! `knock`: present a key to a running gate and report what it hands back.

use anyhow::{Context, Result};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use url::Url;

pub async fn cmd_knock(target: &str, key: &str) -> Result<()> {
    let base = Url::parse(target).with_context(|| format!("invalid url: {}", target))?;
    let mut with_key = base.clone();
    with_key.query_pairs_mut().append_pair("key", key);

    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .context("failed to build http client")?;

    let resp = client
        .get(with_key)
        .send()
        .await
        .with_context(|| format!("failed to connect to gate at {} (is it running?)", base))?;

    let status = resp.status();
    let cookie = resp
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    println!("═══════════════════════════════════════");
    println!("  Knock");
    println!("═══════════════════════════════════════");
    println!("  Target : {}", base);
    println!("  Status : {}", status);

    let Some(cookie) = cookie else {
        if status == StatusCode::FORBIDDEN {
            let detail = resp.text().await.unwrap_or_default();
            println!("  Denied : {}", detail.trim());
        } else {
            println!("  No session cookie issued.");
        }
        return Ok(());
    };
    println!("  Cookie : {}", cookie);

    // Replay the session pair alone to confirm the gate now admits us.
    let pair = cookie.split(';').next().unwrap_or_default().trim().to_string();
    let replay = client
        .get(base)
        .header(COOKIE, pair)
        .send()
        .await
        .context("failed to replay session cookie")?;

    if replay.status() == StatusCode::FORBIDDEN {
        println!("  Replay : rejected ({})", replay.status());
    } else {
        println!("  Replay : admitted ({})", replay.status());
    }

    Ok(())
}
