use anyhow::{Context, Result};
use gcpkit::Gcp;

pub async fn run(gcp: &Gcp, self_signed: bool) -> Result<()> {
    let token = if self_signed {
        gcp.self_signed_token(None)
            .context("Failed to sign JWT access token")?
    } else {
        gcp.access_token(None)
            .await
            .context("Failed to obtain access token")?
    };
    println!("{}", serde_json::to_string_pretty(&token)?);
    Ok(())
}
