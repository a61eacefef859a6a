use anyhow::{Context, Result};
use gcpkit::Gcp;

pub async fn run(gcp: &Gcp, project: Option<&str>, query: &str) -> Result<()> {
    let project = match project {
        Some(p) => p.to_string(),
        None => gcp.clients().project_id()?,
    };
    let series = gcp
        .query_time_series(&project, query)
        .await
        .with_context(|| format!("Failed to query time series in {}", project))?;
    eprintln!("{} time series", series.len());
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}
