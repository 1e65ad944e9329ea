use anyhow::Context;
use clap::Parser;
use tracing::info;

use ci_dashboard::config::Config;
use ci_dashboard::telemetry::init_tracing;
use ci_dashboard::GitHubSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.json_logs, config.log_level)
        .context("Cannot install the log subscriber")?;

    let token = config.token()?;
    let offset = config.utc_offset()?;
    let source = GitHubSource::new(token, config.api_url.as_deref())?;

    let generated_at = chrono::Utc::now().with_timezone(&offset);
    let dashboard = ci_dashboard::generate(
        &source,
        &config.org,
        generated_at,
        usize::from(config.concurrency),
    )
    .await?;

    dashboard.write(&config.output_dir).with_context(|| {
        format!(
            "Cannot publish the dashboard to {}",
            config.output_dir.display()
        )
    })?;

    info!(
        "Dashboard generated: {} repos in {}",
        dashboard.entries.len(),
        config.output_dir.display()
    );
    for (status, count) in dashboard.counts() {
        info!("  {status}: {count}");
    }

    Ok(())
}
