use std::path::PathBuf;

use chrono::FixedOffset;
use clap::Parser;
use tracing::Level;

use crate::error::{DashboardError, Result};

/// Generate a static CI status dashboard for every repository of a GitHub organization.
#[derive(Parser, Debug, Clone)]
#[command(name = "generate-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Config {
    /// Organization whose repositories are listed
    #[arg(long, env = "ORG_NAME", default_value = "algojj")]
    pub org: String,

    /// Token with read access to repositories and their Actions runs
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub gh_token: Option<String>,

    /// Used when GH_TOKEN is not set
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Alternative API root, e.g. a GitHub Enterprise server
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Directory receiving index.html and status.json
    #[arg(long, env = "DASHBOARD_OUTPUT_DIR", default_value = "/tmp/dashboard")]
    pub output_dir: PathBuf,

    /// Timezone of the timestamps shown on the dashboard, in hours east of UTC
    #[arg(
        long,
        env = "DASHBOARD_UTC_OFFSET_HOURS",
        default_value_t = -3,
        allow_hyphen_values = true
    )]
    pub utc_offset_hours: i32,

    /// Number of run lookups in flight at once
    #[arg(long, env = "DASHBOARD_CONCURRENCY", default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "DASHBOARD_JSON_LOGS")]
    pub json_logs: bool,

    /// Verbosity when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, env = "DASHBOARD_LOG_LEVEL", default_value = "info")]
    pub log_level: Level,
}

impl Config {
    pub fn token(&self) -> Result<&str> {
        [&self.gh_token, &self.github_token]
            .into_iter()
            .flatten()
            .map(|token| token.trim())
            .find(|token| !token.is_empty())
            .ok_or(DashboardError::MissingToken)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(DashboardError::InvalidOffset(self.utc_offset_hours))
    }
}
