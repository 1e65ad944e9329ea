use chrono::{DateTime, Utc};

pub mod config;
pub mod dashboard;
pub mod error;
pub mod github;
pub mod render;
pub mod report;
pub mod telemetry;

pub use dashboard::{generate, Dashboard};
pub use error::{DashboardError, Result};
pub use github::{CiSource, GitHubSource, RateLimited};
pub use report::{ReportEntry, RunStatus};

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct RepoRecord {
    pub name: String,
    pub url: String,
    pub default_branch: Option<String>,
    pub private: bool,
    pub visibility: Option<String>,
    pub archived: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// The most recent workflow run of a repository, as reported by the Actions API.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestRun {
    pub workflow: String,
    pub status: String,
    pub conclusion: Option<String>,
    pub branch: String,
    pub commit_message: String,
    pub commit_author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
}
