//! Error types for dashboard generation

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to list repositories of `{org}`: {source}")]
    ListRepositories {
        org: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to fetch the latest run of `{repo}`: {source}")]
    LatestRun {
        repo: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Rate limited while checking `{repo}`, aborting: {message}")]
    RateLimited { repo: String, message: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("GH_TOKEN or GITHUB_TOKEN must be set")]
    MissingToken,

    #[error("Invalid UTC offset: {0} hours")]
    InvalidOffset(i32),

    #[error("GitHub client error: {0}")]
    Client(#[from] octocrab::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
