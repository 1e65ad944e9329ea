use async_trait::async_trait;
use octocrab::models::workflows::Run;
use octocrab::models::Repository;
use octocrab::Octocrab;
use thiserror::Error;

use crate::error::Result;
use crate::{LatestRun, RepoRecord};

/// Where repositories and their latest CI runs come from.
#[async_trait]
pub trait CiSource: Send + Sync {
    /// Every repository of `org`, across all pages.
    async fn list_repositories(&self, org: &str) -> anyhow::Result<Vec<RepoRecord>>;

    /// The most recent workflow run of `org/repo`, or `None` when it has never run one.
    ///
    /// Returning [`RateLimited`] aborts the whole generation instead of
    /// downgrading the repository.
    async fn latest_run(&self, org: &str, repo: &str) -> anyhow::Result<Option<LatestRun>>;
}

/// The API refused a request because the token's quota is exhausted.
#[derive(Error, Debug)]
#[error("GitHub rate limit exceeded: {0}")]
pub struct RateLimited(pub String);

pub struct GitHubSource {
    client: Octocrab,
}

impl GitHubSource {
    pub fn new(token: &str, api_url: Option<&str>) -> Result<Self> {
        let mut builder = octocrab::OctocrabBuilder::new().personal_token(token.to_string());
        if let Some(api_url) = api_url {
            builder = builder.base_uri(api_url)?;
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl CiSource for GitHubSource {
    async fn list_repositories(&self, org: &str) -> anyhow::Result<Vec<RepoRecord>> {
        let mut gh_repos = vec![];
        let mut page = 1u32;
        loop {
            let mut repos = self
                .client
                .orgs(org)
                .list_repos()
                .page(page)
                .per_page(100)
                .send()
                .await
                .map_err(api_error)?;
            for repo in repos.take_items() {
                gh_repos.push(repo_record(org, repo));
            }

            if repos.next.is_none() {
                break;
            } else {
                page += 1;
            }
        }
        Ok(gh_repos)
    }

    async fn latest_run(&self, org: &str, repo: &str) -> anyhow::Result<Option<LatestRun>> {
        let mut runs = self
            .client
            .workflows(org, repo)
            .list_all_runs()
            .per_page(1)
            .send()
            .await
            .map_err(api_error)?;
        Ok(runs.take_items().into_iter().next().map(LatestRun::from))
    }
}

/// Keeps the API message and drops the backtrace octocrab appends to its `Display`.
fn api_error(error: octocrab::Error) -> anyhow::Error {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            if source.message.to_lowercase().contains("rate limit") {
                RateLimited(source.message).into()
            } else {
                anyhow::anyhow!("GitHub API error: {}", source.message)
            }
        }
        other => match std::error::Error::source(&other) {
            Some(inner) => anyhow::anyhow!("{inner}"),
            None => anyhow::anyhow!("{other}"),
        },
    }
}

fn repo_record(org: &str, repo: Repository) -> RepoRecord {
    RepoRecord {
        url: repo
            .html_url
            .map(|url| url.to_string())
            .unwrap_or_else(|| format!("https://github.com/{org}/{}", repo.name)),
        name: repo.name,
        default_branch: repo.default_branch,
        private: repo.private.unwrap_or(false),
        visibility: repo.visibility,
        archived: repo.archived.unwrap_or(false),
        created_at: repo.created_at,
        updated_at: repo.updated_at,
        pushed_at: repo.pushed_at,
    }
}

impl From<Run> for LatestRun {
    fn from(run: Run) -> Self {
        Self {
            workflow: run.name,
            status: run.status,
            conclusion: run.conclusion,
            branch: run.head_branch,
            commit_message: run.head_commit.message,
            commit_author: run.head_commit.author.name,
            created_at: run.created_at,
            updated_at: run.updated_at,
            url: run.html_url.to_string(),
        }
    }
}
