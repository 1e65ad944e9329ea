//! One generation of the dashboard: fetch, aggregate, write.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use futures_util::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::error::{DashboardError, Result};
use crate::github::{CiSource, RateLimited};
use crate::render::{render_html, render_status_json};
use crate::report::{count_statuses, sort_entries, ReportEntry};

pub const HTML_FILE: &str = "index.html";
pub const STATUS_FILE: &str = "status.json";

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub org: String,
    pub generated_at: DateTime<FixedOffset>,
    pub entries: Vec<ReportEntry>,
}

impl Dashboard {
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        count_statuses(&self.entries)
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Writes `index.html` and `status.json` into `dir`, creating it if needed.
    ///
    /// Both files are staged next to their targets before either is renamed,
    /// so a failed write leaves the previous generation in place.
    pub fn write(&self, dir: &Path) -> Result<()> {
        let files = [
            (HTML_FILE, render_html(self)),
            (STATUS_FILE, render_status_json(self)?),
        ];
        fs::create_dir_all(dir).map_err(|source| DashboardError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());
        for (name, contents) in &files {
            let path = dir.join(name);
            let tmp = tmp_path(&path);
            if let Err(source) = fs::write(&tmp, contents) {
                let _ = fs::remove_file(&tmp);
                discard(&staged);
                return Err(DashboardError::Write { path: tmp, source });
            }
            staged.push((tmp, path));
        }

        for (tmp, path) in &staged {
            fs::rename(tmp, path).map_err(|source| {
                discard(&staged);
                DashboardError::Write {
                    path: path.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

/// Lists the repositories of `org` and looks up the latest run of each.
///
/// A failed listing aborts the generation, and so does a rate-limited lookup.
/// Any other failed run lookup only downgrades that repository to "no CI".
/// At most `concurrency` lookups are in flight, and results keep the listing
/// order until they are sorted.
pub async fn generate<S>(
    source: &S,
    org: &str,
    generated_at: DateTime<FixedOffset>,
    concurrency: usize,
) -> Result<Dashboard>
where
    S: CiSource + ?Sized,
{
    info!("Fetching repos for org '{org}'...");
    let repos = source
        .list_repositories(org)
        .await
        .map_err(|source| DashboardError::ListRepositories {
            org: org.to_string(),
            source,
        })?;
    info!("Found {} repos", repos.len());

    let offset = *generated_at.offset();
    let mut entries: Vec<ReportEntry> = stream::iter(repos)
        .map(|repo| async move {
            debug!("Checking {}...", repo.name);
            let run = match source.latest_run(org, &repo.name).await {
                Ok(run) => run,
                Err(source) => {
                    if let Some(RateLimited(message)) = source.downcast_ref::<RateLimited>() {
                        return Err(DashboardError::RateLimited {
                            repo: repo.name.clone(),
                            message: message.clone(),
                        });
                    }
                    let error = DashboardError::LatestRun {
                        repo: repo.name.clone(),
                        source,
                    };
                    warn!("{error}, reporting it without CI");
                    None
                }
            };
            Ok(ReportEntry::new(repo, run, offset))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;
    sort_entries(&mut entries);

    Ok(Dashboard {
        org: org.to_string(),
        generated_at,
        entries,
    })
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
