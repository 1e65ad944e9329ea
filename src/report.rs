//! Status derivation and ordering of dashboard entries.

use std::collections::BTreeMap;

use chrono::FixedOffset;

use crate::{LatestRun, RepoRecord};

const COMMIT_SUMMARY_LEN: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Failing,
    Running,
    Cancelled,
    Passing,
    /// Any other conclusion (`skipped`, `timed_out`, ...), carrying the raw label.
    Unknown(String),
    NoCi,
}

impl RunStatus {
    pub fn from_run(run: Option<&LatestRun>) -> Self {
        let Some(run) = run else {
            return RunStatus::NoCi;
        };
        if matches!(
            run.status.as_str(),
            "in_progress" | "queued" | "waiting" | "requested" | "pending"
        ) {
            return RunStatus::Running;
        }
        match run.conclusion.as_deref() {
            Some("success") => RunStatus::Passing,
            Some("failure") => RunStatus::Failing,
            Some("cancelled") => RunStatus::Cancelled,
            Some(conclusion) if !conclusion.is_empty() => RunStatus::Unknown(conclusion.to_string()),
            _ if !run.status.is_empty() => RunStatus::Unknown(run.status.clone()),
            _ => RunStatus::Unknown("Unknown".to_string()),
        }
    }

    /// Lower sorts first on the dashboard.
    pub fn priority(&self) -> u8 {
        match self {
            RunStatus::Failing => 0,
            RunStatus::Running => 1,
            RunStatus::Cancelled => 2,
            RunStatus::Passing => 3,
            RunStatus::Unknown(_) => 4,
            RunStatus::NoCi => 5,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            RunStatus::Failing => "failure",
            RunStatus::Running => "running",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Passing => "success",
            RunStatus::Unknown(_) => "unknown",
            RunStatus::NoCi => "no_ci",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RunStatus::Failing => "Failing",
            RunStatus::Running => "Running",
            RunStatus::Cancelled => "Cancelled",
            RunStatus::Passing => "Passing",
            RunStatus::Unknown(label) => label,
            RunStatus::NoCi => "No CI",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RunStatus::Failing => "❌",
            RunStatus::Running => "🔄",
            RunStatus::Cancelled => "⏹️",
            RunStatus::Passing => "✅",
            RunStatus::Unknown(_) => "❓",
            RunStatus::NoCi => "⚠️",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunDetails {
    pub workflow: String,
    pub branch: String,
    pub commit_summary: String,
    pub commit_author: String,
    /// Run start, formatted in the dashboard's timezone.
    pub started: String,
    pub duration: String,
    pub url: String,
}

impl RunDetails {
    fn new(run: &LatestRun, offset: FixedOffset) -> Self {
        let seconds = (run.updated_at - run.created_at).num_seconds().max(0) as u64;
        Self {
            workflow: run.workflow.clone(),
            branch: run.branch.clone(),
            commit_summary: commit_summary(&run.commit_message),
            commit_author: run.commit_author.clone(),
            started: run
                .created_at
                .with_timezone(&offset)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            duration: format_duration(seconds),
            url: run.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub repo: RepoRecord,
    pub status: RunStatus,
    pub run: Option<RunDetails>,
}

impl ReportEntry {
    pub fn new(repo: RepoRecord, run: Option<LatestRun>, offset: FixedOffset) -> Self {
        Self {
            status: RunStatus::from_run(run.as_ref()),
            run: run.as_ref().map(|run| RunDetails::new(run, offset)),
            repo,
        }
    }
}

/// Orders entries by status priority, then by repository name.
pub fn sort_entries(entries: &mut [ReportEntry]) {
    entries.sort_by(|a, b| {
        a.status
            .priority()
            .cmp(&b.status.priority())
            .then_with(|| a.repo.name.cmp(&b.repo.name))
    });
}

pub fn count_statuses(entries: &[ReportEntry]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.status.key()).or_insert(0) += 1;
    }
    counts
}

pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    if minutes < 60 {
        return format!("{minutes}m {seconds}s");
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// First line of the commit message, cut to a fixed number of characters.
fn commit_summary(message: &str) -> String {
    message
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(COMMIT_SUMMARY_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn repo(name: &str) -> RepoRecord {
        RepoRecord {
            name: name.to_string(),
            url: format!("https://github.com/algojj/{name}"),
            default_branch: Some("main".to_string()),
            private: false,
            visibility: Some("public".to_string()),
            archived: false,
            created_at: None,
            updated_at: None,
            pushed_at: None,
        }
    }

    fn run(status: &str, conclusion: Option<&str>) -> LatestRun {
        LatestRun {
            workflow: "CI".to_string(),
            status: status.to_string(),
            conclusion: conclusion.map(str::to_string),
            branch: "main".to_string(),
            commit_message: "Fix the build\n\nLonger body".to_string(),
            commit_author: "octocat".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 10, 17, 12, 3, 25).unwrap(),
            url: "https://github.com/algojj/a/actions/runs/1".to_string(),
        }
    }

    fn offset() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn status_is_derived_from_run() {
        assert_eq!(RunStatus::from_run(None), RunStatus::NoCi);
        assert_eq!(
            RunStatus::from_run(Some(&run("in_progress", None))),
            RunStatus::Running
        );
        assert_eq!(
            RunStatus::from_run(Some(&run("queued", None))),
            RunStatus::Running
        );
        assert_eq!(
            RunStatus::from_run(Some(&run("completed", Some("success")))),
            RunStatus::Passing
        );
        assert_eq!(
            RunStatus::from_run(Some(&run("completed", Some("failure")))),
            RunStatus::Failing
        );
        assert_eq!(
            RunStatus::from_run(Some(&run("completed", Some("cancelled")))),
            RunStatus::Cancelled
        );
        assert_eq!(
            RunStatus::from_run(Some(&run("completed", Some("timed_out")))),
            RunStatus::Unknown("timed_out".to_string())
        );
        assert_eq!(
            RunStatus::from_run(Some(&run("completed", None))),
            RunStatus::Unknown("completed".to_string())
        );
    }

    #[test]
    fn entries_sort_by_priority_then_name() {
        let mut entries = vec![
            ReportEntry::new(repo("zeta"), None, offset()),
            ReportEntry::new(repo("beta"), Some(run("completed", Some("success"))), offset()),
            ReportEntry::new(repo("alpha"), Some(run("completed", Some("success"))), offset()),
            ReportEntry::new(repo("gamma"), Some(run("queued", None)), offset()),
            ReportEntry::new(repo("omega"), Some(run("completed", Some("failure"))), offset()),
            ReportEntry::new(repo("delta"), None, offset()),
        ];
        sort_entries(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.repo.name.as_str()).collect();
        assert_eq!(names, ["omega", "gamma", "alpha", "beta", "delta", "zeta"]);
    }

    #[test]
    fn failing_passing_and_no_runs() {
        let mut entries = vec![
            ReportEntry::new(repo("repoC"), None, offset()),
            ReportEntry::new(repo("repoB"), Some(run("completed", Some("success"))), offset()),
            ReportEntry::new(repo("repoA"), Some(run("completed", Some("failure"))), offset()),
        ];
        sort_entries(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.repo.name.as_str()).collect();
        assert_eq!(names, ["repoA", "repoB", "repoC"]);
    }

    #[test]
    fn run_details() {
        let entry = ReportEntry::new(repo("a"), Some(run("completed", Some("success"))), offset());
        let details = entry.run.unwrap();
        assert_eq!(details.commit_summary, "Fix the build");
        assert_eq!(details.started, "2026-10-17 09:00");
        assert_eq!(details.duration, "3m 25s");
        assert!(ReportEntry::new(repo("b"), None, offset()).run.is_none());
    }

    #[test]
    fn commit_summary_is_truncated() {
        let long = "x".repeat(200);
        assert_eq!(commit_summary(&long).chars().count(), COMMIT_SUMMARY_LEN);
        assert_eq!(commit_summary(""), "");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1m 0s");
        assert_eq!(format_duration(3599), "59m 59s");
        assert_eq!(format_duration(3600), "1h 0m");
        assert_eq!(format_duration(7385), "2h 3m");
    }

    #[test]
    fn counts_by_key() {
        let entries = vec![
            ReportEntry::new(repo("a"), None, offset()),
            ReportEntry::new(repo("b"), None, offset()),
            ReportEntry::new(repo("c"), Some(run("completed", Some("failure"))), offset()),
        ];
        let counts = count_statuses(&entries);
        assert_eq!(counts.get("no_ci"), Some(&2));
        assert_eq!(counts.get("failure"), Some(&1));
        assert_eq!(counts.get("success"), None);
    }
}
