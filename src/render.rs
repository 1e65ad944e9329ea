//! HTML and JSON renditions of a [`Dashboard`].
//!
//! Rendering is a pure function of the dashboard: the same entries and
//! timestamp always produce the same bytes.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::report::{ReportEntry, RunStatus};
use crate::RepoRecord;

const STYLE: &str = r#"* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, monospace; background: #0d1117; color: #c9d1d9; min-height: 100vh; }
.header { background: #161b22; border-bottom: 1px solid #30363d; padding: 20px 24px; }
.header-top { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 12px; }
.title { font-size: 24px; font-weight: 700; color: #f0f6fc; }
.title span { color: #58a6ff; }
.health-badge { font-size: 14px; font-weight: 700; padding: 6px 16px; border-radius: 20px; }
.health-ok { background: #4caf5022; color: #4caf50; border: 1px solid #4caf5044; }
.health-bad { background: #f4433622; color: #f44336; border: 1px solid #f4433644; }
.stats { display: flex; gap: 16px; margin-top: 12px; flex-wrap: wrap; }
.stat { font-size: 13px; padding: 4px 12px; border-radius: 12px; background: #21262d; border: 1px solid #30363d; }
.stat-total, .stat-noci, .stat-other { color: #8b949e; }
.stat-pass { color: #3fb950; }
.stat-fail { color: #f85149; }
.stat-run { color: #d29922; }
.timestamp { font-size: 12px; color: #8b949e; margin-top: 8px; }
.container { padding: 16px 24px; overflow-x: auto; }
table { width: 100%; border-collapse: collapse; font-size: 14px; }
th { text-align: left; padding: 10px 12px; background: #161b22; border-bottom: 2px solid #30363d; color: #8b949e; font-weight: 600; font-size: 12px; text-transform: uppercase; letter-spacing: 0.5px; position: sticky; top: 0; z-index: 1; }
td { padding: 10px 12px; border-bottom: 1px solid #21262d; vertical-align: middle; }
tr:hover { background: #161b2288; }
.empty { color: #8b949e; text-align: center; padding: 24px; }
.status-cell { white-space: nowrap; font-weight: 600; min-width: 110px; }
.status-icon { font-size: 16px; }
.status-failure .status-cell { color: #f85149; }
.status-success .status-cell { color: #3fb950; }
.status-running .status-cell { color: #d29922; }
.status-no_ci .status-cell, .status-cancelled .status-cell, .status-unknown .status-cell { color: #8b949e; }
.status-failure { background: #f8514908; }
.repo-link { color: #58a6ff; text-decoration: none; font-weight: 600; }
.repo-link:hover { text-decoration: underline; }
.run-link { color: #8b949e; text-decoration: none; font-size: 12px; padding: 3px 8px; border: 1px solid #30363d; border-radius: 6px; white-space: nowrap; }
.run-link:hover { background: #21262d; color: #58a6ff; border-color: #58a6ff; }
.branch-cell { color: #7ee787; font-family: monospace; font-size: 12px; }
.commit-cell { max-width: 300px; }
.commit-msg { color: #c9d1d9; font-size: 13px; display: -webkit-box; -webkit-line-clamp: 1; -webkit-box-orient: vertical; overflow: hidden; }
.commit-date { color: #8b949e; font-size: 11px; }
.duration-cell { color: #8b949e; font-family: monospace; font-size: 12px; white-space: nowrap; }
.action-cell { white-space: nowrap; display: flex; align-items: center; gap: 6px; }
.copy-btn { background: none; border: 1px solid #30363d; border-radius: 6px; padding: 3px 6px; cursor: pointer; font-size: 14px; color: #8b949e; line-height: 1; }
.copy-btn:hover { background: #21262d; border-color: #58a6ff; }
.copy-btn.copied { border-color: #3fb950; }
@media (max-width: 768px) {
  .header { padding: 16px; }
  .container { padding: 12px; }
  .branch-cell, .duration-cell { display: none; }
  .commit-cell { max-width: 160px; }
  td, th { padding: 8px 6px; }
}
@media (max-width: 480px) {
  .commit-cell { display: none; }
  .title { font-size: 18px; }
}"#;

const SCRIPT: &str = r#"document.querySelectorAll('.copy-btn').forEach(function(btn) {
  btn.addEventListener('click', function() {
    navigator.clipboard.writeText(btn.getAttribute('data-copy')).then(function() {
      btn.textContent = '✅';
      btn.classList.add('copied');
      setTimeout(function() { btn.textContent = '📋'; btn.classList.remove('copied'); }, 2000);
    });
  });
});"#;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn render_html(dashboard: &Dashboard) -> String {
    let org = escape_html(&dashboard.org);
    let counts = dashboard.counts();
    let count = |key: &str| counts.get(key).copied().unwrap_or(0);
    let total = dashboard.entries.len();
    let failing = count("failure");
    let passing = count("success");
    let running = count("running");
    let no_ci = count("no_ci");
    let other = total - failing - passing - running - no_ci;

    let (health, health_class) = if failing == 0 {
        ("ALL GREEN".to_string(), "health-ok")
    } else {
        (format!("{failing} FAILING"), "health-bad")
    };

    let mut rows = String::new();
    for entry in &dashboard.entries {
        render_row(&mut rows, &dashboard.org, entry);
    }
    if dashboard.entries.is_empty() {
        rows.push_str("\n    <tr><td colspan=\"6\" class=\"empty\">No repositories found</td></tr>");
    }

    let other_stat = if other > 0 {
        format!("\n    <span class=\"stat stat-other\">⏹️ {other} other</span>")
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>CI Status — {org}</title>
<style>
{STYLE}
</style>
</head>
<body>
<div class="header">
  <div class="header-top">
    <div class="title">⚡ <span>{org}</span> CI Status</div>
    <div class="health-badge {health_class}">{health}</div>
  </div>
  <div class="stats">
    <span class="stat stat-total">{total} repos</span>
    <span class="stat stat-pass">✅ {passing} passing</span>
    <span class="stat stat-fail">❌ {failing} failing</span>
    <span class="stat stat-run">🔄 {running} running</span>
    <span class="stat stat-noci">⚠️ {no_ci} without CI</span>{other_stat}
  </div>
  <div class="timestamp">Last updated: {timestamp} (UTC{offset})</div>
</div>
<div class="container">
<table>
<thead>
  <tr>
    <th>Status</th>
    <th>Repository</th>
    <th>Branch</th>
    <th>Last Commit</th>
    <th>Duration</th>
    <th>Actions</th>
  </tr>
</thead>
<tbody>{rows}
</tbody>
</table>
</div>
<script>
{SCRIPT}
</script>
</body>
</html>
"#,
        timestamp = dashboard.timestamp(),
        offset = dashboard.generated_at.offset(),
    )
}

fn render_row(out: &mut String, org: &str, entry: &ReportEntry) {
    let status = &entry.status;
    let lock = if entry.repo.private { " 🔒" } else { "" };
    let (branch, commit, duration, actions) = match &entry.run {
        Some(run) => {
            let mut actions = format!(
                r#"<a href="{}" target="_blank" class="run-link">View Run</a>"#,
                escape_html(&run.url)
            );
            if let Some(prompt) = triage_prompt(org, entry) {
                let _ = write!(
                    actions,
                    r#" <button class="copy-btn" data-copy="{}" title="Copy triage prompt">📋</button>"#,
                    escape_html(&prompt)
                );
            }
            (
                escape_html(&run.branch),
                format!(
                    r#"<span class="commit-msg" title="{author}">{summary}</span><br><span class="commit-date">{started}</span>"#,
                    author = escape_html(&run.commit_author),
                    summary = escape_html(&run.commit_summary),
                    started = escape_html(&run.started),
                ),
                escape_html(&run.duration),
                actions,
            )
        }
        None => Default::default(),
    };

    let _ = write!(
        out,
        r#"
    <tr class="status-{key}">
      <td class="status-cell"><span class="status-icon">{icon}</span> {label}</td>
      <td><a href="{url}" target="_blank" class="repo-link">{name}</a>{lock}</td>
      <td class="branch-cell">{branch}</td>
      <td class="commit-cell">{commit}</td>
      <td class="duration-cell">{duration}</td>
      <td class="action-cell">{actions}</td>
    </tr>"#,
        key = status.key(),
        icon = status.icon(),
        label = escape_html(status.label()),
        url = escape_html(&entry.repo.url),
        name = escape_html(&entry.repo.name),
    );
}

/// A ready-to-paste request for investigating a failed or cancelled run.
fn triage_prompt(org: &str, entry: &ReportEntry) -> Option<String> {
    let outcome = match entry.status {
        RunStatus::Failing => "failed",
        RunStatus::Cancelled => "was cancelled",
        _ => return None,
    };
    let run = entry.run.as_ref()?;
    Some(format!(
        "The \"{}\" pipeline {outcome} in {org}/{}, branch: {}, commit: \"{}\" ({}). Run: {}. Please check the workflow logs and tell me what happened.",
        run.workflow, entry.repo.name, run.branch, run.commit_summary, run.started, run.url,
    ))
}

#[derive(serde::Serialize)]
struct StatusDocument<'a> {
    timestamp: String,
    total: usize,
    counts: BTreeMap<&'static str, usize>,
    repos: Vec<StatusRepo<'a>>,
}

#[derive(serde::Serialize)]
struct StatusRepo<'a> {
    #[serde(flatten)]
    repo: &'a RepoRecord,
    status_key: &'static str,
    status_label: &'a str,
    status_icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    workflow: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_msg: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<&'a str>,
}

pub fn render_status_json(dashboard: &Dashboard) -> Result<String> {
    let repos = dashboard
        .entries
        .iter()
        .map(|entry| {
            let run = entry.run.as_ref();
            StatusRepo {
                repo: &entry.repo,
                status_key: entry.status.key(),
                status_label: entry.status.label(),
                status_icon: entry.status.icon(),
                run_url: run.map(|run| run.url.as_str()),
                workflow: run.map(|run| run.workflow.as_str()),
                branch: run.map(|run| run.branch.as_str()),
                commit_msg: run.map(|run| run.commit_summary.as_str()),
                commit_date: run.map(|run| run.started.as_str()),
                duration: run.map(|run| run.duration.as_str()),
            }
        })
        .collect();
    let document = StatusDocument {
        timestamp: dashboard.timestamp(),
        total: dashboard.entries.len(),
        counts: dashboard.counts(),
        repos,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::*;
    use crate::LatestRun;

    fn dashboard(entries: Vec<ReportEntry>) -> Dashboard {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        Dashboard {
            org: "algojj".to_string(),
            generated_at: offset.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap(),
            entries,
        }
    }

    fn entry(name: &str, conclusion: Option<&str>, private: bool) -> ReportEntry {
        let repo = RepoRecord {
            name: name.to_string(),
            url: format!("https://github.com/algojj/{name}"),
            default_branch: Some("main".to_string()),
            private,
            visibility: None,
            archived: false,
            created_at: None,
            updated_at: None,
            pushed_at: Some(Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()),
        };
        let run = conclusion.map(|conclusion| LatestRun {
            workflow: "CI".to_string(),
            status: "completed".to_string(),
            conclusion: Some(conclusion.to_string()),
            branch: "main".to_string(),
            commit_message: "Bump <deps> & \"things\"".to_string(),
            commit_author: "octocat".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 42).unwrap(),
            url: format!("https://github.com/algojj/{name}/actions/runs/7"),
        });
        ReportEntry::new(repo, run, FixedOffset::west_opt(3 * 3600).unwrap())
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn empty_dashboard_is_a_valid_document() {
        let html = render_html(&dashboard(vec![]));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(html.contains("0 repos"));
        assert!(html.contains("ALL GREEN"));
        assert!(html.contains("No repositories found"));
        assert!(!html.contains("<tr class=\"status-"));
    }

    #[test]
    fn rows_follow_entry_order() {
        let html = render_html(&dashboard(vec![
            entry("repoA", Some("failure"), false),
            entry("repoB", Some("success"), true),
            entry("repoC", None, false),
        ]));
        let a = html.find(">repoA<").unwrap();
        let b = html.find(">repoB<").unwrap();
        let c = html.find(">repoC<").unwrap();
        assert!(a < b && b < c);
        assert!(html.contains("1 FAILING"));
        assert!(html.contains("health-bad"));
        assert!(html.contains("repoB</a> 🔒"));
        assert!(html.contains("Last updated: 2026-10-17 09:30:00 (UTC-03:00)"));
    }

    #[test]
    fn run_details_are_escaped() {
        let html = render_html(&dashboard(vec![entry("repoA", Some("success"), false)]));
        assert!(html.contains("Bump &lt;deps&gt; &amp; &quot;things&quot;"));
        assert!(html.contains("42s"));
        assert!(html.contains(r#"href="https://github.com/algojj/repoA/actions/runs/7""#));
        assert!(!html.contains("Bump <deps>"));
    }

    #[test]
    fn only_failed_and_cancelled_runs_get_a_copy_button() {
        let html = render_html(&dashboard(vec![
            entry("repoA", Some("failure"), false),
            entry("repoB", Some("cancelled"), false),
            entry("repoC", Some("success"), false),
        ]));
        assert_eq!(html.matches("class=\"copy-btn\"").count(), 2);
        assert!(html.contains("pipeline failed in algojj/repoA"));
        assert!(html.contains("pipeline was cancelled in algojj/repoB"));
        assert!(html.contains("1 other"));
    }

    #[test]
    fn status_json_lists_entries_in_order() {
        let json = render_status_json(&dashboard(vec![
            entry("repoA", Some("failure"), false),
            entry("repoC", None, false),
        ]))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["timestamp"], "2026-10-17 09:30:00");
        assert_eq!(value["total"], 2);
        assert_eq!(value["counts"]["failure"], 1);
        assert_eq!(value["counts"]["no_ci"], 1);
        assert_eq!(value["repos"][0]["name"], "repoA");
        assert_eq!(value["repos"][0]["duration"], "42s");
        assert_eq!(value["repos"][0]["default_branch"], "main");
        assert_eq!(value["repos"][0]["archived"], false);
        assert_eq!(value["repos"][0]["private"], false);
        assert_eq!(value["repos"][0]["pushed_at"], "2026-10-16T08:00:00Z");
        assert_eq!(value["repos"][1]["status_key"], "no_ci");
        assert!(value["repos"][1].get("run_url").is_none());
    }
}
