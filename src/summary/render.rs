use super::period::Period;
use crate::cli::GroupBy;
use crate::model::{PullRequest, PullRequestState, WorkEntry, WorkStatistics, WorkSummaryOutput, SCHEMA_VERSION};
use crate::util::thousands;
use chrono::Utc;
use std::collections::BTreeMap;

const WIDTH: usize = 90;

pub fn statistics(prs: &[PullRequest]) -> WorkStatistics {
    let mut stats = WorkStatistics {
        total_prs: prs.len(),
        ..Default::default()
    };
    for pr in prs {
        match pr.state {
            PullRequestState::Merged => stats.merged += 1,
            PullRequestState::Open => stats.open += 1,
            PullRequestState::Closed => stats.closed += 1,
            PullRequestState::Unknown => {}
        }
        stats.lines_added += pr.additions;
        stats.lines_deleted += pr.deletions;
    }
    stats.total_changes = stats.lines_added + stats.lines_deleted;
    stats
}

/// Pull requests keyed by repository, creation date, or a single `all`
/// bucket. Fetch order is kept within each group.
pub fn group<'a>(prs: &'a [PullRequest], by: GroupBy) -> BTreeMap<String, Vec<&'a PullRequest>> {
    let mut groups: BTreeMap<String, Vec<&PullRequest>> = BTreeMap::new();
    for pr in prs {
        let key = match by {
            GroupBy::Repo => pr.repository.name_with_owner.clone(),
            GroupBy::Date => pr.created_at.format("%Y-%m-%d").to_string(),
            GroupBy::None => "all".to_string(),
        };
        groups.entry(key).or_default().push(pr);
    }
    groups
}

fn status_mark(state: PullRequestState) -> &'static str {
    match state {
        PullRequestState::Merged => "✓",
        PullRequestState::Open => "○",
        PullRequestState::Closed => "✗",
        PullRequestState::Unknown => "?",
    }
}

fn status_badge(state: PullRequestState) -> &'static str {
    match state {
        PullRequestState::Merged => "🟢",
        PullRequestState::Open => "🔵",
        PullRequestState::Closed => "🔴",
        PullRequestState::Unknown => "⚪",
    }
}

pub fn text(period: &Period, prs: &[PullRequest], by: GroupBy, include_stats: bool) -> String {
    let mut out = vec![
        "=".repeat(WIDTH),
        format!("WORK SUMMARY: {}", period.name),
        "=".repeat(WIDTH),
        String::new(),
    ];

    if include_stats {
        let s = statistics(prs);
        out.push("STATISTICS".to_string());
        out.push("-".repeat(WIDTH));
        out.push(format!("Total PRs:          {}", s.total_prs));
        out.push(format!("  Merged:           {}", s.merged));
        out.push(format!("  Open:             {}", s.open));
        out.push(format!("  Closed:           {}", s.closed));
        out.push(format!("Lines added:        {}", thousands(s.lines_added as i64)));
        out.push(format!("Lines deleted:      {}", thousands(s.lines_deleted as i64)));
        out.push(format!("Total changes:      {}", thousands(s.total_changes as i64)));
        out.push(String::new());
    }

    out.push("PULL REQUESTS".to_string());
    out.push("-".repeat(WIDTH));
    out.push(String::new());

    for (name, members) in group(prs, by) {
        if by != GroupBy::None {
            out.push(format!("### {name}"));
            out.push(String::new());
        }
        for pr in members {
            out.push(format!("{} #{} - {}", status_mark(pr.state), pr.number, pr.title));
            out.push(format!(
                "   Date: {} | +{} -{} | {}",
                pr.created_at.format("%Y-%m-%d"),
                pr.additions,
                pr.deletions,
                pr.state.as_str()
            ));
            out.push(format!("   URL: {}", pr.url));
            out.push(String::new());
        }
    }

    out.push("=".repeat(WIDTH));
    out.join("\n")
}

pub fn markdown(period: &Period, prs: &[PullRequest], by: GroupBy, include_stats: bool) -> String {
    let mut out = vec![
        format!("# Work Summary: {}", period.name),
        String::new(),
        format!(
            "**Period:** {} to {}",
            period.start.format("%Y-%m-%d"),
            period.end.format("%Y-%m-%d")
        ),
        String::new(),
    ];

    if include_stats {
        let s = statistics(prs);
        out.push("## Statistics".to_string());
        out.push(String::new());
        out.push(format!("- **Total PRs:** {}", s.total_prs));
        out.push(format!("  - Merged: {}", s.merged));
        out.push(format!("  - Open: {}", s.open));
        out.push(format!("  - Closed: {}", s.closed));
        out.push(format!("- **Lines added:** {}", thousands(s.lines_added as i64)));
        out.push(format!("- **Lines deleted:** {}", thousands(s.lines_deleted as i64)));
        out.push(format!("- **Total changes:** {}", thousands(s.total_changes as i64)));
        out.push(String::new());
    }

    out.push("## Pull Requests".to_string());
    out.push(String::new());

    for (name, members) in group(prs, by) {
        if by != GroupBy::None {
            out.push(format!("### {name}"));
            out.push(String::new());
        }
        for pr in members {
            out.push(format!(
                "- {} **[#{}]({})** {}",
                status_badge(pr.state),
                pr.number,
                pr.url,
                pr.title
            ));
            out.push(format!("  - Date: {}", pr.created_at.format("%Y-%m-%d")));
            out.push(format!("  - Changes: +{} -{}", pr.additions, pr.deletions));
            out.push(format!("  - Status: {}", pr.state.as_str()));
            out.push(String::new());
        }
    }

    out.join("\n")
}

pub fn document(user: &str, period: &Period, prs: &[PullRequest]) -> WorkSummaryOutput {
    WorkSummaryOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        user: user.to_string(),
        period: period.name.clone(),
        start_date: period.start,
        end_date: period.end,
        statistics: statistics(prs),
        pull_requests: prs.iter().map(WorkEntry::from).collect(),
    }
}

pub fn json(user: &str, period: &Period, prs: &[PullRequest]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&document(user, period, prs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RepositoryRef;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn pr(number: u64, repo: &str, day: u32, state: PullRequestState) -> PullRequest {
        let at = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        PullRequest {
            title: format!("Change {number}"),
            number,
            url: format!("https://github.com/{repo}/pull/{number}"),
            created_at: at,
            updated_at: at,
            merged_at: (state == PullRequestState::Merged).then_some(at),
            closed_at: None,
            state,
            additions: 1000 * number,
            deletions: number,
            repository: RepositoryRef {
                name: repo.split('/').last().unwrap_or(repo).to_string(),
                name_with_owner: repo.to_string(),
                is_private: repo.starts_with("corp/"),
            },
        }
    }

    fn sample() -> Vec<PullRequest> {
        vec![
            pr(3, "octo/web", 12, PullRequestState::Open),
            pr(2, "corp/api", 11, PullRequestState::Merged),
            pr(1, "octo/web", 10, PullRequestState::Closed),
        ]
    }

    fn period() -> Period {
        Period {
            name: "This Week".to_string(),
            start: Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn statistics_count_states_and_lines() {
        let stats = statistics(&sample());
        assert_eq!(
            stats,
            WorkStatistics {
                total_prs: 3,
                merged: 1,
                open: 1,
                closed: 1,
                lines_added: 6000,
                lines_deleted: 6,
                total_changes: 6006,
            }
        );
    }

    #[test]
    fn groups_sort_by_key_and_keep_fetch_order() {
        let prs = sample();
        let by_repo = group(&prs, GroupBy::Repo);
        let keys: Vec<&String> = by_repo.keys().collect();
        assert_eq!(keys, vec!["corp/api", "octo/web"]);
        let web: Vec<u64> = by_repo["octo/web"].iter().map(|p| p.number).collect();
        assert_eq!(web, vec![3, 1]);

        let by_date = group(&prs, GroupBy::Date);
        assert_eq!(by_date.keys().next().unwrap(), "2024-03-10");

        let all = group(&prs, GroupBy::None);
        assert_eq!(all.len(), 1);
        assert_eq!(all["all"].len(), 3);
    }

    #[test]
    fn text_layout() {
        let out = text(&period(), &sample(), GroupBy::Repo, true);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "WORK SUMMARY: This Week");
        assert!(lines.contains(&"Lines added:        6,000"));
        assert!(lines.contains(&"### corp/api"));
        assert!(lines.contains(&"✓ #2 - Change 2"));
        assert!(lines.contains(&"   Date: 2024-03-11 | +2000 -2 | MERGED"));
        assert!(lines.contains(&"   URL: https://github.com/octo/web/pull/1"));
        assert_eq!(*lines.last().unwrap(), "=".repeat(90));

        let bare = text(&period(), &sample(), GroupBy::None, false);
        assert!(!bare.contains("###"));
        assert!(!bare.contains("STATISTICS"));
        assert!(bare.contains("○ #3 - Change 3"));
    }

    #[test]
    fn markdown_layout() {
        let out = markdown(&period(), &sample(), GroupBy::Date, true);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "# Work Summary: This Week");
        assert_eq!(lines[2], "**Period:** 2024-03-10 to 2024-03-14");
        assert!(lines.contains(&"- **Total changes:** 6,006"));
        assert!(lines.contains(&"### 2024-03-12"));
        assert!(lines.contains(&"- 🔴 **[#1](https://github.com/octo/web/pull/1)** Change 1"));
        assert!(lines.contains(&"  - Changes: +3000 -3"));
        assert!(lines.contains(&"  - Status: OPEN"));
    }

    #[test]
    fn json_document_lists_every_pr() {
        let out = json("octocat", &period(), &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["user"], "octocat");
        assert_eq!(value["period"], "This Week");
        assert_eq!(value["statistics"]["merged"], 1);
        assert_eq!(value["pull_requests"].as_array().unwrap().len(), 3);
        assert_eq!(value["pull_requests"][1]["repository"], "corp/api");
        assert_eq!(value["pull_requests"][1]["is_private"], true);
        assert_eq!(value["pull_requests"][1]["state"], "MERGED");
        assert!(value["pull_requests"][0]["merged_at"].is_null());
    }
}
