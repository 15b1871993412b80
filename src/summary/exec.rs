use super::period::{resolve, Period};
use super::render;
use crate::cli::{CommonArgs, OutputFormat, SummaryArgs};
use crate::error::GhactError;
use crate::github::{GitHubClient, Scan};
use crate::model::PullRequest;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Authored pull requests created or updated inside `period`. Results are
/// ordered newest-created first, so paging ends at the first pull request
/// that is entirely older than the period.
pub fn fetch_period(client: &GitHubClient, login: &str, period: &Period) -> crate::error::Result<Vec<PullRequest>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Fetching pull requests...");

    let result = client.pull_requests(
        login,
        |pr| {
            if period.contains(&pr.created_at) || period.contains(&pr.updated_at) {
                Scan::Keep
            } else if pr.created_at < period.start && pr.updated_at < period.start {
                Scan::Stop
            } else {
                Scan::Skip
            }
        },
        |n, _| pb.set_message(format!("Found {n} pull requests in range...")),
    );
    pb.finish_and_clear();
    result
}

pub fn exec(common: &CommonArgs, args: &SummaryArgs) -> anyhow::Result<()> {
    let source = common.source()?;
    let period = resolve(args, source.now())?;

    eprintln!("Fetching work summary for {}...", common.user);
    eprintln!("Period: {}", period.name);
    eprintln!(
        "Date range: {} to {}\n",
        period.start.format("%Y-%m-%d %H:%M"),
        period.end.format("%Y-%m-%d %H:%M")
    );

    let prs = fetch_period(source.client(), &common.user, &period)
        .context("Failed to fetch pull requests")?;
    eprintln!("Found {} PRs in this period.\n", prs.len());

    if prs.is_empty() {
        println!("No work found for this period.");
        return Ok(());
    }

    let output = match args.format {
        OutputFormat::Text => render::text(&period, &prs, args.group_by, args.include_stats),
        OutputFormat::Markdown => render::markdown(&period, &prs, args.group_by, args.include_stats),
        OutputFormat::Json => render::json(&common.user, &period, &prs)?,
    };

    println!("{output}");

    if let Some(path) = &args.export {
        std::fs::write(path, &output)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        eprintln!("\n✓ Summary exported to {}", path.display());
    }

    if args.copy {
        copy_to_clipboard(&output)?;
        eprintln!("✓ Summary copied to clipboard");
    }

    Ok(())
}

fn copy_to_clipboard(text: &str) -> crate::error::Result<()> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| GhactError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| GhactError::Clipboard(e.to_string()))?;
    debug!(bytes = text.len(), "copied summary");
    Ok(())
}
