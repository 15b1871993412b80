use crate::calendar::YearWindow;
use crate::cli::CommonArgs;
use crate::model::{LifetimeOutput, YearStats, SCHEMA_VERSION};
use crate::util::{pct_cell, pct_change, signed_thousands, thousands};
use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::warn;

pub fn exec(common: &CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let source = common.source()?;

    eprintln!("Fetching account information...");
    let account = source
        .client()
        .account(&common.user)
        .context("Failed to fetch account information")?;
    let windows = YearWindow::lifetime(account.created_at, source.now())?;

    for line in account.header(&common.user) {
        if json || ndjson {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
    eprintln!("Analyzing {} years of contributions...\n", windows.len());

    let mut years = Vec::with_capacity(windows.len());
    for window in &windows {
        eprint!("Fetching {} contributions... ", window.year);
        match source.collection(&common.user, window) {
            Ok(collection) => {
                let stats = YearStats::from_collection(window.year, &collection);
                eprintln!("{} contributions", stats.total);
                years.push(stats);
            }
            Err(e) => {
                eprintln!("Error: {e}");
                warn!(year = window.year, error = %e, "skipping year");
            }
        }
    }

    if json {
        output_json(&common.user, account.created_at, years)?;
    } else if ndjson {
        for stats in &years {
            println!("{}", serde_json::to_string(stats)?);
        }
    } else {
        for line in render_report(&years) {
            println!("{line}");
        }
    }

    Ok(())
}

fn output_json(user: &str, account_created: DateTime<Utc>, years: Vec<YearStats>) -> anyhow::Result<()> {
    let output = LifetimeOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        user: user.to_string(),
        account_created,
        years,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn totals(years: &[YearStats]) -> YearStats {
    years.iter().fold(YearStats::default(), |mut acc, y| {
        acc.total += y.total;
        acc.commits += y.commits;
        acc.issues += y.issues;
        acc.prs += y.prs;
        acc.reviews += y.reviews;
        acc.repos += y.repos;
        acc.restricted += y.restricted;
        acc
    })
}

/// First maximum / first minimum by total.
fn best_and_worst(years: &[YearStats]) -> Option<(&YearStats, &YearStats)> {
    let first = years.first()?;
    let mut best = first;
    let mut worst = first;
    for y in &years[1..] {
        if y.total > best.total {
            best = y;
        }
        if y.total < worst.total {
            worst = y;
        }
    }
    Some((best, worst))
}

fn growth_line(label: &str, prev: u64, curr: u64) -> String {
    let change = curr as i64 - prev as i64;
    format!(
        "  {label:<21}{prev} → {curr} ({change:+}, {:+.1}%)",
        pct_change(curr, prev)
    )
}

pub fn render_report(years: &[YearStats]) -> Vec<String> {
    let wide = "=".repeat(80);
    let rule = "-".repeat(90);
    let mut out = vec![
        String::new(),
        wide.clone(),
        "LIFETIME CONTRIBUTION ANALYSIS".to_string(),
        wide.clone(),
        String::new(),
        "Year-by-Year Breakdown:".to_string(),
        rule.clone(),
        format!(
            "{:<6} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8}",
            "Year", "Total", "Commits", "Issues", "PRs", "Reviews", "Repos", "Private"
        ),
        rule.clone(),
    ];

    for s in years {
        out.push(format!(
            "{:<6} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8}",
            s.year, s.total, s.commits, s.issues, s.prs, s.reviews, s.repos, s.restricted
        ));
    }
    out.push(rule.clone());

    let sum = totals(years);
    out.push(format!(
        "{:<6} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8}",
        "TOTAL", sum.total, sum.commits, sum.issues, sum.prs, sum.reviews, sum.repos, sum.restricted
    ));
    out.push(String::new());

    if years.len() > 1 {
        out.push(String::new());
        out.push("Year-over-Year Percentage Change:".to_string());
        out.push(rule.clone());
        out.push(format!(
            "{:<6} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10}",
            "Year", "Total", "Commits", "Issues", "PRs", "Reviews", "Repos", "Private"
        ));
        out.push(rule.clone());
        out.push(format!(
            "{:<6} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10}",
            years[0].year, "—", "—", "—", "—", "—", "—", "—"
        ));
        for pair in years.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            out.push(format!(
                "{:<6} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10}",
                curr.year,
                pct_cell(curr.total, prev.total),
                pct_cell(curr.commits, prev.commits),
                pct_cell(curr.issues, prev.issues),
                pct_cell(curr.prs, prev.prs),
                pct_cell(curr.reviews, prev.reviews),
                pct_cell(curr.repos, prev.repos),
                pct_cell(curr.restricted, prev.restricted),
            ));
        }
        out.push(String::new());

        out.push(String::new());
        out.push(wide.clone());
        out.push("YEAR-OVER-YEAR GROWTH".to_string());
        out.push(wide.clone());
        out.push(String::new());
        for pair in years.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            out.push(format!("{} → {}:", prev.year, curr.year));
            out.push(growth_line("Total Contributions:", prev.total, curr.total));
            out.push(growth_line("Commits:", prev.commits, curr.commits));
            out.push(growth_line("Issues:", prev.issues, curr.issues));
            out.push(growth_line("Pull Requests:", prev.prs, curr.prs));
            out.push(growth_line("Reviews:", prev.reviews, curr.reviews));
            out.push(String::new());
        }
    }

    out.push(String::new());
    out.push(wide.clone());
    out.push("SUMMARY STATISTICS".to_string());
    out.push(wide.clone());
    out.push(String::new());

    if let Some((best, worst)) = best_and_worst(years) {
        let avg_per_year = sum.total as f64 / years.len() as f64;
        out.push(format!("Years active:           {}", years.len()));
        out.push(format!("Total contributions:    {}", thousands(sum.total as i64)));
        out.push(format!("Average per year:       {avg_per_year:.0}"));
        out.push(String::new());
        out.push(format!(
            "Most productive year:   {} ({} contributions)",
            best.year,
            thousands(best.total as i64)
        ));
        out.push(format!(
            "Least productive year:  {} ({} contributions)",
            worst.year,
            thousands(worst.total as i64)
        ));

        if let (true, Some(last)) = (years.len() > 1, years.last()) {
            let first = &years[0];
            let growth = last.total as i64 - first.total as i64;
            out.push(String::new());
            out.push(format!("Overall growth:         {} to {}", first.year, last.year));
            out.push(format!(
                "  {} → {} ({}, {:+.1}%)",
                first.total,
                last.total,
                signed_thousands(growth),
                pct_change(last.total, first.total)
            ));
        }
    }

    out.push(String::new());
    out.push(wide);
    out
}
