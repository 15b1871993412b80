use crate::calendar::{weekday_name, WeekdayBreakdown, YearWindow};
use crate::cli::CommonArgs;
use crate::model::{ContributionsCollection, WeekdayRow, YearSummary, YearlyOutput, SCHEMA_VERSION};
use anyhow::Context;
use chrono::{Datelike, Utc};
use console::style;

pub fn exec(common: &CommonArgs, year: Option<i32>, all_years: bool, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let source = common.source()?;
    let current_year = source.now().year();

    let years: Vec<i32> = if all_years {
        eprintln!("Fetching account creation date...");
        let account = source
            .client()
            .account(&common.user)
            .context("Failed to fetch account information")?;
        let creation_year = account.created_at.year();
        let years: Vec<i32> = (creation_year..=current_year).collect();
        eprintln!("Account created in {creation_year}");
        eprintln!(
            "Fetching contributions for {} years ({}-{})...",
            years.len(),
            creation_year,
            current_year
        );
        years
    } else {
        let year = year.unwrap_or(current_year);
        eprintln!("Fetching contribution data for {year}...");
        vec![year]
    };

    let mut summaries = Vec::with_capacity(years.len());
    for year in years {
        let window = YearWindow::full_year(year)?;
        let collection = source
            .collection(&common.user, &window)
            .with_context(|| format!("Failed to fetch contributions for {year}"))?;
        let summary = summarize_year(year, &collection);

        if !json && !ndjson {
            output_year(&summary);
        }
        summaries.push(summary);
    }

    if json {
        output_json(&common.user, summaries)?;
    } else if ndjson {
        output_ndjson(&summaries)?;
    }

    Ok(())
}

pub fn summarize_year(year: i32, collection: &ContributionsCollection) -> YearSummary {
    let breakdown = WeekdayBreakdown::from_days(collection.days());

    YearSummary {
        year,
        total_contributions: collection.contribution_calendar.total_contributions,
        commits: collection.total_commit_contributions,
        issues: collection.total_issue_contributions,
        pull_requests: collection.total_pull_request_contributions,
        reviews: collection.total_pull_request_review_contributions,
        days_with_contributions: breakdown.active_dates,
        weekdays: breakdown
            .weekdays
            .iter()
            .map(|t| WeekdayRow {
                weekday: weekday_name(t.weekday).to_string(),
                total: t.total,
                active_days: t.active_days,
                total_days: t.total_days,
                avg_per_day: t.avg_per_day(),
            })
            .collect(),
    }
}

pub fn render_year(summary: &YearSummary) -> Vec<String> {
    let rule = "=".repeat(60);
    let mut out = vec![
        String::new(),
        rule.clone(),
        format!("CONTRIBUTION SUMMARY ({})", summary.year),
        rule.clone(),
        format!("Total Contributions (all types): {}", summary.total_contributions),
        format!("  - Commits:                     {}", summary.commits),
        format!("  - Issues:                      {}", summary.issues),
        format!("  - Pull Requests:               {}", summary.pull_requests),
        format!("  - PR Reviews:                  {}", summary.reviews),
        rule.clone(),
        String::new(),
        format!("Days with contributions: {}", summary.days_with_contributions),
        String::new(),
        "Contributions per weekday (UTC based):".to_string(),
    ];

    for row in &summary.weekdays {
        out.push(format!(
            "{:10}: total={:4} active_days={:3}/{:<3} avg_per_day={:5.2}",
            row.weekday, row.total, row.active_days, row.total_days, row.avg_per_day
        ));
    }

    out.push(String::new());
    out.push(rule.clone());
    out.push("Note: Includes ALL contribution types across ALL repositories".to_string());
    out.push("(personal, organization, public, and private)".to_string());
    out.push(rule);
    out
}

fn output_year(summary: &YearSummary) {
    for (i, line) in render_year(summary).into_iter().enumerate() {
        // the heading line
        if i == 2 {
            println!("{}", style(line).bold());
        } else {
            println!("{line}");
        }
    }
    println!();
}

fn output_json(user: &str, years: Vec<YearSummary>) -> anyhow::Result<()> {
    let output = YearlyOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        user: user.to_string(),
        years,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(years: &[YearSummary]) -> anyhow::Result<()> {
    for year in years {
        println!("{}", serde_json::to_string(year)?);
    }
    Ok(())
}
