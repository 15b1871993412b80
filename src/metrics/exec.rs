use super::{monthly_code_metrics, print_report, write_export};
use crate::cli::{CommonArgs, MonthlyArgs};
use crate::error::GhactError;
use crate::github::Scan;
use crate::model::{CodeMetricsExport, SCHEMA_VERSION};
use anyhow::Context;
use chrono::{Datelike, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

pub const DEFAULT_EXPORT: &str = "monthly_code_metrics_data.json";

pub fn exec(common: &CommonArgs, args: &MonthlyArgs) -> anyhow::Result<()> {
    let source = common.source()?;
    let now = source.now();

    eprintln!("Fetching account information...");
    let account = source
        .client()
        .account(&common.user)
        .context("Failed to fetch account information")?;

    for line in account.header(&common.user) {
        if args.json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
    eprintln!(
        "Analyzing code metrics from PRs created {} to {}...\n",
        account.created_at.year(),
        now.year()
    );
    eprintln!("Fetching Pull Requests (including private repositories)...");
    eprintln!("This may take a while...");

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Fetching pull requests...");

    let fetched = source.client().pull_requests(
        &common.user,
        |_| Scan::Keep,
        |n, total| pb.set_message(format!("Fetched {n}/{total} PRs")),
    );
    pb.finish_and_clear();
    let prs = fetched.context("Failed to fetch pull requests")?;

    if prs.is_empty() {
        return Err(GhactError::NoData(
            "No Pull Requests found. This could mean:\n  \
             - The user has not created any PRs\n  \
             - The token doesn't have sufficient permissions (needs 'repo' scope for private repos)"
                .to_string(),
        )
        .into());
    }

    let private = prs.iter().filter(|pr| pr.repository.is_private).count();

    let months = monthly_code_metrics(
        &prs,
        account.created_at.date_naive(),
        now.date_naive(),
        args.workdays_per_week,
    );

    let export = CodeMetricsExport {
        version: SCHEMA_VERSION,
        user: common.user.clone(),
        generated: Utc::now(),
        workdays_per_week: args.workdays_per_week,
        total_prs: prs.len(),
        monthly_data: months,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&export)?);
    } else {
        println!("✓ Total PRs analyzed: {}", prs.len());
        println!("  - Public PRs:  {}", prs.len() - private);
        println!("  - Private PRs: {private}");
        println!();
        print_report(
            &export.monthly_data,
            args.workdays_per_week,
            args.detailed,
            !args.no_chart,
        );
    }

    if !args.no_export {
        let path = args.export.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT));
        eprintln!("Exporting data for plotting...");
        write_export(&path, &export)?;
        eprintln!("✓ Data exported to {}", path.display());
    }

    Ok(())
}
