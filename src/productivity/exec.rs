use super::{collect_days, monthly_productivity, print_report, write_export};
use crate::calendar::YearWindow;
use crate::cli::{CommonArgs, MonthlyArgs};
use crate::model::{ProductivityExport, SCHEMA_VERSION};
use anyhow::Context;
use chrono::{Datelike, Utc};
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_EXPORT: &str = "monthly_productivity_data.json";

pub fn exec(common: &CommonArgs, args: &MonthlyArgs) -> anyhow::Result<()> {
    let source = common.source()?;

    eprintln!("Fetching account information...");
    let account = source
        .client()
        .account(&common.user)
        .context("Failed to fetch account information")?;
    let windows = YearWindow::lifetime(account.created_at, source.now())?;

    for line in account.header(&common.user) {
        if args.json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
    eprintln!(
        "Analyzing monthly productivity from {} to {}...\n",
        account.created_at.year(),
        source.now().year()
    );

    let mut collections = Vec::with_capacity(windows.len());
    for window in &windows {
        eprint!("Fetching {} data... ", window.year);
        match source.collection(&common.user, window) {
            Ok(collection) => {
                eprintln!("{} contributions", collection.contribution_calendar.total_contributions);
                collections.push(collection);
            }
            Err(e) => {
                eprintln!("Error: {e}");
                warn!(year = window.year, error = %e, "skipping year");
            }
        }
    }

    let days = collect_days(&collections);
    let months = monthly_productivity(&days, args.workdays_per_week);

    let export = ProductivityExport {
        version: SCHEMA_VERSION,
        user: common.user.clone(),
        generated: Utc::now(),
        workdays_per_week: args.workdays_per_week,
        monthly_data: months,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&export)?);
    } else {
        println!();
        print_report(
            &export.monthly_data,
            days.len(),
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
        eprintln!("  You can use this file to create graphs with matplotlib or other tools!");
    }

    Ok(())
}
