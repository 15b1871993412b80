use super::aggregate::{active_months, summarize, trend_marker, Trend};
use crate::chart::{self, ChartSpec, LineSeries};
use crate::model::{ProductivityExport, ProductivityMonth};
use anyhow::{Context, Result};
use console::style;
use ratatui::style::Color;
use std::path::Path;

const WIDTH: usize = 90;

fn banner(title: &str) -> Vec<String> {
    vec![
        String::new(),
        "=".repeat(WIDTH),
        title.to_string(),
        "=".repeat(WIDTH),
    ]
}

pub fn render_detailed(months: &[ProductivityMonth], workdays_per_week: u32) -> Vec<String> {
    let mut out = banner(&format!(
        "MONTHLY PRODUCTIVITY ANALYSIS (Average Contributions per Workday, {workdays_per_week} workdays/week)"
    ));
    out.push(String::new());
    out.push(format!("{:<12} {:<8} {:<8} {:<15}", "Month", "Total", "Weeks", "Avg/Workday"));
    out.push("-".repeat(WIDTH));
    for m in months {
        out.push(format!(
            "{:<12} {:<8} {:<8.2} {:>14.2}",
            m.label, m.total_contributions, m.week_fraction, m.average_per_workday
        ));
    }
    out.push(String::new());
    out
}

pub fn render_summary(months: &[ProductivityMonth]) -> Vec<String> {
    let mut out = banner("SUMMARY STATISTICS");
    out.push(String::new());

    if let Some(summary) = summarize(months) {
        out.push(format!("Total months analyzed:      {}", summary.months));
        out.push(format!(
            "Overall average:            {:.2} contributions/workday",
            summary.overall_avg
        ));
        out.push(format!(
            "Most productive month:      {} ({:.2} avg)",
            summary.best.0, summary.best.1
        ));
        out.push(format!(
            "Least productive month:     {} ({:.2} avg)",
            summary.worst.0, summary.worst.1
        ));
        out.push(String::new());
        out.push(format!(
            "Last 12 months average:     {:.2} contributions/workday",
            summary.recent_avg
        ));
    }
    out
}

pub fn render_trend(trend: &Trend, workdays_per_week: u32) -> Vec<String> {
    let mut out = vec![String::new(), "=".repeat(WIDTH)];

    if let Some((older_avg, improvement)) = trend.historical {
        out.push(format!(
            "Last 12 months average:         {:.2} contributions/workday",
            trend.recent_avg
        ));
        out.push(format!(
            "Historical average (before):    {older_avg:.2} contributions/workday"
        ));
        out.push(format!("Improvement:                    {improvement:+.1}%"));
    }
    if let Some(change) = trend.short_term {
        out.push(format!(
            "Recent trend (last 3 months):   {change:+.1}% {}",
            trend_marker(change)
        ));
    }

    out.push("=".repeat(WIDTH));
    out.push(format!(
        "Note: Averages calculated as weekly total ÷ {workdays_per_week} workdays"
    ));
    out.push("This normalizes for weekends and provides consistent per-workday metrics".to_string());
    out.push("=".repeat(WIDTH));
    out.push(String::new());
    out
}

pub fn chart_spec(active: &[&ProductivityMonth], workdays_per_week: u32) -> ChartSpec {
    let labels: Vec<String> = active.iter().map(|m| m.label.clone()).collect();
    let averages: Vec<f64> = active.iter().map(|m| m.average_per_workday).collect();

    ChartSpec::new(
        format!(
            "Monthly Productivity: Average Contributions per Workday ({workdays_per_week} workdays/week)"
        ),
        "Avg Contributions/Workday",
        labels,
        30,
    )
    .maybe_series(LineSeries::trend_of(&averages, Color::Green))
    .series(LineSeries::new("Contributions/workday", Color::Cyan, averages))
}

pub fn print_report(months: &[ProductivityMonth], days_tracked: usize, workdays_per_week: u32, detailed: bool, show_chart: bool) {
    println!("Total days tracked: {days_tracked}");

    if detailed {
        print_lines(render_detailed(months, workdays_per_week));
    }
    print_lines(render_summary(months));

    for line in banner("PRODUCTIVITY TREND - VISUAL GRAPH") {
        println!("{}", style(line).bold());
    }
    println!();

    let active = active_months(months);
    if active.is_empty() {
        println!("No active months to display.");
        println!();
        return;
    }

    if show_chart {
        chart::print(&chart_spec(&active, workdays_per_week));
    }

    let averages: Vec<f64> = active.iter().map(|m| m.average_per_workday).collect();
    if let Some(trend) = Trend::from_averages(&averages) {
        print_lines(render_trend(&trend, workdays_per_week));
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

pub fn write_export(path: &Path, export: &ProductivityExport) -> Result<()> {
    let body = serde_json::to_string_pretty(export)?;
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    Ok(())
}
