use super::aggregate::{active_months, summarize};
use crate::chart::{self, ChartSpec, LineSeries};
use crate::model::{CodeMetricsExport, CodeMetricsMonth};
use crate::util::thousands;
use anyhow::{Context, Result};
use console::style;
use ratatui::style::Color;
use std::path::Path;

const WIDTH: usize = 90;
const TABLE_WIDTH: usize = 110;

fn banner(title: &str, width: usize) -> Vec<String> {
    vec![
        String::new(),
        "=".repeat(width),
        title.to_string(),
        "=".repeat(width),
    ]
}

pub fn render_detailed(months: &[CodeMetricsMonth], workdays_per_week: u32) -> Vec<String> {
    let mut out = banner(
        &format!("MONTHLY CODE METRICS ANALYSIS (Average Lines per Workday, {workdays_per_week} workdays/week)"),
        TABLE_WIDTH,
    );
    out.push(String::new());
    out.push(format!(
        "{:<12} {:<10} {:<10} {:<10} {:<8} {:<12} {:<12} {:<12}",
        "Month", "Added", "Deleted", "Total", "Weeks", "Avg Added", "Avg Deleted", "Avg Total"
    ));
    out.push("-".repeat(TABLE_WIDTH));
    for m in months {
        out.push(format!(
            "{:<12} {:<10} {:<10} {:<10} {:<8.2} {:>11.1} {:>11.1} {:>11.1}",
            m.label,
            m.total_additions,
            m.total_deletions,
            m.total_changes,
            m.week_fraction,
            m.avg_additions_per_workday,
            m.avg_deletions_per_workday,
            m.avg_total_per_workday,
        ));
    }
    out.push(String::new());
    out
}

pub fn render_summary(months: &[CodeMetricsMonth]) -> Vec<String> {
    let mut out = banner("SUMMARY STATISTICS", WIDTH);
    out.push(String::new());

    let Some(s) = summarize(months) else {
        return out;
    };

    out.push(format!("Total lines added (all time):       {}", thousands(s.total_additions as i64)));
    out.push(format!("Total lines deleted (all time):     {}", thousands(s.total_deletions as i64)));
    out.push(format!("Total changes (all time):           {}", thousands(s.total_changes as i64)));
    out.push(String::new());
    out.push(format!("Active months analyzed:             {}", s.active_months));
    out.push(format!("Overall average additions/workday:  {:.1} lines", s.overall.additions));
    out.push(format!("Overall average deletions/workday:  {:.1} lines", s.overall.deletions));
    out.push(format!("Overall average total/workday:      {:.1} lines", s.overall.total));
    out.push(String::new());
    out.push(format!(
        "Most additions:                     {} ({:.1} lines/workday)",
        s.most_additions.0, s.most_additions.1
    ));
    out.push(format!(
        "Most deletions:                     {} ({:.1} lines/workday)",
        s.most_deletions.0, s.most_deletions.1
    ));
    out.push(format!(
        "Most total changes:                 {} ({:.1} lines/workday)",
        s.most_total.0, s.most_total.1
    ));
    out.push(String::new());
    out.push(format!("Last 12 months avg additions:       {:.1} lines/workday", s.recent.additions));
    out.push(format!("Last 12 months avg deletions:       {:.1} lines/workday", s.recent.deletions));
    out.push(format!("Last 12 months avg total:           {:.1} lines/workday", s.recent.total));
    out
}

fn values(active: &[&CodeMetricsMonth], f: fn(&CodeMetricsMonth) -> f64) -> Vec<f64> {
    active.iter().map(|m| f(m)).collect()
}

/// Section heading and chart for added, deleted, total and the combined
/// overlay, in print order.
pub fn chart_specs(active: &[&CodeMetricsMonth], workdays_per_week: u32) -> Vec<(&'static str, ChartSpec)> {
    let labels: Vec<String> = active.iter().map(|m| m.label.clone()).collect();
    let added = values(active, |m| m.avg_additions_per_workday);
    let deleted = values(active, |m| m.avg_deletions_per_workday);
    let total = values(active, |m| m.avg_total_per_workday);
    let title = |what: &str| format!("Monthly Code Metrics: {what} per Workday ({workdays_per_week} workdays/week)");

    vec![
        (
            "LINES ADDED PER WORKDAY - VISUAL GRAPH",
            ChartSpec::new(title("Lines Added"), "Avg Lines Added/Workday", labels.clone(), 25)
                .maybe_series(LineSeries::trend_of(&added, Color::Blue))
                .series(LineSeries::new("Lines added", Color::Green, added.clone())),
        ),
        (
            "LINES DELETED PER WORKDAY - VISUAL GRAPH",
            ChartSpec::new(title("Lines Deleted"), "Avg Lines Deleted/Workday", labels.clone(), 25)
                .maybe_series(LineSeries::trend_of(&deleted, Color::Magenta))
                .series(LineSeries::new("Lines deleted", Color::Red, deleted.clone())),
        ),
        (
            "TOTAL CHANGES PER WORKDAY - VISUAL GRAPH",
            ChartSpec::new(title("Total Changes"), "Avg Total Changes/Workday", labels.clone(), 25)
                .maybe_series(LineSeries::trend_of(&total, Color::Yellow))
                .series(LineSeries::new("Total changes", Color::Cyan, total.clone())),
        ),
        (
            "COMBINED CODE METRICS - VISUAL GRAPH",
            ChartSpec::new(title("All Metrics"), "Avg Lines/Workday", labels, 30)
                .series(LineSeries::new("Lines added", Color::Green, added))
                .series(LineSeries::new("Lines deleted", Color::Red, deleted))
                .series(LineSeries::new("Total changes", Color::Cyan, total)),
        ),
    ]
}

pub fn render_note(workdays_per_week: u32) -> Vec<String> {
    vec![
        String::new(),
        "=".repeat(WIDTH),
        format!("Note: Averages calculated per {workdays_per_week} workdays/week"),
        "This normalizes for weekends and provides consistent per-workday metrics".to_string(),
        "=".repeat(WIDTH),
        String::new(),
    ]
}

pub fn print_report(months: &[CodeMetricsMonth], workdays_per_week: u32, detailed: bool, show_chart: bool) {
    if detailed {
        print_lines(render_detailed(months, workdays_per_week));
    }
    print_lines(render_summary(months));

    let active = active_months(months);
    if active.is_empty() {
        println!("No active months to display.");
        println!();
        return;
    }

    if show_chart {
        for (heading, spec) in chart_specs(&active, workdays_per_week) {
            for line in banner(heading, WIDTH) {
                println!("{}", style(line).bold());
            }
            println!();
            chart::print(&spec);
        }
    }

    print_lines(render_note(workdays_per_week));
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

pub fn write_export(path: &Path, export: &CodeMetricsExport) -> Result<()> {
    let body = serde_json::to_string_pretty(export)?;
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn month(label: &str, add: f64, del: f64) -> CodeMetricsMonth {
        CodeMetricsMonth {
            month: label.to_string(),
            label: label.to_string(),
            avg_additions_per_workday: add,
            avg_deletions_per_workday: del,
            avg_total_per_workday: add + del,
            total_additions: 1200,
            total_deletions: 300,
            total_changes: 1500,
            week_fraction: 4.43,
        }
    }

    #[test]
    fn detailed_table_has_one_row_per_month() {
        let lines = render_detailed(&[month("Jan 2024", 54.2, 13.5), month("Feb 2024", 0.0, 0.0)], 5);
        assert!(lines[2].contains("5 workdays/week"));
        let row = format!(
            "{:<12} {:<10} {:<10} {:<10} {:<8} {:>11} {:>11} {:>11}",
            "Jan 2024", "1200", "300", "1500", "4.43", "54.2", "13.5", "67.7"
        );
        assert!(lines.contains(&row), "missing {row:?} in {lines:#?}");
        assert!(lines.iter().any(|l| l.starts_with("Feb 2024")));
    }

    #[test]
    fn summary_formats_totals_with_separators() {
        let lines = render_summary(&[month("Jan 2024", 10.0, 2.0)]);
        assert!(lines.contains(&"Total lines added (all time):       1,200".to_string()));
        assert!(lines.contains(&"Most deletions:                     Jan 2024 (2.0 lines/workday)".to_string()));
        assert!(lines.contains(&"Last 12 months avg total:           12.0 lines/workday".to_string()));
        assert_eq!(lines[2], "SUMMARY STATISTICS");
        assert_eq!(lines[1], "=".repeat(90));

        let empty = render_summary(&[month("Jan 2024", 0.0, 0.0)]);
        assert_eq!(empty.len(), 5);
    }

    #[test]
    fn four_charts_with_trends_when_history_allows() {
        let months: Vec<CodeMetricsMonth> = (0..8).map(|i| month(&format!("M{i}"), i as f64, 1.0)).collect();
        let active: Vec<&CodeMetricsMonth> = months.iter().collect();
        let specs = chart_specs(&active, 5);

        assert_eq!(specs.len(), 4);
        let (heading, added) = &specs[0];
        assert_eq!(*heading, "LINES ADDED PER WORKDAY - VISUAL GRAPH");
        assert_eq!(added.title, "Monthly Code Metrics: Lines Added per Workday (5 workdays/week)");
        assert_eq!(added.series.len(), 2);
        assert!(added.series[0].trend);
        assert_eq!(added.series[1].color, Color::Green);
        let heights: Vec<u16> = specs.iter().map(|(_, s)| s.height).collect();
        assert_eq!(heights, vec![25, 25, 25, 30]);
        assert_eq!(specs[3].1.title, "Monthly Code Metrics: All Metrics per Workday (5 workdays/week)");
        assert_eq!(specs[3].1.series.len(), 3);

        let short = chart_specs(&active[..2], 5);
        assert_eq!(short[1].1.series.len(), 1);
    }

    #[test]
    fn note_describes_workday_normalization() {
        let note = render_note(6);
        assert_eq!(note[2], "Note: Averages calculated per 6 workdays/week");
        assert_eq!(note[3], "This normalizes for weekends and provides consistent per-workday metrics");
    }
}
