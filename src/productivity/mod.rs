pub mod aggregate;
pub mod exec;
pub mod output;

pub use aggregate::{active_months, collect_days, monthly_productivity, summarize, ProductivitySummary, Trend};
pub use exec::exec;
pub use output::{print_report, render_detailed, render_summary, render_trend, write_export};
