pub mod aggregate;
pub mod exec;
pub mod output;

pub use aggregate::{daily_deltas, monthly_code_metrics, summarize, CodeMetricsSummary, LineDelta};
pub use exec::exec;
pub use output::{chart_specs, print_report, render_detailed, render_summary, write_export};
