use crate::cache::{Cache, CacheScope};
use crate::error::GhactError;
use crate::github::{ContributionSource, GitHubClient, DEFAULT_ENDPOINT};
use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "ghact")]
#[command(about = "GitHub contribution reports: yearly, lifetime, productivity, code metrics and work summaries")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(short, long, help = "GitHub username to analyze")]
    pub user: String,

    #[arg(
        short,
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub personal access token"
    )]
    pub token: Option<String>,

    #[arg(long, env = "GHACT_API_URL", default_value = DEFAULT_ENDPOINT, help = "GraphQL endpoint")]
    pub api_url: String,

    #[arg(long, help = "Directory for the response cache")]
    pub cache: Option<PathBuf>,

    #[arg(long, help = "Do not read or write the response cache", conflicts_with = "cache")]
    pub no_cache: bool,

    #[arg(long, help = "Drop cached responses for this user before running")]
    pub refresh: bool,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn token(&self) -> crate::error::Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GhactError::MissingToken)
    }

    /// Build the API client and, unless disabled, open the response cache.
    pub fn source(&self) -> Result<ContributionSource> {
        let token = self.token()?;
        let client = GitHubClient::new(&self.api_url, token)
            .context("Failed to build GitHub client")?;

        let cache = if self.no_cache {
            None
        } else {
            match self.cache.clone().or_else(Cache::default_dir) {
                Some(dir) => match Cache::new(&dir, CacheScope::new(&self.api_url, token)) {
                    Ok(cache) => {
                        debug!(dir = %dir.display(), "response cache opened");
                        Some(cache)
                    }
                    Err(e) => {
                        warn!(error = %e, dir = %dir.display(), "response cache unavailable");
                        None
                    }
                },
                None => None,
            }
        };

        if let (true, Some(cache)) = (self.refresh, &cache) {
            let removed = cache
                .clear_login(&self.user)
                .context("Failed to clear cached responses")?;
            debug!(removed, "cleared cached responses");
        }

        Ok(ContributionSource::new(client, cache))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Contribution summary and weekday breakdown for one year or every year
    Year {
        #[arg(short, long, help = "Year to analyze (default: current year)", conflicts_with = "all_years")]
        year: Option<i32>,

        #[arg(long, help = "Every year since the account was created")]
        all_years: bool,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Year-by-year totals, growth and summary since account creation
    Lifetime {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Monthly contributions per workday with a trend chart
    Productivity(MonthlyArgs),
    /// Monthly lines added and deleted per workday from authored pull requests
    Metrics(MonthlyArgs),
    /// Pull request work summary for a time period
    Summary(SummaryArgs),
}

#[derive(Args, Clone)]
pub struct MonthlyArgs {
    #[arg(long, help = "Show detailed monthly breakdown table")]
    pub detailed: bool,

    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..=7),
        help = "Number of workdays per week"
    )]
    pub workdays_per_week: u32,

    #[arg(long, help = "Where to write the JSON export")]
    pub export: Option<PathBuf>,

    #[arg(long, help = "Skip writing the JSON export", conflicts_with = "export")]
    pub no_export: bool,

    #[arg(long, help = "Skip the terminal charts")]
    pub no_chart: bool,

    #[arg(long, help = "Print the export document to stdout instead of the report")]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    Repo,
    Date,
    None,
}

#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("period")
        .required(true)
        .multiple(false)
        .args([
            "today",
            "yesterday",
            "last_week",
            "last_month",
            "this_week",
            "this_month",
            "last_year",
            "custom",
        ])
))]
pub struct SummaryArgs {
    #[arg(long, help = "Work done today")]
    pub today: bool,

    #[arg(long, help = "Work done yesterday")]
    pub yesterday: bool,

    #[arg(long, help = "Work done in the last 7 days")]
    pub last_week: bool,

    #[arg(long, help = "Work done in the last 30 days")]
    pub last_month: bool,

    #[arg(long, help = "Work done this week (Monday-today)")]
    pub this_week: bool,

    #[arg(long, help = "Work done this month")]
    pub this_month: bool,

    #[arg(long, help = "Work done in the last 365 days")]
    pub last_year: bool,

    #[arg(long, help = "Custom date range (requires --start and --end)")]
    pub custom: bool,

    #[arg(long, help = "Start of custom range (YYYY-MM-DD, RFC3339 or e.g. '90d')")]
    pub start: Option<String>,

    #[arg(long, help = "End of custom range (YYYY-MM-DD, RFC3339 or e.g. '1d')")]
    pub end: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, value_enum, default_value_t = GroupBy::Repo, help = "How to group the results")]
    pub group_by: GroupBy,

    #[arg(long, help = "Export summary to file")]
    pub export: Option<PathBuf>,

    #[arg(long, help = "Include statistics (line counts, PR counts)")]
    pub include_stats: bool,

    #[arg(long, help = "Copy the summary to the clipboard")]
    pub copy: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Year { year, all_years, json, ndjson } => {
                crate::yearly::exec(&self.common, year, all_years, json, ndjson)
            }
            Commands::Lifetime { json, ndjson } => crate::lifetime::exec(&self.common, json, ndjson),
            Commands::Productivity(args) => crate::productivity::exec(&self.common, &args),
            Commands::Metrics(args) => crate::metrics::exec(&self.common, &args),
            Commands::Summary(args) => crate::summary::exec(&self.common, &args),
        }
    }
}
