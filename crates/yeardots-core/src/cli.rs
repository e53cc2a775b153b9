use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::calendar::{WeekStart, parse_day_key};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "yeardots",
    version,
    about = "Year-at-a-glance calendar with per-day dots"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Year to show; defaults to the current local year.
    #[arg(long = "year", allow_hyphen_values = true)]
    pub year: Option<i32>,

    /// Locale tag for month titles, e.g. `en-US` or `ru`.
    #[arg(long = "locale")]
    pub locale: Option<String>,

    /// First column of each week: 0-6 (0 = Sunday) or a weekday name.
    #[arg(
        long = "week-start",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<WeekStart>())
    )]
    pub week_start: Option<WeekStart>,

    /// Pin "today" instead of reading the clock (YYYY-MM-DD).
    #[arg(
        long = "today",
        value_parser = clap::builder::ValueParser::new(|s: &str| parse_day_key(s))
    )]
    pub today: Option<NaiveDate>,

    /// JSON file of per-day dot overrides.
    #[arg(long = "dots")]
    pub dots: Option<PathBuf>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "json")]
    pub json: bool,

    #[arg(long = "no-color")]
    pub no_color: bool,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_invocation() {
        let cli = GlobalCli::parse_from([
            "yeardots",
            "-vv",
            "--year",
            "2024",
            "--locale",
            "de-DE",
            "--week-start",
            "sunday",
            "--today",
            "2024-11-15",
            "--json",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.year, Some(2024));
        assert_eq!(cli.locale.as_deref(), Some("de-DE"));
        assert_eq!(cli.week_start, Some(WeekStart::SUNDAY));
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2024, 11, 15));
        assert!(cli.json);
        assert!(!cli.no_color);
    }

    #[test]
    fn rejects_out_of_range_week_start() {
        let err = GlobalCli::try_parse_from(["yeardots", "--week-start", "7"])
            .expect_err("week start 7");
        assert!(err.to_string().contains("week start must be in 0..=6"));

        let err = GlobalCli::try_parse_from(["yeardots", "--week-start", "someday"])
            .expect_err("unknown weekday name");
        let message = err.to_string();
        assert!(message.contains("unknown week start \"someday\""));
        assert!(!message.contains("got -1"));
    }

    #[test]
    fn rejects_malformed_today() {
        assert!(GlobalCli::try_parse_from(["yeardots", "--today", "2024-13-01"]).is_err());
    }
}
