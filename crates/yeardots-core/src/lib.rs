pub mod calendar;
pub mod cli;
pub mod config;
pub mod dots;
pub mod error;
pub mod marker;
pub mod month_title;
pub mod render;

use std::ffi::OsString;
use std::io::{
  self,
  IsTerminal,
  Write
};

use anyhow::Context;
use chrono::{
  Datelike,
  Local
};
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use calendar::{
  Cell,
  DayCell,
  MonthView,
  WeekStart,
  YearCalendar,
  YearCalendarBuilder,
  build_year
};
pub use error::CalendarError;
pub use marker::{
  AnniversaryRule,
  Category,
  DayMarker,
  DotKind,
  DotsMap,
  classify
};
pub use month_title::{
  ChronoMonthTitles,
  MonthTitleFormatter
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli = cli::GlobalCli::parse_from(
    raw_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting yeardots"
  );

  let cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  debug!(loaded = ?cfg.loaded_file, "resolved config");

  let today = cli
    .today
    .unwrap_or_else(|| {
      Local::now().date_naive()
    });
  let year =
    cli.year.unwrap_or(today.year());
  let locale = cli
    .locale
    .as_deref()
    .unwrap_or(&cfg.locale);
  let week_start = cli
    .week_start
    .unwrap_or(cfg.week_start);

  let builder =
    YearCalendarBuilder::new(
      year,
      locale,
      i64::from(week_start.index())
    )
    .with_context(|| {
      format!(
        "cannot build calendar for \
         {year} ({locale})"
      )
    })?;
  let calendar = builder.build(today)?;

  let dots = match cli
    .dots
    .as_deref()
    .or(cfg.dots.as_deref())
  {
    | Some(path) => {
      dots::load_dots(
        &config::expand_tilde(path)
      )?
    }
    | None => DotsMap::new()
  };
  let marker = cfg.day_marker();

  let stdout = io::stdout();
  let color = cfg.color
    && !cli.no_color
    && stdout.is_terminal();
  let mut out = stdout.lock();

  if cli.json {
    render::write_year_json(
      &mut out, &calendar, &marker,
      &dots
    )?;
  } else {
    render::Renderer::new(color)
      .write_year(
        &mut out, &calendar, &marker,
        &dots
      )?;
  }
  out.flush()?;

  info!("done");
  Ok(())
}
