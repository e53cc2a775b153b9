//! Year-view calendar grid: twelve month grids of whole weeks plus
//! year progress figures.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::error::CalendarError;
use crate::month_title::{ChronoMonthTitles, MonthTitleFormatter};

/// Format of [`DayCell::key`].
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

const DAYS_PER_WEEK: usize = 7;

/// Canonical `YYYY-MM-DD` key of a date.
#[must_use]
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parses a canonical day key. Keys that parse but are not in canonical
/// zero-padded form (e.g. `2024-1-5`) are rejected.
pub fn parse_day_key(key: &str) -> Result<NaiveDate, CalendarError> {
    let invalid = || CalendarError::InvalidDateKey {
        key: key.to_string(),
    };
    let date = NaiveDate::parse_from_str(key, DAY_KEY_FORMAT).map_err(|_| invalid())?;
    if day_key(date) != key {
        return Err(invalid());
    }
    Ok(date)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub key: String,
}

impl DayCell {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            key: day_key(date),
        }
    }
}

/// One slot of a month grid. Serializes as `null` or `{date, key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Day(DayCell),
}

impl Cell {
    #[must_use]
    pub fn day(&self) -> Option<&DayCell> {
        match self {
            Cell::Empty => None,
            Cell::Day(day) => Some(day),
        }
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.day().map(|day| day.date)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<NaiveDate> for Cell {
    fn from(date: NaiveDate) -> Self {
        Cell::Day(DayCell::new(date))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    /// Zero-based month index (0 = January).
    pub month: u32,
    pub title: String,
    pub cells: Vec<Cell>,
}

impl MonthView {
    /// Grid rows, seven cells each.
    pub fn weeks(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(DAYS_PER_WEEK)
    }

    #[must_use]
    pub fn day_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }
}

/// First weekday column of a grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekStart(Weekday);

impl WeekStart {
    pub const SUNDAY: WeekStart = WeekStart(Weekday::Sun);
    pub const MONDAY: WeekStart = WeekStart(Weekday::Mon);

    /// `0` = Sunday .. `6` = Saturday.
    pub fn from_index(index: i64) -> Result<Self, CalendarError> {
        let weekday = match index {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            _ => return Err(CalendarError::InvalidWeekStart { index }),
        };
        Ok(Self(weekday))
    }

    #[must_use]
    pub fn index(self) -> u32 {
        self.0.num_days_from_sunday()
    }

    #[must_use]
    pub fn weekday(self) -> Weekday {
        self.0
    }
}

impl Default for WeekStart {
    fn default() -> Self {
        Self::MONDAY
    }
}

impl From<Weekday> for WeekStart {
    fn from(weekday: Weekday) -> Self {
        Self(weekday)
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts an index (`0`..`6`) or a weekday name (`monday`, `Sun`, ...).
impl FromStr for WeekStart {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<i64>() {
            return Self::from_index(index);
        }
        trimmed
            .parse::<Weekday>()
            .map(Self)
            .map_err(|_| CalendarError::InvalidWeekStartName {
                value: trimmed.to_string(),
            })
    }
}

impl Serialize for WeekStart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.index())
    }
}

/// The full year view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCalendar {
    pub year: i32,
    pub today: NaiveDate,
    pub week_start: WeekStart,
    pub days_in_year: u32,
    pub days_left: u32,
    pub percent_done: u32,
    pub months: Vec<MonthView>,
}

fn year_start(year: i32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or(CalendarError::InvalidYear { year })
}

fn month_start(year: i32, month0: u32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).ok_or(CalendarError::InvalidYear { year })
}

/// Jan 1 of `year` and of the year after; both must exist.
fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), CalendarError> {
    let next = year
        .checked_add(1)
        .ok_or(CalendarError::InvalidYear { year })?;
    let start = year_start(year)?;
    let end = year_start(next).map_err(|_| CalendarError::InvalidYear { year })?;
    Ok((start, end))
}

/// 365 or 366, from the day distance between consecutive New Years.
pub fn days_in_year(year: i32) -> Result<u32, CalendarError> {
    let (start, end) = year_bounds(year)?;
    Ok(day_span(start, end))
}

/// Number of days in a zero-based month, December rolling into January
/// of the following year.
pub fn days_in_month(year: i32, month0: u32) -> Result<u32, CalendarError> {
    if month0 > 11 {
        return Err(CalendarError::InvalidYear { year });
    }
    let first = month_start(year, month0)?;
    let next = if month0 == 11 {
        year_bounds(year)?.1
    } else {
        month_start(year, month0 + 1)?
    };
    Ok(day_span(first, next))
}

fn day_span(from: NaiveDate, to: NaiveDate) -> u32 {
    u32::try_from((to - from).num_days()).unwrap_or(0)
}

/// 1-based position of `date` within `year`; `None` for dates in other
/// years.
#[must_use]
pub fn day_of_year(year: i32, date: NaiveDate) -> Option<u32> {
    let start = year_start(year).ok()?;
    if date.year() != year {
        return None;
    }
    Some(day_span(start, date) + 1)
}

/// Whole year when `today` lies outside it.
#[must_use]
pub fn days_left(year: i32, days_in_year: u32, today: NaiveDate) -> u32 {
    match day_of_year(year, today) {
        Some(elapsed) => days_in_year.saturating_sub(elapsed),
        None => days_in_year,
    }
}

/// Rounded percentage of `year` elapsed up to and including `today`;
/// zero when `today` lies outside it.
#[must_use]
pub fn percent_done(year: i32, days_in_year: u32, today: NaiveDate) -> u32 {
    match day_of_year(year, today) {
        Some(elapsed) if days_in_year > 0 => {
            (f64::from(elapsed) / f64::from(days_in_year) * 100.0).round() as u32
        }
        _ => 0,
    }
}

/// Leading blank cells before `first` lands in its weekday column.
#[must_use]
pub fn month_offset(first: NaiveDate, week_start: WeekStart) -> u32 {
    (first.weekday().num_days_from_sunday() + 7 - week_start.index()) % 7
}

/// Builds [`YearCalendar`]s for one year, locale and week start.
#[derive(Debug, Clone)]
pub struct YearCalendarBuilder<F = ChronoMonthTitles> {
    year: i32,
    week_start: WeekStart,
    titles: F,
}

impl YearCalendarBuilder<ChronoMonthTitles> {
    /// Validates the year, then the week start index, then the locale tag.
    #[tracing::instrument]
    pub fn new(year: i32, locale: &str, week_start: i64) -> Result<Self, CalendarError> {
        year_bounds(year)?;
        let week_start = WeekStart::from_index(week_start)?;
        let titles = ChronoMonthTitles::new(locale)?;
        Ok(Self {
            year,
            week_start,
            titles,
        })
    }
}

impl<F: MonthTitleFormatter> YearCalendarBuilder<F> {
    pub fn with_titles(year: i32, week_start: WeekStart, titles: F) -> Result<Self, CalendarError> {
        year_bounds(year)?;
        Ok(Self {
            year,
            week_start,
            titles,
        })
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Reads the local wall clock on every call.
    pub fn build_for_today(&self) -> Result<YearCalendar, CalendarError> {
        self.build(Local::now().date_naive())
    }

    #[tracing::instrument(skip(self), fields(year = self.year, week_start = %self.week_start))]
    pub fn build(&self, today: NaiveDate) -> Result<YearCalendar, CalendarError> {
        let days_in_year = days_in_year(self.year)?;
        let months = (0..12)
            .map(|month0| self.month(month0))
            .collect::<Result<Vec<_>, _>>()?;

        let calendar = YearCalendar {
            year: self.year,
            today,
            week_start: self.week_start,
            days_in_year,
            days_left: days_left(self.year, days_in_year, today),
            percent_done: percent_done(self.year, days_in_year, today),
            months,
        };
        debug!(
            days_in_year,
            days_left = calendar.days_left,
            percent_done = calendar.percent_done,
            "built year calendar"
        );
        Ok(calendar)
    }

    fn month(&self, month0: u32) -> Result<MonthView, CalendarError> {
        let first = month_start(self.year, month0)?;
        let days = days_in_month(self.year, month0)? as usize;
        let offset = month_offset(first, self.week_start) as usize;
        let total = (offset + days).div_ceil(DAYS_PER_WEEK) * DAYS_PER_WEEK;

        let mut cells = Vec::with_capacity(total);
        cells.resize(offset, Cell::Empty);
        cells.extend(first.iter_days().take(days).map(Cell::from));
        cells.resize(total, Cell::Empty);

        trace!(month0, offset, days, cells = total, "laid out month");
        Ok(MonthView {
            month: month0,
            title: self.titles.format_month(month0, self.year),
            cells,
        })
    }
}

/// One-shot form of [`YearCalendarBuilder`].
pub fn build_year(
    year: i32,
    locale: &str,
    week_start: i64,
    today: NaiveDate,
) -> Result<YearCalendar, CalendarError> {
    YearCalendarBuilder::new(year, locale, week_start)?.build(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn keys_are_zero_padded() {
        assert_eq!(day_key(ymd(2024, 1, 5)), "2024-01-05");
        assert_eq!(day_key(ymd(987, 11, 15)), "0987-11-15");
    }

    #[test]
    fn non_canonical_keys_are_rejected() {
        assert_eq!(parse_day_key("2024-02-29"), Ok(ymd(2024, 2, 29)));
        for key in ["2024-1-05", "2023-02-29", "20240101", "", "2024-01-01T00"] {
            assert!(
                matches!(parse_day_key(key), Err(CalendarError::InvalidDateKey { .. })),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn week_start_parses_names_and_indices() {
        assert_eq!("0".parse::<WeekStart>(), Ok(WeekStart::SUNDAY));
        assert_eq!("monday".parse::<WeekStart>(), Ok(WeekStart::MONDAY));
        assert_eq!("Sat".parse::<WeekStart>().map(WeekStart::index), Ok(6));
        assert_eq!(
            "7".parse::<WeekStart>(),
            Err(CalendarError::InvalidWeekStart { index: 7 })
        );
        assert_eq!(
            "someday".parse::<WeekStart>(),
            Err(CalendarError::InvalidWeekStartName {
                value: "someday".to_string()
            })
        );
    }

    #[test]
    fn offset_follows_week_start() {
        // 2025-06-01 is a Sunday.
        let first = ymd(2025, 6, 1);
        assert_eq!(month_offset(first, WeekStart::SUNDAY), 0);
        assert_eq!(month_offset(first, WeekStart::MONDAY), 6);
        let saturday = WeekStart::from_index(6).expect("saturday");
        assert_eq!(month_offset(first, saturday), 1);
    }

    #[test]
    fn december_rolls_into_next_year() {
        assert_eq!(days_in_month(2024, 11), Ok(31));
        assert_eq!(days_in_month(2024, 1), Ok(29));
        assert_eq!(days_in_month(1900, 1), Ok(28));
        assert!(days_in_month(2024, 12).is_err());
    }

    #[test]
    fn progress_outside_the_year() {
        let today = ymd(2023, 7, 1);
        assert_eq!(days_left(2024, 366, today), 366);
        assert_eq!(percent_done(2024, 366, today), 0);
        assert_eq!(day_of_year(2024, today), None);
    }

    #[test]
    fn progress_inside_the_year() {
        assert_eq!(days_left(2024, 366, ymd(2024, 12, 31)), 0);
        assert_eq!(percent_done(2024, 366, ymd(2024, 12, 31)), 100);
        assert_eq!(days_left(2025, 365, ymd(2025, 1, 1)), 364);
        assert_eq!(percent_done(2025, 365, ymd(2025, 1, 1)), 0);
        // 183 / 366 = 50.0%
        assert_eq!(percent_done(2024, 366, ymd(2024, 7, 1)), 50);
    }

    #[test]
    fn custom_title_formatter() {
        let builder = YearCalendarBuilder::with_titles(2024, WeekStart::SUNDAY, |m: u32, _year: i32| {
            format!("M{}", m + 1)
        })
        .expect("builder");
        let calendar = builder.build(ymd(2024, 3, 1)).expect("calendar");
        assert_eq!(calendar.months[0].title, "M1");
        assert_eq!(calendar.months[11].title, "M12");
    }

    #[test]
    fn out_of_range_years_fail_before_layout() {
        assert_eq!(
            days_in_year(i32::MAX),
            Err(CalendarError::InvalidYear { year: i32::MAX })
        );
        let max_year = NaiveDate::MAX.year();
        assert!(YearCalendarBuilder::new(max_year, "en", 1).is_err());
        assert!(YearCalendarBuilder::new(max_year - 1, "en", 1).is_ok());
    }
}
