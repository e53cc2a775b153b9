use std::io::Write;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::calendar::{Cell, MonthView, YearCalendar};
use crate::marker::{Category, DayMarker, DotsMap};

const MONTHS_PER_BAND: usize = 3;
const CELL_WIDTH: usize = 3;
const MONTH_WIDTH: usize = CELL_WIDTH * 7;
const MONTH_GAP: &str = "  ";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Text grid, three months per band, followed by the progress line.
    #[tracing::instrument(skip_all, fields(year = calendar.year))]
    pub fn write_year<W: Write>(
        &self,
        mut out: W,
        calendar: &YearCalendar,
        marker: &DayMarker,
        dots: &DotsMap,
    ) -> anyhow::Result<()> {
        let header = weekday_header(calendar.week_start.weekday());

        for (band_idx, band) in calendar.months.chunks(MONTHS_PER_BAND).enumerate() {
            if band_idx > 0 {
                writeln!(out)?;
            }

            let titles = band
                .iter()
                .map(|month| center(&month.title, MONTH_WIDTH))
                .collect::<Vec<_>>();
            writeln!(out, "{}", titles.join(MONTH_GAP).trim_end())?;

            let headers = vec![header.clone(); band.len()];
            writeln!(out, "{}", headers.join(MONTH_GAP).trim_end())?;

            let rows = band
                .iter()
                .map(|month| month.cells.len() / 7)
                .max()
                .unwrap_or(0);
            for row in 0..rows {
                let line = band
                    .iter()
                    .map(|month| self.week_row(month, row, calendar, marker, dots))
                    .collect::<Vec<_>>();
                writeln!(out, "{}", line.join(MONTH_GAP).trim_end())?;
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "{} days left, {}% done",
            calendar.days_left, calendar.percent_done
        )?;
        Ok(())
    }

    fn week_row(
        &self,
        month: &MonthView,
        row: usize,
        calendar: &YearCalendar,
        marker: &DayMarker,
        dots: &DotsMap,
    ) -> String {
        let Some(week) = month.weeks().nth(row) else {
            return " ".repeat(MONTH_WIDTH);
        };

        week.iter()
            .map(|cell| {
                let category = marker.classify(cell, calendar.year, calendar.today, dots);
                self.cell(cell, category)
            })
            .collect()
    }

    fn cell(&self, cell: &Cell, category: Category) -> String {
        let Some(date) = cell.date() else {
            return " ".repeat(CELL_WIDTH);
        };
        let text = format!("{:>2}{}", date.day(), category_mark(category));
        match category_color(category) {
            Some(code) => self.paint(&text, code),
            None => text,
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn category_mark(category: Category) -> char {
    match category {
        Category::Empty | Category::Muted => ' ',
        Category::White => '.',
        Category::Accent => '*',
        Category::Birthday => '+',
    }
}

fn category_color(category: Category) -> Option<&'static str> {
    match category {
        Category::Empty => None,
        Category::Muted => Some("90"),
        Category::White => Some("97"),
        Category::Accent => Some("1;33"),
        Category::Birthday => Some("1;35"),
    }
}

fn weekday_header(start: Weekday) -> String {
    let mut day = start;
    let mut labels = Vec::with_capacity(7);
    for _ in 0..7 {
        let name = day.to_string();
        labels.push(format!("{:<width$}", &name[..2], width = CELL_WIDTH));
        day = day.succ();
    }
    labels.concat()
}

fn center(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    let total = width.saturating_sub(visible);
    let left = total / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(total - left))
}

#[derive(Debug, Serialize)]
struct MarkedYear<'a> {
    year: i32,
    today: NaiveDate,
    week_start: u32,
    days_in_year: u32,
    days_left: u32,
    percent_done: u32,
    months: Vec<MarkedMonth<'a>>,
}

#[derive(Debug, Serialize)]
struct MarkedMonth<'a> {
    month: u32,
    title: &'a str,
    cells: Vec<Option<MarkedCell<'a>>>,
}

#[derive(Debug, Serialize)]
struct MarkedCell<'a> {
    date: NaiveDate,
    key: &'a str,
    category: Category,
    class: &'static str,
}

/// The year view model with each cell's category, as pretty JSON.
#[tracing::instrument(skip_all, fields(year = calendar.year))]
pub fn write_year_json<W: Write>(
    mut out: W,
    calendar: &YearCalendar,
    marker: &DayMarker,
    dots: &DotsMap,
) -> anyhow::Result<()> {
    let months = calendar
        .months
        .iter()
        .map(|month| MarkedMonth {
            month: month.month,
            title: &month.title,
            cells: month
                .cells
                .iter()
                .map(|cell| {
                    cell.day().map(|day| {
                        let category = marker.classify(cell, calendar.year, calendar.today, dots);
                        MarkedCell {
                            date: day.date,
                            key: &day.key,
                            category,
                            class: category.css_class(),
                        }
                    })
                })
                .collect(),
        })
        .collect();

    let marked = MarkedYear {
        year: calendar.year,
        today: calendar.today,
        week_start: calendar.week_start.index(),
        days_in_year: calendar.days_in_year,
        days_left: calendar.days_left,
        percent_done: calendar.percent_done,
        months,
    };

    serde_json::to_writer_pretty(&mut out, &marked)?;
    writeln!(out)?;
    Ok(())
}
