//! Per-day dot categories.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::Cell;
use crate::error::CalendarError;

/// Forced category for a single day, keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DotKind {
    Muted,
    White,
    Accent,
    Bday,
}

impl FromStr for DotKind {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "muted" => Ok(DotKind::Muted),
            "white" => Ok(DotKind::White),
            "accent" => Ok(DotKind::Accent),
            "bday" => Ok(DotKind::Bday),
            _ => Err(CalendarError::InvalidDotKind {
                value: s.to_string(),
            }),
        }
    }
}

/// Day key to forced dot kind.
pub type DotsMap = BTreeMap<String, DotKind>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Empty,
    Muted,
    White,
    Accent,
    #[serde(alias = "bday")]
    Birthday,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Empty => "empty",
            Category::Muted => "muted",
            Category::White => "white",
            Category::Accent => "accent",
            Category::Birthday => "birthday",
        }
    }

    /// Style class used by the rendering layer.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Category::Empty => "is-empty",
            Category::Muted => "is-muted",
            Category::White => "is-white",
            Category::Accent => "is-accent",
            Category::Birthday => "is-bday",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DotKind> for Category {
    fn from(kind: DotKind) -> Self {
        match kind {
            DotKind::Muted => Category::Muted,
            DotKind::White => Category::White,
            DotKind::Accent => Category::Accent,
            DotKind::Bday => Category::Birthday,
        }
    }
}

/// A (month, day) that gets a fixed category every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnniversaryRule {
    month: u32,
    day: u32,
    category: Category,
}

impl AnniversaryRule {
    pub const BIRTHDAY: AnniversaryRule = AnniversaryRule {
        month: 11,
        day: 15,
        category: Category::Birthday,
    };

    /// `month` is 1-based. Feb 29 is accepted and only fires in leap
    /// years.
    pub fn new(month: u32, day: u32, category: Category) -> Result<Self, CalendarError> {
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(CalendarError::InvalidAnniversary { month, day });
        }
        Ok(Self {
            month,
            day,
            category,
        })
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn matches(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }
}

/// Decides the dot category of a grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMarker {
    anniversaries: Vec<AnniversaryRule>,
}

impl Default for DayMarker {
    fn default() -> Self {
        Self::new(vec![AnniversaryRule::BIRTHDAY])
    }
}

impl DayMarker {
    #[must_use]
    pub fn new(anniversaries: Vec<AnniversaryRule>) -> Self {
        Self { anniversaries }
    }

    #[must_use]
    pub fn anniversaries(&self) -> &[AnniversaryRule] {
        &self.anniversaries
    }

    /// First match wins: empty, anniversary, override, other year,
    /// today, past, future.
    #[must_use]
    pub fn classify(&self, cell: &Cell, year: i32, today: NaiveDate, dots: &DotsMap) -> Category {
        let Some(day) = cell.day() else {
            return Category::Empty;
        };
        let date = day.date;

        if let Some(rule) = self.anniversaries.iter().find(|rule| rule.matches(date)) {
            return rule.category;
        }

        if let Some(forced) = dots.get(&day.key) {
            return Category::from(*forced);
        }

        if date.year() != year {
            return Category::Muted;
        }
        if date == today {
            return Category::Accent;
        }
        if date < today {
            return Category::White;
        }
        Category::Muted
    }
}

/// [`DayMarker::classify`] with the default anniversary rules.
#[must_use]
pub fn classify(cell: &Cell, year: i32, today: NaiveDate, dots: &DotsMap) -> Category {
    DayMarker::default().classify(cell, year, today, dots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn cell(y: i32, m: u32, d: u32) -> Cell {
        Cell::from(ymd(y, m, d))
    }

    #[test]
    fn empty_cell_is_empty() {
        let dots = DotsMap::from([("2024-01-01".to_string(), DotKind::Accent)]);
        assert_eq!(
            classify(&Cell::Empty, 2024, ymd(2024, 1, 1), &dots),
            Category::Empty
        );
    }

    #[test]
    fn past_today_future() {
        let today = ymd(2024, 6, 10);
        let dots = DotsMap::new();
        assert_eq!(classify(&cell(2024, 6, 9), 2024, today, &dots), Category::White);
        assert_eq!(classify(&cell(2024, 6, 10), 2024, today, &dots), Category::Accent);
        assert_eq!(classify(&cell(2024, 6, 11), 2024, today, &dots), Category::Muted);
    }

    #[test]
    fn birthday_beats_override_and_today() {
        let today = ymd(2024, 11, 15);
        let dots = DotsMap::from([("2024-11-15".to_string(), DotKind::White)]);
        assert_eq!(
            classify(&cell(2024, 11, 15), 2024, today, &dots),
            Category::Birthday
        );
        assert_eq!(
            classify(&cell(1999, 11, 15), 2024, today, &DotsMap::new()),
            Category::Birthday
        );
    }

    #[test]
    fn override_beats_year_mismatch() {
        let dots = DotsMap::from([("2023-12-31".to_string(), DotKind::Accent)]);
        assert_eq!(
            classify(&cell(2023, 12, 31), 2024, ymd(2024, 3, 1), &dots),
            Category::Accent
        );
    }

    #[test]
    fn bday_override_maps_to_birthday() {
        let dots = DotsMap::from([("2024-02-02".to_string(), DotKind::Bday)]);
        let category = classify(&cell(2024, 2, 2), 2024, ymd(2024, 1, 1), &dots);
        assert_eq!(category, Category::Birthday);
        assert_eq!(category.css_class(), "is-bday");
    }

    #[test]
    fn configurable_anniversaries() {
        let rule = AnniversaryRule::new(2, 29, Category::Accent).expect("leap day rule");
        let marker = DayMarker::new(vec![rule]);
        let today = ymd(2024, 1, 1);
        let dots = DotsMap::new();
        assert_eq!(marker.classify(&cell(2024, 2, 29), 2024, today, &dots), Category::Accent);
        // Nov 15 is an ordinary future day without the default rule.
        assert_eq!(marker.classify(&cell(2024, 11, 15), 2024, today, &dots), Category::Muted);
    }

    #[test]
    fn impossible_anniversaries_are_rejected() {
        assert_eq!(
            AnniversaryRule::new(2, 30, Category::Birthday),
            Err(CalendarError::InvalidAnniversary { month: 2, day: 30 })
        );
        assert!(AnniversaryRule::new(13, 1, Category::Birthday).is_err());
        assert!(AnniversaryRule::new(0, 1, Category::Birthday).is_err());
    }

    #[test]
    fn dot_kind_parsing() {
        assert_eq!("Accent".parse::<DotKind>(), Ok(DotKind::Accent));
        assert_eq!(
            "birthday".parse::<DotKind>(),
            Err(CalendarError::InvalidDotKind {
                value: "birthday".to_string()
            })
        );
    }
}
