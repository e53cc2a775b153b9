//! Error types for the calendar and marker layers.

/// Invalid-argument conditions raised by the year builder and the
/// dot/key parsers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// The year (or the year after it) is outside the supported
    /// proleptic Gregorian range.
    #[error("year {year} is outside the supported calendar range")]
    InvalidYear {
        /// The rejected year.
        year: i32,
    },

    /// Week start index outside 0 (Sunday) ..= 6 (Saturday).
    #[error("week start must be in 0..=6 (0 = Sunday), got {index}")]
    InvalidWeekStart {
        /// The rejected index.
        index: i64,
    },

    /// Week start given as a name that is not a weekday.
    #[error("unknown week start {value:?}, expected 0-6 or a weekday name")]
    InvalidWeekStartName {
        /// The rejected text.
        value: String,
    },

    /// Locale tag the month-title formatter cannot resolve.
    #[error("unknown locale tag: {tag:?}")]
    InvalidLocale {
        /// The rejected tag.
        tag: String,
    },

    /// A day key that is not a valid `YYYY-MM-DD` date.
    #[error("invalid day key {key:?}, expected YYYY-MM-DD")]
    InvalidDateKey {
        /// The rejected key.
        key: String,
    },

    /// Unknown dot override kind.
    #[error("unknown dot kind {value:?}, expected muted|white|accent|bday")]
    InvalidDotKind {
        /// The rejected value.
        value: String,
    },

    /// Anniversary month/day pair that never occurs in any year.
    #[error("invalid anniversary {month}/{day}")]
    InvalidAnniversary {
        /// Calendar month, 1-based.
        month: u32,
        /// Day of month.
        day: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_week_start_message() {
        let e = CalendarError::InvalidWeekStart { index: 7 };
        assert_eq!(
            e.to_string(),
            "week start must be in 0..=6 (0 = Sunday), got 7"
        );
    }

    #[test]
    fn invalid_week_start_name_message() {
        let e = CalendarError::InvalidWeekStartName {
            value: "someday".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "unknown week start \"someday\", expected 0-6 or a weekday name"
        );
    }

    #[test]
    fn invalid_locale_message() {
        let e = CalendarError::InvalidLocale {
            tag: "xx-YY".to_string(),
        };
        assert_eq!(e.to_string(), "unknown locale tag: \"xx-YY\"");
    }

    #[test]
    fn error_is_std_error_and_send_sync() {
        fn assert_impl<T: std::error::Error + Send + Sync>() {}
        assert_impl::<CalendarError>();
    }
}
