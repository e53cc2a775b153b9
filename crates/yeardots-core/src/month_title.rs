use chrono::{
  Locale,
  NaiveDate,
  NaiveTime,
  TimeZone,
  Utc
};
use regex::Regex;

use crate::error::CalendarError;

/// Produces the short label shown above a month grid.
///
/// `month0` is zero-based (0 = January).
pub trait MonthTitleFormatter {
  fn format_month(
    &self,
    month0: u32,
    year: i32
  ) -> String;
}

impl<F> MonthTitleFormatter for F
where
  F: Fn(u32, i32) -> String
{
  fn format_month(
    &self,
    month0: u32,
    year: i32
  ) -> String {
    self(month0, year)
  }
}

/// Short month names from chrono's locale tables (`%b`).
#[derive(Debug, Clone, Copy)]
pub struct ChronoMonthTitles {
  locale: Locale
}

impl ChronoMonthTitles {
  #[tracing::instrument]
  pub fn new(
    tag: &str
  ) -> Result<Self, CalendarError> {
    let locale = resolve_locale(tag)?;
    tracing::debug!(
      tag,
      locale = ?locale,
      "resolved month title locale"
    );
    Ok(Self { locale })
  }

  #[must_use]
  pub fn locale(&self) -> Locale {
    self.locale
  }
}

impl MonthTitleFormatter
  for ChronoMonthTitles
{
  fn format_month(
    &self,
    month0: u32,
    year: i32
  ) -> String {
    let Some(first) = month0
      .checked_add(1)
      .and_then(|month| {
        NaiveDate::from_ymd_opt(
          year, month, 1
        )
      })
    else {
      return format!(
        "{:02}",
        month0.saturating_add(1)
      );
    };

    Utc
      .from_utc_datetime(
        &first.and_time(NaiveTime::MIN)
      )
      .format_localized(
        "%b",
        self.locale
      )
      .to_string()
  }
}

/// Maps a BCP-47 tag (`en`, `en-US`, `zh-Hant-TW`, `es-419`,
/// `en-US-u-ca-gregory`) or a POSIX name (`ru_RU`, `de_AT.UTF-8`) onto a
/// chrono locale. Script, variant and extension subtags do not affect
/// month names and are dropped; numeric regions and regions chrono has
/// no table for fall back to the language's default region.
pub fn resolve_locale(
  tag: &str
) -> Result<Locale, CalendarError> {
  let invalid = || {
    CalendarError::InvalidLocale {
      tag: tag.to_string()
    }
  };

  let trimmed = tag.trim();
  if trimmed.eq_ignore_ascii_case("c")
    || trimmed
      .eq_ignore_ascii_case("posix")
  {
    return Ok(Locale::POSIX);
  }

  let tag_re = Regex::new(
    r"(?x)
    ^(?P<lang>[A-Za-z]{2,3})
    (?:[-_](?P<script>[A-Za-z]{4}))?
    (?:[-_](?P<region>[A-Za-z]{2}|[0-9]{3}))?
    (?:[-_](?:[A-Za-z0-9]{5,8}|[0-9][A-Za-z0-9]{3}))*
    (?:[-_][A-WY-Za-wy-z0-9](?:[-_][A-Za-z0-9]{2,8})+)*
    (?:[-_][Xx](?:[-_][A-Za-z0-9]{1,8})+)?
    (?:[.@].*)?$",
  )
  .map_err(|_| invalid())?;
  let caps = tag_re
    .captures(trimmed)
    .ok_or_else(invalid)?;

  let lang = caps["lang"]
    .to_ascii_lowercase();
  let script = caps
    .name("script")
    .map(|m| m.as_str().to_ascii_lowercase());

  if let Some(region) = caps
    .name("region")
    .map(|m| m.as_str())
    .filter(|region| {
      region
        .chars()
        .all(|c| c.is_ascii_alphabetic())
    })
    && let Some(locale) =
      lookup_locale(&lang, region)
  {
    return Ok(locale);
  }

  let fallback = match script.as_deref() {
    | Some("hant") if lang == "zh" => {
      "TW".to_string()
    }
    | _ => {
      default_region(&lang)
        .map(str::to_string)
        .unwrap_or_else(|| {
          lang.to_ascii_uppercase()
        })
    }
  };

  lookup_locale(&lang, &fallback)
    .ok_or_else(invalid)
}

fn lookup_locale(
  lang: &str,
  region: &str
) -> Option<Locale> {
  let name = format!(
    "{lang}_{}",
    region.to_ascii_uppercase()
  );
  Locale::try_from(name.as_str()).ok()
}

/// Region used when a tag names none (or one chrono lacks) and the
/// language code is not also a region code.
fn default_region(
  lang: &str
) -> Option<&'static str> {
  let region = match lang {
    | "af" => "ZA",
    | "am" => "ET",
    | "ar" => "SA",
    | "az" => "AZ",
    | "be" => "BY",
    | "bn" => "BD",
    | "bs" => "BA",
    | "ca" => "ES",
    | "cs" => "CZ",
    | "da" => "DK",
    | "el" => "GR",
    | "en" => "US",
    | "et" => "EE",
    | "eu" => "ES",
    | "fa" => "IR",
    | "fil" => "PH",
    | "ga" => "IE",
    | "gl" => "ES",
    | "gu" => "IN",
    | "he" => "IL",
    | "hi" => "IN",
    | "hy" => "AM",
    | "ja" => "JP",
    | "ka" => "GE",
    | "kk" => "KZ",
    | "km" => "KH",
    | "kn" => "IN",
    | "ko" => "KR",
    | "ky" => "KG",
    | "lo" => "LA",
    | "ml" => "IN",
    | "mr" => "IN",
    | "ms" => "MY",
    | "my" => "MM",
    | "nb" => "NO",
    | "ne" => "NP",
    | "nn" => "NO",
    | "pa" => "IN",
    | "si" => "LK",
    | "sl" => "SI",
    | "sq" => "AL",
    | "sr" => "RS",
    | "sv" => "SE",
    | "sw" => "KE",
    | "ta" => "IN",
    | "te" => "IN",
    | "tg" => "TJ",
    | "tk" => "TM",
    | "uk" => "UA",
    | "ur" => "PK",
    | "vi" => "VN",
    | "zh" => "CN",
    | _ => return None
  };
  Some(region)
}
