use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::calendar::WeekStart;
use crate::marker::{
  AnniversaryRule,
  Category,
  DayMarker
};

const CONFIG_ENV_VAR: &str =
  "YEARDOTS_CONFIG";
const DEFAULT_LOCALE: &str = "en-US";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
  locale:        Option<String>,
  week_start:    Option<RawWeekStart>,
  dots:          Option<PathBuf>,
  color:         Option<bool>,
  #[serde(rename = "anniversary")]
  anniversaries: Option<Vec<RawAnniversary>>
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawWeekStart {
  Index(i64),
  Name(String)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnniversary {
  month:    u32,
  day:      u32,
  #[serde(default = "default_anniversary_category")]
  category: Category
}

fn default_anniversary_category()
-> Category {
  Category::Birthday
}

#[derive(Debug, Clone)]
pub struct Config {
  pub locale:        String,
  pub week_start:    WeekStart,
  pub dots:          Option<PathBuf>,
  pub color:         bool,
  pub anniversaries: Vec<AnniversaryRule>,
  pub loaded_file:   Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      locale:        DEFAULT_LOCALE
        .to_string(),
      week_start:    WeekStart::default(),
      dots:          None,
      color:         true,
      anniversaries: vec![
        AnniversaryRule::BIRTHDAY,
      ],
      loaded_file:   None
    }
  }
}

impl Config {
  #[tracing::instrument]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) = resolve_config_path(
      config_override
    )?
    else {
      warn!(
        "no config file found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    let mut cfg = Self::from_toml_str(
      &text
    )
    .with_context(|| {
      format!(
        "invalid config file {}",
        path.display()
      )
    })?;

    let base_dir = path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });
    cfg.dots = cfg.dots.map(|dots| {
      resolve_relative(&base_dir, &dots)
    });
    cfg.loaded_file = Some(path);

    Ok(cfg)
  }

  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let raw: RawConfig =
      toml::from_str(text)
        .context("failed to parse TOML")?;
    let defaults = Self::default();

    let week_start = match raw
      .week_start
    {
      | None => defaults.week_start,
      | Some(RawWeekStart::Index(
        index
      )) => WeekStart::from_index(index)?,
      | Some(RawWeekStart::Name(
        name
      )) => name.parse::<WeekStart>()?
    };

    let anniversaries = match raw
      .anniversaries
    {
      | None => defaults.anniversaries,
      | Some(rules) => {
        rules
          .into_iter()
          .map(|rule| {
            AnniversaryRule::new(
              rule.month,
              rule.day,
              rule.category
            )
          })
          .collect::<Result<Vec<_>, _>>()?
      }
    };

    let cfg = Self {
      locale: raw
        .locale
        .unwrap_or(defaults.locale),
      week_start,
      dots: raw.dots,
      color: raw
        .color
        .unwrap_or(defaults.color),
      anniversaries,
      loaded_file: None
    };
    debug!(
      locale = %cfg.locale,
      week_start = %cfg.week_start,
      anniversaries = cfg.anniversaries.len(),
      "parsed config"
    );
    Ok(cfg)
  }

  #[must_use]
  pub fn day_marker(
    &self
  ) -> DayMarker {
    DayMarker::new(
      self.anniversaries.clone()
    )
  }
}

#[tracing::instrument]
fn resolve_config_path(
  config_override: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = config_override {
    let path = expand_tilde(path);
    if !path.exists() {
      return Err(anyhow!(
        "config file {} does not exist",
        path.display()
      ));
    }
    return Ok(Some(path));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed == "/dev/null" {
      return Ok(None);
    }
    if !trimmed.is_empty() {
      return Ok(Some(expand_tilde(
        Path::new(trimmed)
      )));
    }
  }

  let candidate =
    dirs::config_dir().map(|dir| {
      dir
        .join("yeardots")
        .join("config.toml")
    });
  Ok(candidate.filter(|path| {
    path.exists()
  }))
}

fn resolve_relative(
  base_dir: &Path,
  path: &Path
) -> PathBuf {
  let expanded = expand_tilde(path);
  if expanded.is_absolute() {
    expanded
  } else {
    base_dir.join(expanded)
  }
}

pub(crate) fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
