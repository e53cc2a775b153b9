use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{
  debug,
  info
};

use crate::calendar::parse_day_key;
use crate::marker::{
  DotKind,
  DotsMap
};

/// Reads a JSON object of `"YYYY-MM-DD": "muted|white|accent|bday"`.
/// `null` values mean "no override" and are dropped.
#[tracing::instrument]
pub fn load_dots(
  path: &Path
) -> anyhow::Result<DotsMap> {
  let text = fs::read_to_string(path)
    .with_context(|| {
      format!(
        "failed to read dots file {}",
        path.display()
      )
    })?;

  let dots = parse_dots(&text)
    .with_context(|| {
      format!(
        "invalid dots file {}",
        path.display()
      )
    })?;

  info!(
    file = %path.display(),
    entries = dots.len(),
    "loaded dot overrides"
  );
  Ok(dots)
}

pub fn parse_dots(
  text: &str
) -> anyhow::Result<DotsMap> {
  let raw: BTreeMap<
    String,
    Option<DotKind>
  > = serde_json::from_str(text)
    .context(
      "expected a JSON object of day \
       keys to dot kinds"
    )?;

  let mut dots = DotsMap::new();
  for (key, kind) in raw {
    parse_day_key(&key)?;
    match kind {
      | Some(kind) => {
        dots.insert(key, kind);
      }
      | None => {
        debug!(key = %key, "skipping null dot override");
      }
    }
  }

  Ok(dots)
}
