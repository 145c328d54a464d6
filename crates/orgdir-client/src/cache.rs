//! Read-through response cache with time-of-day expiration.
//!
//! The backend's organisation data changes on a slow, scheduled cadence, so
//! cached responses expire at fixed times of day (e.g. after the nightly
//! sync) rather than after a sliding TTL. Expiry is the first upcoming
//! occurrence of any configured `"HH:MM"` expression (UTC). Staleness
//! inside a window is an accepted tradeoff, not a correctness violation.

use std::{collections::HashMap, sync::Mutex};

use chrono::{DateTime, Duration, NaiveTime, Utc};
use orgdir_core::{Result, settings::parse_expiration};
use serde_json::Value;

struct CacheEntry {
  value:      Value,
  expires_at: DateTime<Utc>,
}

/// Response cache keyed by request path+query. Safe for concurrent use.
/// With no expiration expressions configured the cache is disabled.
pub struct ResponseCache {
  expirations: Vec<NaiveTime>,
  entries:     Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
  pub fn new(expressions: &[String]) -> Result<Self> {
    let expirations = expressions
      .iter()
      .map(|e| parse_expiration(e))
      .collect::<Result<Vec<_>>>()?;
    Ok(ResponseCache { expirations, entries: Mutex::new(HashMap::new()) })
  }

  pub fn enabled(&self) -> bool { !self.expirations.is_empty() }

  pub fn get(&self, key: &str) -> Option<Value> {
    if !self.enabled() {
      return None;
    }
    let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
    match entries.get(key) {
      Some(entry) if entry.expires_at > Utc::now() => Some(entry.value.clone()),
      Some(_) => {
        entries.remove(key);
        None
      }
      None => None,
    }
  }

  pub fn put(&self, key: String, value: Value) {
    let Some(expires_at) = next_expiry_after(&self.expirations, Utc::now())
    else {
      return;
    };
    self
      .entries
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .insert(key, CacheEntry { value, expires_at });
  }
}

/// The first occurrence of any of `times` strictly after `now` — today if
/// the time of day is still ahead, otherwise tomorrow.
pub fn next_expiry_after(
  times: &[NaiveTime],
  now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
  times
    .iter()
    .map(|t| {
      let today = now.date_naive().and_time(*t).and_utc();
      if today > now { today } else { today + Duration::days(1) }
    })
    .min()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn t(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
  }

  fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
  }

  #[test]
  fn next_expiry_picks_the_first_upcoming_time() {
    let times = [t("06:00"), t("18:00")];
    let expiry = next_expiry_after(&times, at("2024-03-01T10:00:00Z")).unwrap();
    assert_eq!(expiry, at("2024-03-01T18:00:00Z"));
  }

  #[test]
  fn next_expiry_rolls_over_to_tomorrow() {
    let times = [t("06:00")];
    let expiry = next_expiry_after(&times, at("2024-03-01T10:00:00Z")).unwrap();
    assert_eq!(expiry, at("2024-03-02T06:00:00Z"));
  }

  #[test]
  fn expiry_exactly_now_counts_as_passed() {
    let times = [t("06:00")];
    let expiry = next_expiry_after(&times, at("2024-03-01T06:00:00Z")).unwrap();
    assert_eq!(expiry, at("2024-03-02T06:00:00Z"));
  }

  #[test]
  fn no_expressions_means_no_expiry_and_no_caching() {
    assert!(next_expiry_after(&[], at("2024-03-01T10:00:00Z")).is_none());

    let cache = ResponseCache::new(&[]).unwrap();
    cache.put("k".into(), json!(1));
    assert!(cache.get("k").is_none());
  }

  #[test]
  fn put_then_get_round_trips_while_fresh() {
    // 23:59 and 00:00 bracket any wall clock within a minute, so the entry
    // is always fresh immediately after insertion.
    let cache =
      ResponseCache::new(&["23:59".into(), "00:00".into()]).unwrap();
    cache.put("bruger/u1".into(), json!({ "navn": "Alice" }));
    assert_eq!(
      cache.get("bruger/u1").unwrap(),
      json!({ "navn": "Alice" })
    );
    assert!(cache.get("bruger/u2").is_none());
  }

  #[test]
  fn malformed_expression_is_rejected() {
    assert!(ResponseCache::new(&["not a time".into()]).is_err());
  }
}
