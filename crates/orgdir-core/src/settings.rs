//! Directory settings.
//!
//! Constructed once at process (or request) start and passed to the client
//! and resolver as an explicit dependency — never read from ambient global
//! state. Also home of the manager-role selector: the function type that
//! designates a managerial relationship differs between the test and
//! production instances of the backend.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_request_timeout() -> u64 { 30 }

/// Connection and behaviour settings for a directory backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  /// Base URL of the organisation service's REST surface.
  pub endpoint: String,

  /// Whether the backend is the test instance. Selects the manager role id.
  #[serde(default)]
  pub test_mode: bool,

  /// Function-type id designating a manager relationship (test instance).
  #[serde(default)]
  pub manager_role_test: String,

  /// Function-type id designating a manager relationship (production).
  #[serde(default)]
  pub manager_role_prod: String,

  /// Time-of-day expressions (`"HH:MM"`, UTC). Cached backend responses
  /// expire at the first chronologically upcoming occurrence. Empty list
  /// disables caching.
  #[serde(default)]
  pub cache_expirations: Vec<String>,

  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs: u64,
}

impl Settings {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Settings {
      endpoint:             endpoint.into(),
      test_mode:            false,
      manager_role_test:    String::new(),
      manager_role_prod:    String::new(),
      cache_expirations:    Vec::new(),
      request_timeout_secs: default_request_timeout(),
    }
  }

  /// The function-type id that identifies a manager relationship on this
  /// backend instance.
  pub fn manager_role_id(&self) -> &str {
    if self.test_mode {
      &self.manager_role_test
    } else {
      &self.manager_role_prod
    }
  }

  /// Fail fast on unusable settings, before any network call.
  pub fn validate(&self) -> Result<()> {
    if self.endpoint.trim().is_empty() {
      return Err(Error::InvalidSetting("endpoint must not be empty".into()));
    }
    if self.manager_role_id().trim().is_empty() {
      let which = if self.test_mode { "manager_role_test" } else { "manager_role_prod" };
      return Err(Error::InvalidSetting(format!(
        "{which} must be set for this instance"
      )));
    }
    for expr in &self.cache_expirations {
      parse_expiration(expr)?;
    }
    Ok(())
  }
}

/// Parse a `"HH:MM"` cache-expiration expression.
pub fn parse_expiration(expr: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(expr.trim(), "%H:%M").map_err(|_| {
    Error::InvalidSetting(format!("invalid cache expiration expression: {expr:?}"))
  })
}
