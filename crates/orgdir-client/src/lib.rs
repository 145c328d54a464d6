//! HTTP backend for the orgdir organisation directory.
//!
//! [`HttpDirectory`] implements [`orgdir_core::directory::Directory`]
//! against the organisation service's REST surface. All wire decoding lives
//! in [`wire`]; responses are optionally cached until the next configured
//! time of day (see [`cache`]). Transport security and credentials are the
//! embedder's concern — this crate only receives an endpoint.

mod cache;
mod wire;

use std::{
  collections::{BTreeMap, HashSet},
  sync::Arc,
  time::Duration,
};

use orgdir_core::{
  Error, Result,
  directory::Directory,
  path::OrganisationPath,
  person::{
    FunctionAttributes, FunctionId, ManagerLink, PersonAttributes, PersonId,
  },
  search::{EntityType, SearchHit},
  settings::Settings,
};
use reqwest::StatusCode;
use serde_json::Value;

use cache::ResponseCache;
use wire::{BrugerPayload, Collection, FunktionPayload, LederPayload, PathEntryPayload};

// ─── Client ──────────────────────────────────────────────────────────────────

/// HTTP client for the organisation service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based and the
/// response cache is shared. Safe for concurrent use by simultaneous
/// requests.
#[derive(Clone)]
pub struct HttpDirectory {
  client:   reqwest::Client,
  settings: Settings,
  cache:    Arc<ResponseCache>,
}

impl HttpDirectory {
  /// Build a client from validated settings. Fails fast on malformed
  /// settings, before any network traffic.
  pub fn new(settings: Settings) -> Result<Self> {
    settings.validate()?;
    let cache = Arc::new(ResponseCache::new(&settings.cache_expirations)?);
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(settings.request_timeout_secs))
      .build()
      .map_err(|e| Error::InvalidSetting(format!("building HTTP client: {e}")))?;
    Ok(HttpDirectory { client, settings, cache })
  }

  pub fn settings(&self) -> &Settings { &self.settings }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.settings.endpoint.trim_end_matches('/'), path)
  }

  /// Perform a GET, translating failures into the shared taxonomy.
  /// `None` means the backend has no such resource (HTTP 404).
  async fn request(
    &self,
    path:  &str,
    query: &[(String, String)],
  ) -> Result<Option<Value>> {
    let url = self.url(path);
    tracing::debug!(%url, "GET");

    let response = self
      .client
      .get(&url)
      .query(query)
      .send()
      .await
      .map_err(|e| Error::unavailable(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::BackendRejected { status: status.as_u16(), body });
    }

    let value = response
      .json()
      .await
      .map_err(|e| Error::unavailable(format!("decoding response from {url}: {e}")))?;
    Ok(Some(value))
  }

  /// Read-through variant of [`Self::request`]. Only successful bodies are
  /// cached; "not found" and errors always hit the backend again.
  async fn request_cached(
    &self,
    path:  &str,
    query: &[(String, String)],
  ) -> Result<Option<Value>> {
    let key = cache_key(path, query);
    if let Some(value) = self.cache.get(&key) {
      tracing::debug!(path, "cache hit");
      return Ok(Some(value));
    }
    let value = self.request(path, query).await?;
    if let Some(value) = &value {
      self.cache.put(key, value.clone());
    }
    Ok(value)
  }

  fn decode<T: serde::de::DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
      .map_err(|e| Error::unavailable(format!("unexpected payload from {path}: {e}")))
  }
}

fn cache_key(path: &str, query: &[(String, String)]) -> String {
  let mut key = path.to_owned();
  for (k, v) in query {
    key.push_str(&format!("&{k}={v}"));
  }
  key
}

/// Render a JSON filter value as a query-string parameter.
fn param_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    other => other.to_string(),
  }
}

// ─── Directory implementation ────────────────────────────────────────────────

impl Directory for HttpDirectory {
  async fn get_person(&self, id: &PersonId) -> Result<Option<PersonAttributes>> {
    let path = format!("bruger/{id}");
    match self.request_cached(&path, &[]).await? {
      Some(value) => {
        let payload: BrugerPayload = Self::decode(&path, value)?;
        Ok(Some(payload.into_attributes(id)))
      }
      None => Ok(None),
    }
  }

  async fn get_functions(
    &self,
    person_id: &PersonId,
    manager_scope: bool,
  ) -> Result<Vec<FunctionAttributes>> {
    let path = if manager_scope {
      format!("bruger/{person_id}/leder-funktioner")
    } else {
      format!("bruger/{person_id}/funktioner")
    };
    let Some(value) = self.request_cached(&path, &[]).await? else {
      return Ok(Vec::new());
    };
    let collection: Collection<FunktionPayload> = Self::decode(&path, value)?;

    // Discovery order is preserved; duplicate or missing ids cannot be
    // keyed and are dropped.
    let mut seen = HashSet::new();
    let mut functions = Vec::new();
    for payload in collection.member {
      if payload.id.is_empty() {
        tracing::warn!(person = %person_id, "skipping funktion without id");
        continue;
      }
      if seen.insert(payload.id.clone()) {
        functions.push(FunctionAttributes::from(payload));
      }
    }
    Ok(functions)
  }

  async fn get_organisation_path(
    &self,
    function_id: &FunctionId,
  ) -> Result<OrganisationPath> {
    let path = format!("funktion/{function_id}/organisation-path");
    let Some(value) = self.request_cached(&path, &[]).await? else {
      return Ok(OrganisationPath::default());
    };
    let collection: Collection<PathEntryPayload> = Self::decode(&path, value)?;
    Ok(wire::path_from_members(collection.member))
  }

  async fn get_manager_links(&self, person_id: &PersonId) -> Result<Vec<ManagerLink>> {
    let path = format!("bruger/{person_id}/leder");
    let query = vec![(
      "funktionstype".to_owned(),
      self.settings.manager_role_id().to_owned(),
    )];
    let Some(value) = self.request_cached(&path, &query).await? else {
      return Ok(Vec::new());
    };
    let collection: Collection<LederPayload> = Self::decode(&path, value)?;
    Ok(collection.member.into_iter().map(ManagerLink::from).collect())
  }

  async fn search(
    &self,
    entity: EntityType,
    filters: &BTreeMap<String, Value>,
  ) -> Result<Vec<SearchHit>> {
    let path = entity.as_str();
    let mut query = vec![("page".to_owned(), "1".to_owned())];
    for (key, value) in filters {
      query.push((key.clone(), param_value(value)));
    }

    let Some(value) = self.request(path, &query).await? else {
      return Ok(Vec::new());
    };
    let collection: Collection<Value> = Self::decode(path, value)?;

    let mut hits = Vec::new();
    for member in collection.member {
      match wire::hit_from_member(entity, member) {
        Some(hit) => hits.push(hit),
        None => tracing::warn!(%entity, "skipping search hit without id"),
      }
    }
    Ok(hits)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use orgdir_core::settings::Settings;

  fn settings() -> Settings {
    Settings {
      manager_role_prod: "role-prod".into(),
      ..Settings::new("https://org.example.dk/api/")
    }
  }

  #[test]
  fn url_joins_without_duplicate_slashes() {
    let dir = HttpDirectory::new(settings()).unwrap();
    assert_eq!(
      dir.url("bruger/u1"),
      "https://org.example.dk/api/bruger/u1"
    );
  }

  #[test]
  fn invalid_settings_are_rejected_before_any_network_call() {
    let mut s = settings();
    s.manager_role_prod = String::new();
    assert!(matches!(
      HttpDirectory::new(s),
      Err(Error::InvalidSetting(_))
    ));
  }

  #[test]
  fn cache_key_includes_query_parameters() {
    let plain = cache_key("bruger/u1/leder", &[]);
    let keyed = cache_key(
      "bruger/u1/leder",
      &[("funktionstype".into(), "role-prod".into())],
    );
    assert_ne!(plain, keyed);
  }

  #[test]
  fn param_value_renders_scalars_plainly() {
    assert_eq!(param_value(&Value::String("Anders".into())), "Anders");
    assert_eq!(param_value(&Value::Bool(true)), "true");
    assert_eq!(param_value(&Value::from(7)), "7");
  }
}
