//! Federated search across the backend's entity types.
//!
//! A query is either scoped to one entity type or unscoped, in which case
//! its filter keys are partitioned across the types that recognise them and
//! one sub-search is dispatched per type. Results are merged into a single
//! id-keyed, duplicate-free collection.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  Error, Result,
  directory::Directory,
};

// ─── Filter keys ─────────────────────────────────────────────────────────────

pub const FILTER_ADRESSETEKST: &str = "adressetekst";
pub const FILTER_BRUGERNAVN: &str = "brugernavn";
pub const FILTER_LEDER: &str = "leder";
pub const FILTER_TILKNYTTEDEPERSONER: &str = "tilknyttedepersoner";
pub const FILTER_NAVNTEKST: &str = "navntekst";

// ─── Entity type ─────────────────────────────────────────────────────────────

/// A searchable backend entity type. The wire names are the backend's Danish
/// entity names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
  #[serde(rename = "adresse")]
  Address,
  #[serde(rename = "bruger")]
  User,
  #[serde(rename = "person")]
  Person,
}

impl EntityType {
  pub const ALL: [EntityType; 3] =
    [EntityType::Address, EntityType::User, EntityType::Person];

  pub fn as_str(&self) -> &'static str {
    match self {
      EntityType::Address => "adresse",
      EntityType::User => "bruger",
      EntityType::Person => "person",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "adresse" => Ok(EntityType::Address),
      "bruger" => Ok(EntityType::User),
      "person" => Ok(EntityType::Person),
      other => Err(Error::InvalidArgument(format!("invalid search type: {other}"))),
    }
  }

  /// The filter keys this entity type recognises. A key belongs to exactly
  /// one type's set.
  pub fn filter_keys(&self) -> &'static [&'static str] {
    match self {
      EntityType::Address => &[FILTER_ADRESSETEKST],
      EntityType::User => {
        &[FILTER_BRUGERNAVN, FILTER_LEDER, FILTER_TILKNYTTEDEPERSONER]
      }
      EntityType::Person => &[FILTER_NAVNTEKST],
    }
  }

  /// The free-text filter key used when a caller supplies a bare string
  /// instead of an explicit filter map.
  pub fn default_filter_key(&self) -> &'static str {
    match self {
      EntityType::Address => FILTER_ADRESSETEKST,
      EntityType::User => FILTER_BRUGERNAVN,
      EntityType::Person => FILTER_NAVNTEKST,
    }
  }
}

impl std::fmt::Display for EntityType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The entity type that owns `key`, if any does.
pub fn owning_type(key: &str) -> Option<EntityType> {
  EntityType::ALL
    .into_iter()
    .find(|t| t.filter_keys().contains(&key))
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// A typed search query: a map of recognised filter keys to values, with an
/// optional explicit entity-type scope.
///
/// The filter map is a `BTreeMap` so sub-search dispatch and the resulting
/// backend calls are deterministic for a given query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
  #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
  pub entity:  Option<EntityType>,
  #[serde(default)]
  pub filters: BTreeMap<String, Value>,
}

impl SearchQuery {
  pub fn unscoped() -> Self { SearchQuery::default() }

  pub fn scoped(entity: EntityType) -> Self {
    SearchQuery { entity: Some(entity), filters: BTreeMap::new() }
  }

  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.filters.insert(key.into(), value.into());
    self
  }

  /// Fail fast on unusable queries: empty filter maps and filter keys no
  /// entity type recognises. Runs before any backend call.
  pub fn validate(&self) -> Result<()> {
    if self.filters.is_empty() {
      return Err(Error::InvalidArgument("empty search query".into()));
    }
    for key in self.filters.keys() {
      if owning_type(key).is_none() {
        return Err(Error::InvalidArgument(format!(
          "unknown search filter: {key}"
        )));
      }
    }
    Ok(())
  }

  /// Partition the filter keys into per-type sub-queries. Types that
  /// received no keys are absent from the result.
  fn partition(&self) -> BTreeMap<&'static str, BTreeMap<String, Value>> {
    let mut parts: BTreeMap<&'static str, BTreeMap<String, Value>> =
      BTreeMap::new();
    for (key, value) in &self.filters {
      if let Some(entity) = owning_type(key) {
        parts
          .entry(entity.as_str())
          .or_default()
          .insert(key.clone(), value.clone());
      }
    }
    parts
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// A lightweight projection of one backend entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
  #[serde(rename = "type")]
  pub entity:     EntityType,
  pub id:         String,
  pub properties: serde_json::Map<String, Value>,
}

/// Id-keyed, duplicate-free collection of search hits. A later insert for an
/// id already present overwrites the earlier hit (last-writer-wins).
/// Iteration order is not guaranteed.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
  hits: HashMap<String, SearchHit>,
}

impl SearchResult {
  pub fn insert(&mut self, hit: SearchHit) {
    self.hits.insert(hit.id.clone(), hit);
  }

  pub fn extend(&mut self, hits: impl IntoIterator<Item = SearchHit>) {
    for hit in hits {
      self.insert(hit);
    }
  }

  pub fn get(&self, id: &str) -> Option<&SearchHit> { self.hits.get(id) }

  pub fn len(&self) -> usize { self.hits.len() }

  pub fn is_empty(&self) -> bool { self.hits.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = &SearchHit> {
    self.hits.values()
  }

  pub fn into_hits(self) -> Vec<SearchHit> {
    self.hits.into_values().collect()
  }
}

// ─── Federation ──────────────────────────────────────────────────────────────

/// Run a federated search.
///
/// Scoped queries dispatch directly to the backend. Unscoped queries are
/// partitioned across entity types by filter key, one sub-search per type
/// that received keys; person hits then trigger one follow-up user search
/// per person id (the backend cannot filter users by a list of person ids
/// in one call). Any sub-search failure aborts the whole federated call —
/// partial results are never returned as success.
pub async fn federate<D: Directory>(
  dir:   &D,
  query: &SearchQuery,
) -> Result<SearchResult> {
  query.validate()?;

  let mut result = SearchResult::default();

  if let Some(entity) = query.entity {
    result.extend(dir.search(entity, &query.filters).await?);
    return Ok(result);
  }

  let parts = query.partition();
  let mut person_hits: Vec<SearchHit> = Vec::new();

  for entity in EntityType::ALL {
    let Some(filters) = parts.get(entity.as_str()) else { continue };
    let hits = dir.search(entity, filters).await?;
    if entity == EntityType::Person {
      person_hits = hits.clone();
    }
    result.extend(hits);
  }

  // Each person hit pulls in the user entities attached to it. One call per
  // person id; the backend has no batched person-id filter.
  for person in &person_hits {
    let mut filters = BTreeMap::new();
    filters.insert(
      FILTER_TILKNYTTEDEPERSONER.to_owned(),
      Value::String(person.id.clone()),
    );
    result.extend(dir.search(EntityType::User, &filters).await?);
  }

  Ok(result)
}
