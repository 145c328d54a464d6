//! Handler for `GET /search`.
//!
//! Query parameters map onto a [`SearchQuery`]: `type` (optional) scopes
//! the search to one entity type; every other parameter is a filter key.
//! Success bodies are `{"data": [{"type", "id", "properties"}, ...]}`.

use std::collections::BTreeMap;

use axum::{Json, extract::{Query, State}};
use orgdir_core::{
  directory::Directory,
  search::{EntityType, SearchQuery, federate},
};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

/// `GET /search[?type=<adresse|bruger|person>][&<filter>=<value>...]`
pub async fn handler<D>(
  State(state): State<AppState<D>>,
  Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Value>, ApiError>
where
  D: Directory + 'static,
{
  let mut params = params;
  let entity = params
    .remove("type")
    .map(|t| EntityType::parse(&t))
    .transpose()?;

  let query = SearchQuery {
    entity,
    filters: params
      .into_iter()
      .map(|(k, v)| (k, Value::String(v)))
      .collect(),
  };

  let result = federate(&*state.dir, &query).await?;

  // Sort by id so the response body is deterministic; the merged set
  // itself carries no order.
  let mut hits = result.into_hits();
  hits.sort_by(|a, b| a.id.cmp(&b.id));

  Ok(Json(json!({ "data": hits })))
}
