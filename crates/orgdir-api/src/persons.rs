//! Handlers for `/persons` endpoints and `/me`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/persons/{id}` | Full nested record; `?manager-levels=N`, `?gaps=degrade` |
//! | `GET`  | `/persons/{id}/display-name` | `{"id", "name"}` |
//! | `GET`  | `/me` | Resolves the installed current-user id; 404 when none |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use orgdir_core::{
  Error,
  directory::Directory,
  person::{PersonId, PersonRecord},
  resolve::{GapPolicy, ResolveOptions, display_name, resolve_person},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct ResolveParams {
  #[serde(rename = "manager-levels")]
  pub manager_levels: Option<u32>,
  /// `"fail"` (default) or `"degrade"`.
  pub gaps:           Option<String>,
}

impl ResolveParams {
  fn options(&self) -> Result<ResolveOptions, ApiError> {
    let gap_policy = match self.gaps.as_deref() {
      None | Some("fail") => GapPolicy::Fail,
      Some("degrade") => GapPolicy::Degrade,
      Some(other) => {
        return Err(
          Error::InvalidArgument(format!("invalid gap policy: {other}")).into(),
        );
      }
    };
    Ok(ResolveOptions {
      max_manager_levels: self.manager_levels.unwrap_or(1),
      gap_policy,
    })
  }
}

/// `GET /persons/{id}[?manager-levels=N][&gaps=degrade]`
pub async fn get_one<D>(
  State(state): State<AppState<D>>,
  Path(id): Path<String>,
  Query(params): Query<ResolveParams>,
) -> Result<Json<PersonRecord>, ApiError>
where
  D: Directory + 'static,
{
  let options = params.options()?;
  let record =
    resolve_person(&*state.dir, &PersonId::from(id), &options).await?;
  Ok(Json(record))
}

/// `GET /persons/{id}/display-name`
pub async fn get_display_name<D>(
  State(state): State<AppState<D>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  D: Directory + 'static,
{
  let id = PersonId::from(id);
  let name = display_name(&*state.dir, &id).await?;
  Ok(Json(json!({ "id": id, "name": name })))
}

/// `GET /me[?manager-levels=N][&gaps=degrade]`
pub async fn me<D>(
  State(state): State<AppState<D>>,
  Query(params): Query<ResolveParams>,
) -> Result<Json<PersonRecord>, ApiError>
where
  D: Directory + 'static,
{
  let id = state
    .user_source
    .current_user_id()
    .ok_or_else(|| ApiError::NotFound("no current user id available".into()))?;
  let options = params.options()?;
  let record = resolve_person(&*state.dir, &id, &options).await?;
  Ok(Json(record))
}
