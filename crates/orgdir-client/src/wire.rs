//! Wire shapes of the organisation service's REST surface.
//!
//! The backend is loose about which fields appear; every payload field
//! defaults to empty on absence. Collections arrive wrapped in a
//! hydra-style envelope. All decoding into domain types happens here, once,
//! at the client boundary — the resolver and federator never see raw JSON.

use orgdir_core::{
  path::{OrgUnit, OrganisationPath},
  person::{
    FunctionAttributes, FunctionId, ManagerLink, PersonAttributes, PersonId,
  },
  search::{EntityType, SearchHit},
};
use serde::Deserialize;
use serde_json::Value;

// ─── Envelope ────────────────────────────────────────────────────────────────

/// Hydra-style collection envelope: `{"hydra:member": [...]}`.
/// A missing member list decodes as empty.
#[derive(Debug, Deserialize)]
pub struct Collection<T> {
  #[serde(rename = "hydra:member", default = "Vec::new")]
  pub member: Vec<T>,
}

// ─── Bruger ──────────────────────────────────────────────────────────────────

/// `GET bruger/{id}` payload.
#[derive(Debug, Default, Deserialize)]
pub struct BrugerPayload {
  #[serde(default)]
  pub id:      String,
  #[serde(default)]
  pub navn:    String,
  #[serde(default)]
  pub az:      String,
  #[serde(default)]
  pub email:   String,
  #[serde(default)]
  pub telefon: String,
  #[serde(default)]
  pub lokation: String,
}

impl BrugerPayload {
  /// Convert to domain attributes. `requested_id` backs the id when the
  /// payload omits it.
  pub fn into_attributes(self, requested_id: &PersonId) -> PersonAttributes {
    let id = if self.id.is_empty() {
      requested_id.clone()
    } else {
      PersonId(self.id)
    };
    PersonAttributes {
      id,
      name:     self.navn,
      az_ident: self.az,
      email:    self.email,
      phone:    self.telefon,
      location: self.lokation,
    }
  }
}

// ─── Funktion ────────────────────────────────────────────────────────────────

/// One member of `GET bruger/{id}/funktioner` (and `/leder-funktioner`).
#[derive(Debug, Default, Deserialize)]
pub struct FunktionPayload {
  #[serde(default)]
  pub id:           String,
  #[serde(default)]
  pub funktionsnavn: String,
  #[serde(default)]
  pub enhedsnavn:   String,
  #[serde(default)]
  pub adresse:      String,
}

impl From<FunktionPayload> for FunctionAttributes {
  fn from(p: FunktionPayload) -> Self {
    FunctionAttributes {
      id:            FunctionId(p.id),
      function_name: p.funktionsnavn,
      unit_name:     p.enhedsnavn,
      unit_address:  p.adresse,
    }
  }
}

// ─── Organisation path ───────────────────────────────────────────────────────

/// One member of `GET funktion/{id}/organisation-path`.
#[derive(Debug, Default, Deserialize)]
pub struct PathEntryPayload {
  #[serde(default)]
  pub enhedsnavn: String,
}

pub fn path_from_members(members: Vec<PathEntryPayload>) -> OrganisationPath {
  members
    .into_iter()
    .map(|p| OrgUnit { name: p.enhedsnavn })
    .collect()
}

// ─── Leder ───────────────────────────────────────────────────────────────────

/// One member of `GET bruger/{id}/leder`. The backend emits either a bare
/// bruger id string or an object carrying bruger and funktion ids; both
/// shapes must decode.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LederPayload {
  Id(String),
  Link {
    #[serde(default, rename = "brugerId")]
    bruger_id:   Option<String>,
    #[serde(default, rename = "funktionsId")]
    funktions_id: Option<String>,
  },
}

impl From<LederPayload> for ManagerLink {
  fn from(p: LederPayload) -> Self {
    match p {
      LederPayload::Id(id) => ManagerLink {
        person_id:   Some(PersonId(id)),
        function_id: None,
      },
      LederPayload::Link { bruger_id, funktions_id } => ManagerLink {
        person_id:   bruger_id.map(PersonId),
        function_id: funktions_id.map(FunctionId),
      },
    }
  }
}

// ─── Search hits ─────────────────────────────────────────────────────────────

/// Convert one raw search member into a [`SearchHit`]. Members that are not
/// objects, or that lack a non-empty string `id`, cannot be keyed into the
/// merged result set and yield `None`.
pub fn hit_from_member(entity: EntityType, member: Value) -> Option<SearchHit> {
  let Value::Object(properties) = member else {
    return None;
  };
  let id = match properties.get("id") {
    Some(Value::String(id)) if !id.is_empty() => id.clone(),
    _ => return None,
  };
  Some(SearchHit { entity, id, properties })
}
