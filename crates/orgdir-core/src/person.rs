//! Person and employment-function value objects.
//!
//! `PersonAttributes` and `FunctionAttributes` are the raw per-entity shapes
//! a [`Directory`](crate::directory::Directory) backend returns;
//! `PersonRecord` and `FunctionRecord` are the assembled, enriched records
//! produced by the resolver. Records are constructed fresh per resolution —
//! no shared mutable state survives between calls.

use serde::{Deserialize, Serialize};

use crate::path::OrganisationPath;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Opaque person identifier issued by the backend directory.
/// Stable and case-sensitive; no structure may be assumed.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<&str> for PersonId {
  fn from(s: &str) -> Self { PersonId(s.to_owned()) }
}

impl From<String> for PersonId {
  fn from(s: String) -> Self { PersonId(s) }
}

impl std::fmt::Display for PersonId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// Opaque identifier of one employment function ("funktion"). A person may
/// hold several concurrently.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FunctionId(pub String);

impl FunctionId {
  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<&str> for FunctionId {
  fn from(s: &str) -> Self { FunctionId(s.to_owned()) }
}

impl From<String> for FunctionId {
  fn from(s: String) -> Self { FunctionId(s) }
}

impl std::fmt::Display for FunctionId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Raw backend attributes ──────────────────────────────────────────────────

/// Basic person attributes as returned by the backend. Missing fields decode
/// to empty strings — the backend is loose about which attributes exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonAttributes {
  pub id:       PersonId,
  pub name:     String,
  /// Internal handle ("az-ident").
  pub az_ident: String,
  pub email:    String,
  pub phone:    String,
  pub location: String,
}

/// One employment function as returned by the backend, before org-path
/// enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionAttributes {
  pub id:            FunctionId,
  pub function_name: String,
  pub unit_name:     String,
  pub unit_address:  String,
}

// ─── Manager link ────────────────────────────────────────────────────────────

/// A directional relationship identifying a person's manager, expressed by
/// the backend via a dedicated function type. Either side may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerLink {
  pub person_id:   Option<PersonId>,
  pub function_id: Option<FunctionId>,
}

impl ManagerLink {
  /// The linked manager's person id, if the link actually carries one.
  pub fn manager_person_id(&self) -> Option<&PersonId> {
    self.person_id.as_ref().filter(|id| !id.is_empty())
  }
}

// ─── Assembled records ───────────────────────────────────────────────────────

/// An employment function enriched with its place in the organisational
/// hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
  pub id:                  FunctionId,
  pub function_name:       String,
  pub unit_name:           String,
  pub unit_address:        String,
  /// Name of the unit at level two of the organisation path; empty when the
  /// path is too short to carry one.
  pub unit_level_two_name: String,
  /// Name of the unit directly beneath the top-level authority; empty when
  /// the path is too short to carry one.
  pub magistrat_name:      String,
}

impl FunctionRecord {
  /// Enrich raw function attributes with the derived organisation-path
  /// names.
  pub fn from_parts(attrs: FunctionAttributes, path: &OrganisationPath) -> Self {
    FunctionRecord {
      id:                  attrs.id,
      function_name:       attrs.function_name,
      unit_name:           attrs.unit_name,
      unit_address:        attrs.unit_address,
      unit_level_two_name: path.level_two_name().to_owned(),
      magistrat_name:      path.magistrat_name().to_owned(),
    }
  }
}

/// The fully assembled, nested record for one person.
///
/// `functions` preserves backend discovery order and is unique by function
/// id. `managers` holds the resolved manager chain: at most one entry per
/// level, and empty at the deepest allowed level even if a manager exists
/// upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
  pub id:        PersonId,
  pub name:      String,
  pub az_ident:  String,
  pub email:     String,
  pub phone:     String,
  pub location:  String,
  pub functions: Vec<FunctionRecord>,
  pub managers:  Vec<PersonRecord>,
}

impl PersonRecord {
  /// A record carrying nothing but the id — what resolution yields for an
  /// unknown person.
  pub fn empty(id: PersonId) -> Self {
    PersonRecord { id, ..PersonRecord::default() }
  }

  pub fn from_attributes(attrs: PersonAttributes) -> Self {
    PersonRecord {
      id:       attrs.id,
      name:     attrs.name,
      az_ident: attrs.az_ident,
      email:    attrs.email,
      phone:    attrs.phone,
      location: attrs.location,
      functions: Vec::new(),
      managers:  Vec::new(),
    }
  }

  /// Look up a function by id, preserving the mapping semantics of the
  /// ordered `functions` list.
  pub fn function(&self, id: &FunctionId) -> Option<&FunctionRecord> {
    self.functions.iter().find(|f| &f.id == id)
  }

  /// Append a function unless one with the same id is already present.
  pub fn push_function(&mut self, function: FunctionRecord) {
    if self.function(&function.id).is_none() {
      self.functions.push(function);
    }
  }

  /// True when resolution produced no data at all (only the id is set).
  /// Trivial records are dropped rather than attached as manager stubs.
  pub fn is_trivial(&self) -> bool {
    self.name.is_empty()
      && self.az_ident.is_empty()
      && self.email.is_empty()
      && self.phone.is_empty()
      && self.location.is_empty()
      && self.functions.is_empty()
      && self.managers.is_empty()
  }
}
