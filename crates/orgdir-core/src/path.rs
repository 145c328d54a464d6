//! Organisation paths and the names derived from them.
//!
//! A path is the ordered ancestor chain of organisational units for one
//! employment function: the function's immediate unit at index 0, the
//! top-level authority (the "Kommune"-equivalent root) last.

use serde::{Deserialize, Serialize};

/// One organisational unit in an ancestor chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnit {
  pub name: String,
}

impl OrgUnit {
  pub fn named(name: impl Into<String>) -> Self {
    OrgUnit { name: name.into() }
  }
}

/// Ordered ancestor chain, immediate unit first, root last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganisationPath {
  units: Vec<OrgUnit>,
}

impl OrganisationPath {
  pub fn new(units: Vec<OrgUnit>) -> Self { OrganisationPath { units } }

  pub fn units(&self) -> &[OrgUnit] { &self.units }

  pub fn len(&self) -> usize { self.units.len() }

  pub fn is_empty(&self) -> bool { self.units.is_empty() }

  /// Name of the unit at level two (the second path entry), or `""` when
  /// the path has fewer than two entries.
  pub fn level_two_name(&self) -> &str {
    self.units.get(1).map(|u| u.name.as_str()).unwrap_or("")
  }

  /// Name of the "magistrat" — the unit directly beneath the top-level
  /// authority, i.e. the second-from-last entry. The last entry is the
  /// root itself and is skipped. `""` when the path has fewer than three
  /// entries.
  pub fn magistrat_name(&self) -> &str {
    if self.units.len() < 3 {
      return "";
    }
    self.units[self.units.len() - 2].name.as_str()
  }
}

impl FromIterator<OrgUnit> for OrganisationPath {
  fn from_iter<I: IntoIterator<Item = OrgUnit>>(iter: I) -> Self {
    OrganisationPath { units: iter.into_iter().collect() }
  }
}
