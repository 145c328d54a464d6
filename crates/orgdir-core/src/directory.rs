//! The `Directory` trait — the read-only contract against the remote
//! organisation service.
//!
//! The trait is implemented by transport backends (e.g. `orgdir-client`).
//! Higher layers (the resolver, the federator, `orgdir-api`, `orgdir-cli`)
//! depend on this abstraction, not on any concrete backend.
//!
//! "Not found" is a valid, complete result (`None` / empty collections) and
//! must never be conflated with an error; errors use the taxonomy in
//! [`crate::error::Error`], which is part of this contract.

use std::{collections::BTreeMap, future::Future};

use serde_json::Value;

use crate::{
  Result,
  path::OrganisationPath,
  person::{
    FunctionAttributes, FunctionId, ManagerLink, PersonAttributes, PersonId,
  },
  search::{EntityType, SearchHit},
};

/// Abstraction over a remote organisation-directory backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes (e.g. tokio with `axum`). Implementations
/// must be safe for concurrent use by simultaneous requests.
pub trait Directory: Send + Sync {
  /// Fetch basic attributes for a person. `None` when the backend has no
  /// record for `id`.
  fn get_person<'a>(
    &'a self,
    id: &'a PersonId,
  ) -> impl Future<Output = Result<Option<PersonAttributes>>> + Send + 'a;

  /// Fetch the employment functions for a person, in backend discovery
  /// order, unique by function id. With `manager_scope`, restricts to the
  /// functions reachable as a manager — used when assembling manager
  /// sub-trees.
  fn get_functions<'a>(
    &'a self,
    person_id: &'a PersonId,
    manager_scope: bool,
  ) -> impl Future<Output = Result<Vec<FunctionAttributes>>> + Send + 'a;

  /// Fetch the ancestor chain of organisational units for a function,
  /// immediate unit first, root last. Empty when the backend knows no path.
  fn get_organisation_path<'a>(
    &'a self,
    function_id: &'a FunctionId,
  ) -> impl Future<Output = Result<OrganisationPath>> + Send + 'a;

  /// Fetch the manager links for a person, in backend order. The order is
  /// arbitrary; callers that need a single manager take the first link
  /// carrying a person id.
  fn get_manager_links<'a>(
    &'a self,
    person_id: &'a PersonId,
  ) -> impl Future<Output = Result<Vec<ManagerLink>>> + Send + 'a;

  /// Free-text / filtered search against one entity type.
  fn search<'a>(
    &'a self,
    entity: EntityType,
    filters: &'a BTreeMap<String, Value>,
  ) -> impl Future<Output = Result<Vec<SearchHit>>> + Send + 'a;
}
