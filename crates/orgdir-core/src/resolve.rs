//! The person resolver — assembles the full nested record for a person:
//! basic attributes, employment functions with their organisational
//! placement, and the manager chain up to a configured depth.
//!
//! The manager chain is walked iteratively, one `(current id, level)` step
//! at a time: each level depends on the manager id produced by the previous
//! one, so the walk is inherently sequential. A visited-id set guards
//! against self-referencing and circular manager links.

use std::collections::HashSet;

use crate::{
  Error, Result,
  directory::Directory,
  person::{FunctionRecord, PersonId, PersonRecord},
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// What to do when a sub-fetch fails inside a multi-call assembly while its
/// siblings succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
  /// Abort the whole resolution (legacy behaviour). The failure surfaces as
  /// [`Error::AssemblyGap`] so callers can tell it from a total failure.
  #[default]
  Fail,
  /// Keep what resolved, drop the failed piece, and log a warning.
  Degrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
  /// How many manager levels to resolve above the requested person.
  /// The `managers` list is empty at the deepest allowed level even if a
  /// manager exists upstream.
  pub max_manager_levels: u32,
  pub gap_policy:         GapPolicy,
}

impl Default for ResolveOptions {
  fn default() -> Self {
    ResolveOptions { max_manager_levels: 1, gap_policy: GapPolicy::Fail }
  }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Resolve the full nested record for `id`.
///
/// An unknown person yields a record with empty attributes rather than an
/// error (permissive legacy behaviour, kept deliberately); transport errors
/// propagate and the request produces no partial output. A manager link
/// pointing at an already-visited id is treated as "no manager".
pub async fn resolve_person<D: Directory>(
  dir:  &D,
  id:   &PersonId,
  opts: &ResolveOptions,
) -> Result<PersonRecord> {
  let mut chain: Vec<PersonRecord> = Vec::new();
  let mut visited: HashSet<PersonId> = HashSet::new();
  let mut current = id.clone();
  let mut level = 0u32;

  loop {
    visited.insert(current.clone());

    let record = match assemble(dir, &current, level > 0, opts).await {
      Ok(record) => record,
      Err(e) if level == 0 => return Err(e),
      Err(e) => match opts.gap_policy {
        GapPolicy::Fail => {
          return Err(Error::gap(format!("manager sub-tree for {current}"), e));
        }
        GapPolicy::Degrade => {
          tracing::warn!(person = %current, error = %e, "dropping manager sub-tree");
          break;
        }
      },
    };
    chain.push(record);

    if level >= opts.max_manager_levels {
      break;
    }

    let links = match dir.get_manager_links(&current).await {
      Ok(links) => links,
      Err(e) => match opts.gap_policy {
        GapPolicy::Fail => {
          return Err(Error::gap(format!("manager links for {current}"), e));
        }
        GapPolicy::Degrade => {
          tracing::warn!(person = %current, error = %e, "dropping manager links");
          Vec::new()
        }
      },
    };

    // First link carrying a person id wins; the backend's ordering of
    // multiple links is arbitrary.
    match links.iter().find_map(|l| l.manager_person_id()) {
      Some(next) if !visited.contains(next) => {
        current = next.clone();
        level += 1;
      }
      Some(next) => {
        tracing::debug!(person = %current, manager = %next, "circular manager link, stopping");
        break;
      }
      None => break,
    }
  }

  // Nest the chain deepest-first; all-empty manager records are dropped
  // rather than attached as stubs.
  let mut nested: Option<PersonRecord> = None;
  for mut record in chain.into_iter().rev() {
    if let Some(manager) = nested.take() {
      if !manager.is_trivial() {
        record.managers.push(manager);
      }
    }
    nested = Some(record);
  }

  Ok(nested.unwrap_or_else(|| PersonRecord::empty(id.clone())))
}

/// Convenience lookup of a person's display name. Empty when the backend
/// has no record (or no name) for `id`.
pub async fn display_name<D: Directory>(dir: &D, id: &PersonId) -> Result<String> {
  Ok(dir.get_person(id).await?.map(|a| a.name).unwrap_or_default())
}

// ─── Assembly of one level ───────────────────────────────────────────────────

/// Assemble the record for a single person: attributes, functions, and
/// per-function organisation-path enrichment. Manager levels are the
/// caller's concern.
async fn assemble<D: Directory>(
  dir:           &D,
  id:            &PersonId,
  manager_scope: bool,
  opts:          &ResolveOptions,
) -> Result<PersonRecord> {
  let mut record = match dir.get_person(id).await? {
    Some(attrs) => PersonRecord::from_attributes(attrs),
    None => PersonRecord::empty(id.clone()),
  };
  if record.id.is_empty() {
    record.id = id.clone();
  }

  let functions = match dir.get_functions(id, manager_scope).await {
    Ok(functions) => functions,
    Err(e) => match opts.gap_policy {
      GapPolicy::Fail => {
        return Err(Error::gap(format!("funktioner for {id}"), e));
      }
      GapPolicy::Degrade => {
        tracing::warn!(person = %id, error = %e, "dropping funktion list");
        Vec::new()
      }
    },
  };

  for attrs in functions {
    let path = match dir.get_organisation_path(&attrs.id).await {
      Ok(path) => path,
      Err(e) => match opts.gap_policy {
        GapPolicy::Fail => {
          return Err(Error::gap(
            format!("organisation path for funktion {}", attrs.id),
            e,
          ));
        }
        GapPolicy::Degrade => {
          tracing::warn!(funktion = %attrs.id, error = %e, "funktion kept without organisation path");
          Default::default()
        }
      },
    };
    record.push_function(FunctionRecord::from_parts(attrs, &path));
  }

  Ok(record)
}
