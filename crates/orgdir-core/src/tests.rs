//! Integration tests for the resolver and the search federator against an
//! in-memory mock backend.

use std::{
  collections::{BTreeMap, HashMap, HashSet},
  sync::Mutex,
};

use serde_json::Value;

use crate::{
  Error, Result,
  directory::Directory,
  path::{OrgUnit, OrganisationPath},
  person::{
    FunctionAttributes, FunctionId, ManagerLink, PersonAttributes, PersonId,
  },
  resolve::{GapPolicy, ResolveOptions, display_name, resolve_person},
  search::{
    EntityType, FILTER_BRUGERNAVN, FILTER_NAVNTEKST,
    FILTER_TILKNYTTEDEPERSONER, SearchHit, SearchQuery, federate,
  },
};

// ─── Mock backend ────────────────────────────────────────────────────────────

#[derive(Default)]
struct MockDirectory {
  persons:    HashMap<PersonId, PersonAttributes>,
  functions:  HashMap<(PersonId, bool), Vec<FunctionAttributes>>,
  paths:      HashMap<FunctionId, OrganisationPath>,
  managers:   HashMap<PersonId, Vec<ManagerLink>>,
  searches:   Vec<(EntityType, BTreeMap<String, Value>, Vec<SearchHit>)>,
  fail_paths: HashSet<FunctionId>,
  fail_search: Option<EntityType>,
  /// One entry per backend call, for asserting call patterns.
  calls:      Mutex<Vec<String>>,
}

impl MockDirectory {
  fn new() -> Self { MockDirectory::default() }

  fn person(mut self, id: &str, name: &str) -> Self {
    self.persons.insert(
      PersonId::from(id),
      PersonAttributes {
        id:       PersonId::from(id),
        name:     name.to_owned(),
        az_ident: format!("az-{id}"),
        email:    format!("{id}@example.dk"),
        phone:    String::new(),
        location: String::new(),
      },
    );
    self
  }

  fn function(mut self, person: &str, manager_scope: bool, id: &str, unit: &str) -> Self {
    self
      .functions
      .entry((PersonId::from(person), manager_scope))
      .or_default()
      .push(FunctionAttributes {
        id:            FunctionId::from(id),
        function_name: format!("fn-{id}"),
        unit_name:     unit.to_owned(),
        unit_address:  String::new(),
      });
    self
  }

  fn path(mut self, function: &str, names: &[&str]) -> Self {
    self.paths.insert(
      FunctionId::from(function),
      names.iter().copied().map(OrgUnit::named).collect(),
    );
    self
  }

  fn manager(mut self, person: &str, manager: &str) -> Self {
    self.managers.entry(PersonId::from(person)).or_default().push(
      ManagerLink {
        person_id:   Some(PersonId::from(manager)),
        function_id: None,
      },
    );
    self
  }

  fn manager_link(mut self, person: &str, link: ManagerLink) -> Self {
    self.managers.entry(PersonId::from(person)).or_default().push(link);
    self
  }

  fn search_response(
    mut self,
    entity: EntityType,
    filters: &[(&str, &str)],
    hits: Vec<SearchHit>,
  ) -> Self {
    let filters = filters
      .iter()
      .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
      .collect();
    self.searches.push((entity, filters, hits));
    self
  }

  fn fail_path(mut self, function: &str) -> Self {
    self.fail_paths.insert(FunctionId::from(function));
    self
  }

  fn fail_search(mut self, entity: EntityType) -> Self {
    self.fail_search = Some(entity);
    self
  }

  fn log(&self, entry: String) {
    self.calls.lock().unwrap().push(entry);
  }

  fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }
}

impl Directory for MockDirectory {
  async fn get_person(&self, id: &PersonId) -> Result<Option<PersonAttributes>> {
    self.log(format!("person {id}"));
    Ok(self.persons.get(id).cloned())
  }

  async fn get_functions(
    &self,
    person_id: &PersonId,
    manager_scope: bool,
  ) -> Result<Vec<FunctionAttributes>> {
    self.log(format!("functions {person_id} manager={manager_scope}"));
    Ok(
      self
        .functions
        .get(&(person_id.clone(), manager_scope))
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn get_organisation_path(
    &self,
    function_id: &FunctionId,
  ) -> Result<OrganisationPath> {
    self.log(format!("path {function_id}"));
    if self.fail_paths.contains(function_id) {
      return Err(Error::unavailable("connection reset"));
    }
    Ok(self.paths.get(function_id).cloned().unwrap_or_default())
  }

  async fn get_manager_links(&self, person_id: &PersonId) -> Result<Vec<ManagerLink>> {
    self.log(format!("managers {person_id}"));
    Ok(self.managers.get(person_id).cloned().unwrap_or_default())
  }

  async fn search(
    &self,
    entity: EntityType,
    filters: &BTreeMap<String, Value>,
  ) -> Result<Vec<SearchHit>> {
    self.log(format!("search {entity} {}", serde_json::to_string(filters).unwrap()));
    if self.fail_search == Some(entity) {
      return Err(Error::unavailable("connection reset"));
    }
    Ok(
      self
        .searches
        .iter()
        .find(|(e, f, _)| *e == entity && f == filters)
        .map(|(_, _, hits)| hits.clone())
        .unwrap_or_default(),
    )
  }
}

fn hit(entity: EntityType, id: &str, props: &[(&str, &str)]) -> SearchHit {
  let properties = props
    .iter()
    .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
    .collect();
  SearchHit { entity, id: id.to_owned(), properties }
}

fn opts(max_manager_levels: u32) -> ResolveOptions {
  ResolveOptions { max_manager_levels, ..ResolveOptions::default() }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn person_with_zero_functions_resolves_to_empty_function_list() {
  let dir = MockDirectory::new().person("u1", "Alice");
  let record = resolve_person(&dir, &PersonId::from("u1"), &opts(1))
    .await
    .unwrap();
  assert_eq!(record.name, "Alice");
  assert!(record.functions.is_empty());
  assert!(record.managers.is_empty());
}

#[tokio::test]
async fn unknown_person_resolves_to_empty_record_not_error() {
  let dir = MockDirectory::new();
  let record = resolve_person(&dir, &PersonId::from("ghost"), &opts(1))
    .await
    .unwrap();
  assert_eq!(record.id, PersonId::from("ghost"));
  assert!(record.is_trivial());
}

#[tokio::test]
async fn nested_record_with_depth_exhaustion() {
  // u1 -> u2 -> u3; with one manager level only u2 is fetched and u2's own
  // managers list stays empty.
  let dir = MockDirectory::new()
    .person("u1", "Alice")
    .person("u2", "Bob")
    .person("u3", "Carol")
    .function("u1", false, "f1", "Dept A")
    .path("f1", &["Dept A", "Division X", "City"])
    .manager("u1", "u2")
    .manager("u2", "u3");

  let record = resolve_person(&dir, &PersonId::from("u1"), &opts(1))
    .await
    .unwrap();

  let f1 = record.function(&FunctionId::from("f1")).unwrap();
  assert_eq!(f1.unit_level_two_name, "Division X");
  // Path length 3: the second-from-last entry is also index 1.
  assert_eq!(f1.magistrat_name, "Division X");

  assert_eq!(record.managers.len(), 1);
  assert_eq!(record.managers[0].id, PersonId::from("u2"));
  assert_eq!(record.managers[0].name, "Bob");
  assert!(record.managers[0].managers.is_empty(), "depth exhausted");

  let calls = dir.calls();
  assert!(!calls.contains(&"person u3".to_string()), "u3 must not be fetched");
  // Manager levels fetch manager-scoped functions.
  assert!(calls.contains(&"functions u2 manager=true".to_string()));
}

#[tokio::test]
async fn manager_walk_never_exceeds_max_level() {
  let mut dir = MockDirectory::new();
  for i in 0..10 {
    dir = dir
      .person(&format!("u{i}"), &format!("P{i}"))
      .manager(&format!("u{i}"), &format!("u{}", i + 1));
  }
  let record = resolve_person(&dir, &PersonId::from("u0"), &opts(3))
    .await
    .unwrap();

  let mut depth = 0;
  let mut cursor = &record;
  while let Some(next) = cursor.managers.first() {
    cursor = next;
    depth += 1;
  }
  assert_eq!(depth, 3);
  assert_eq!(
    dir.calls().iter().filter(|c| c.starts_with("person ")).count(),
    4
  );
}

#[tokio::test]
async fn self_referencing_manager_link_is_not_followed() {
  let dir = MockDirectory::new().person("u1", "Alice").manager("u1", "u1");
  let record = resolve_person(&dir, &PersonId::from("u1"), &opts(5))
    .await
    .unwrap();
  assert!(record.managers.is_empty());
  assert_eq!(
    dir.calls().iter().filter(|c| *c == "person u1").count(),
    1
  );
}

#[tokio::test]
async fn circular_manager_chain_terminates() {
  let dir = MockDirectory::new()
    .person("u1", "Alice")
    .person("u2", "Bob")
    .manager("u1", "u2")
    .manager("u2", "u1");
  let record = resolve_person(&dir, &PersonId::from("u1"), &opts(5))
    .await
    .unwrap();
  assert_eq!(record.managers.len(), 1);
  assert!(record.managers[0].managers.is_empty());
}

#[tokio::test]
async fn trivial_manager_record_is_dropped() {
  // u2 exists only as a link target; resolving it yields no data, so it is
  // not attached as an empty stub.
  let dir = MockDirectory::new().person("u1", "Alice").manager("u1", "u2");
  let record = resolve_person(&dir, &PersonId::from("u1"), &opts(1))
    .await
    .unwrap();
  assert!(record.managers.is_empty());
}

#[tokio::test]
async fn manager_link_without_person_id_is_skipped() {
  let dir = MockDirectory::new()
    .person("u1", "Alice")
    .person("u2", "Bob")
    .manager_link("u1", ManagerLink {
      person_id:   None,
      function_id: Some(FunctionId::from("f9")),
    })
    .manager("u1", "u2");
  // The first link carries no person id; the second one wins.
  let record = resolve_person(&dir, &PersonId::from("u1"), &opts(1))
    .await
    .unwrap();
  assert_eq!(record.managers.len(), 1);
  assert_eq!(record.managers[0].id, PersonId::from("u2"));
}

#[tokio::test]
async fn org_path_failure_aborts_resolution_by_default() {
  let dir = MockDirectory::new()
    .person("u1", "Alice")
    .function("u1", false, "f1", "Dept A")
    .fail_path("f1");
  let err = resolve_person(&dir, &PersonId::from("u1"), &opts(1))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AssemblyGap { .. }), "got: {err}");
}

#[tokio::test]
async fn org_path_failure_degrades_when_configured() {
  let dir = MockDirectory::new()
    .person("u1", "Alice")
    .function("u1", false, "f1", "Dept A")
    .fail_path("f1");
  let options = ResolveOptions {
    max_manager_levels: 1,
    gap_policy:         GapPolicy::Degrade,
  };
  let record = resolve_person(&dir, &PersonId::from("u1"), &options)
    .await
    .unwrap();
  let f1 = record.function(&FunctionId::from("f1")).unwrap();
  assert_eq!(f1.unit_name, "Dept A");
  assert_eq!(f1.unit_level_two_name, "");
  assert_eq!(f1.magistrat_name, "");
}

#[tokio::test]
async fn display_name_is_empty_for_unknown_person() {
  let dir = MockDirectory::new().person("u1", "Alice");
  assert_eq!(display_name(&dir, &PersonId::from("u1")).await.unwrap(), "Alice");
  assert_eq!(display_name(&dir, &PersonId::from("u9")).await.unwrap(), "");
}

// ─── Federation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn person_query_fans_out_one_user_search_per_hit() {
  let dir = MockDirectory::new()
    .search_response(
      EntityType::Person,
      &[(FILTER_NAVNTEKST, "Anders And")],
      vec![
        hit(EntityType::Person, "p1", &[("navn", "Anders And")]),
        hit(EntityType::Person, "p2", &[("navn", "Anders Anden")]),
      ],
    )
    .search_response(
      EntityType::User,
      &[(FILTER_TILKNYTTEDEPERSONER, "p1")],
      vec![hit(EntityType::User, "b1", &[("brugernavn", "anan")])],
    )
    .search_response(
      EntityType::User,
      &[(FILTER_TILKNYTTEDEPERSONER, "p2")],
      vec![hit(EntityType::User, "b2", &[("brugernavn", "anan2")])],
    );

  let query = SearchQuery::unscoped().with(FILTER_NAVNTEKST, "Anders And");
  let result = federate(&dir, &query).await.unwrap();

  assert_eq!(result.len(), 4);
  for id in ["p1", "p2", "b1", "b2"] {
    assert!(result.get(id).is_some(), "missing {id}");
  }

  let user_searches: Vec<_> = dir
    .calls()
    .into_iter()
    .filter(|c| c.starts_with("search bruger"))
    .collect();
  assert_eq!(user_searches.len(), 2, "one follow-up per person hit");
}

#[tokio::test]
async fn duplicate_ids_across_sub_searches_keep_the_last_write() {
  let dir = MockDirectory::new()
    .search_response(
      EntityType::User,
      &[(FILTER_BRUGERNAVN, "anan")],
      vec![hit(EntityType::User, "42", &[("email", "a@x.dk")])],
    )
    .search_response(
      EntityType::Person,
      &[(FILTER_NAVNTEKST, "Anders")],
      vec![hit(EntityType::Person, "p1", &[])],
    )
    .search_response(
      EntityType::User,
      &[(FILTER_TILKNYTTEDEPERSONER, "p1")],
      vec![hit(EntityType::User, "42", &[("email", "b@x.dk")])],
    );

  let query = SearchQuery::unscoped()
    .with(FILTER_BRUGERNAVN, "anan")
    .with(FILTER_NAVNTEKST, "Anders");
  let result = federate(&dir, &query).await.unwrap();

  assert_eq!(result.len(), 2);
  assert_eq!(
    result.get("42").unwrap().properties["email"],
    Value::String("b@x.dk".into())
  );
}

#[tokio::test]
async fn scoped_person_search_returns_only_person_hits() {
  let dir = MockDirectory::new().search_response(
    EntityType::Person,
    &[(FILTER_NAVNTEKST, "Anders And")],
    vec![hit(EntityType::Person, "p1", &[("navn", "Anders And")])],
  );

  let mut query = SearchQuery::scoped(EntityType::Person);
  query = query.with(FILTER_NAVNTEKST, "Anders And");
  let result = federate(&dir, &query).await.unwrap();

  assert_eq!(result.len(), 1);
  assert!(result.iter().all(|h| h.entity == EntityType::Person));
  assert!(
    !dir.calls().iter().any(|c| c.starts_with("search bruger")),
    "scoped search must not fan out"
  );
}

#[tokio::test]
async fn sub_search_failure_aborts_the_whole_federated_call() {
  let dir = MockDirectory::new()
    .search_response(
      EntityType::User,
      &[(FILTER_BRUGERNAVN, "anan")],
      vec![hit(EntityType::User, "b1", &[])],
    )
    .fail_search(EntityType::Person);

  let query = SearchQuery::unscoped()
    .with(FILTER_BRUGERNAVN, "anan")
    .with(FILTER_NAVNTEKST, "Anders");
  let err = federate(&dir, &query).await.unwrap_err();
  assert!(matches!(err, Error::BackendUnavailable { .. }));
}

#[tokio::test]
async fn unscoped_address_keys_dispatch_an_address_search() {
  let dir = MockDirectory::new().search_response(
    EntityType::Address,
    &[("adressetekst", "Rådhuspladsen 2")],
    vec![hit(EntityType::Address, "a1", &[("adressetekst", "Rådhuspladsen 2")])],
  );
  let query =
    SearchQuery::unscoped().with("adressetekst", "Rådhuspladsen 2");
  let result = federate(&dir, &query).await.unwrap();
  assert_eq!(result.len(), 1);
  assert_eq!(result.get("a1").unwrap().entity, EntityType::Address);
}
