//! `orgdir` — command-line access to the organisation directory.
//!
//! # Usage
//!
//! ```
//! orgdir --endpoint https://org.example.dk/api lookup 1b4c3e1a-...
//! orgdir --config ~/.config/orgdir/config.toml read bruger 1b4c3e1a-... --manager-levels 2
//! orgdir search 'Anders And'
//! orgdir search --type person '{"navntekst": "Anders And"}'
//! ```
//!
//! Invalid arguments (unknown object type, malformed query JSON, non-UUID
//! ids) are reported before any backend call. Backend protocol errors print
//! the upstream status and response body.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use orgdir_client::HttpDirectory;
use orgdir_core::{
  person::PersonId,
  resolve::{GapPolicy, ResolveOptions, display_name, resolve_person},
  search::{EntityType, SearchQuery, federate},
  settings::Settings,
};
use serde::Deserialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "orgdir", about = "Command-line client for the organisation directory")]
struct Cli {
  /// Path to a TOML config file (endpoint, manager roles, cache settings).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the organisation service.
  #[arg(long, env = "ORGDIR_ENDPOINT")]
  endpoint: Option<String>,

  /// Use the backend's test instance (selects the test manager role).
  #[arg(long, env = "ORGDIR_TEST_MODE")]
  test_mode: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Look up the display name for a bruger id.
  Lookup {
    bruger_id: String,
  },

  /// Dump the full nested record for an object as YAML.
  Read {
    /// The object type to read (only `bruger` is supported).
    #[arg(value_name = "TYPE")]
    object_type: String,
    uuid: String,
    /// Levels of managers to resolve above the requested person.
    #[arg(long = "manager-levels", default_value_t = 1)]
    manager_levels: u32,
    /// Keep what resolves and drop failed pieces instead of aborting.
    #[arg(long)]
    degrade: bool,
  },

  /// Search the directory and dump the merged results as YAML.
  Search {
    /// Entity type (adresse, bruger, person). Omit for a federated search.
    #[arg(long = "type", value_name = "TYPE")]
    entity: Option<String>,
    /// A bare name, or a JSON object of filter keys.
    query: String,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  endpoint:             String,
  #[serde(default)]
  test_mode:            bool,
  #[serde(default)]
  manager_role_test:    String,
  #[serde(default)]
  manager_role_prod:    String,
  #[serde(default)]
  cache_expirations:    Vec<String>,
  #[serde(default)]
  request_timeout_secs: Option<u64>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Cli::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let mut settings = Settings::new(
    args
      .endpoint
      .or_else(|| (!file_cfg.endpoint.is_empty()).then(|| file_cfg.endpoint.clone()))
      .unwrap_or_default(),
  );
  settings.test_mode = args.test_mode || file_cfg.test_mode;
  settings.manager_role_test = file_cfg.manager_role_test;
  settings.manager_role_prod = file_cfg.manager_role_prod;
  settings.cache_expirations = file_cfg.cache_expirations;
  if let Some(timeout) = file_cfg.request_timeout_secs {
    settings.request_timeout_secs = timeout;
  }

  match args.command {
    Command::Lookup { bruger_id } => {
      let dir = HttpDirectory::new(settings)?;
      let name = display_name(&dir, &PersonId::from(bruger_id.clone())).await?;
      if name.is_empty() {
        println!("Could not find user with id: {bruger_id}");
      } else {
        println!("Name: {name}");
      }
    }

    Command::Read { object_type, uuid, manager_levels, degrade } => {
      // Argument validation happens before the client is even built.
      if object_type != "bruger" {
        bail!("Unknown type: {object_type}");
      }
      Uuid::parse_str(&uuid)
        .with_context(|| format!("invalid bruger uuid: {uuid}"))?;

      let options = ResolveOptions {
        max_manager_levels: manager_levels,
        gap_policy: if degrade { GapPolicy::Degrade } else { GapPolicy::Fail },
      };

      let dir = HttpDirectory::new(settings)?;
      let record = resolve_person(&dir, &PersonId::from(uuid), &options).await?;
      print!("{}", serde_yaml::to_string(&record)?);
    }

    Command::Search { entity, query } => {
      let query = parse_search_query(entity.as_deref(), &query)?;

      let dir = HttpDirectory::new(settings)?;
      let result = federate(&dir, &query).await?;

      let mut hits = result.into_hits();
      hits.sort_by(|a, b| a.id.cmp(&b.id));
      print!("{}", serde_yaml::to_string(&hits)?);
    }
  }

  Ok(())
}

// ─── Query parsing ────────────────────────────────────────────────────────────

/// Build a [`SearchQuery`] from the command line. A JSON object supplies the
/// full filter map; a bare string becomes a free-text search on the target
/// type's name filter (bruger when unscoped). Validation runs here, before
/// any backend call.
fn parse_search_query(
  entity: Option<&str>,
  raw: &str,
) -> Result<SearchQuery, orgdir_core::Error> {
  let entity = entity.map(EntityType::parse).transpose()?;
  let trimmed = raw.trim();

  let filters: BTreeMap<String, Value> = if trimmed.starts_with('{') {
    let map: serde_json::Map<String, Value> = serde_json::from_str(trimmed)
      .map_err(|e| {
        orgdir_core::Error::InvalidArgument(format!("malformed query JSON: {e}"))
      })?;
    map.into_iter().collect()
  } else {
    let key = entity.unwrap_or(EntityType::User).default_filter_key();
    BTreeMap::from([(key.to_owned(), Value::String(trimmed.to_owned()))])
  };

  let query = SearchQuery { entity, filters };
  query.validate()?;
  Ok(query)
}
