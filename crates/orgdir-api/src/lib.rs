//! JSON API for the orgdir organisation directory.
//!
//! Exposes an axum [`Router`] backed by any
//! [`orgdir_core::directory::Directory`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", orgdir_api::api_router(state))
//! ```

pub mod error;
pub mod persons;
pub mod search;

use std::sync::Arc;

use axum::{Router, routing::get};
use orgdir_core::{current_user::CurrentUserIdSource, directory::Directory};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<D> {
  pub dir:         Arc<D>,
  /// Supplies the backend person id for "logged in user" flows. May yield
  /// nothing — that is "no id available", not an error.
  pub user_source: Arc<dyn CurrentUserIdSource>,
}

impl<D> Clone for AppState<D> {
  fn clone(&self) -> Self {
    AppState {
      dir:         self.dir.clone(),
      user_source: self.user_source.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<D>(state: AppState<D>) -> Router<()>
where
  D: Directory + 'static,
{
  Router::new()
    .route("/search", get(search::handler::<D>))
    .route("/persons/{id}", get(persons::get_one::<D>))
    .route("/persons/{id}/display-name", get(persons::get_display_name::<D>))
    .route("/me", get(persons::me::<D>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
