//! Pluggable source of the logged-in user's backend person id.
//!
//! The hosting environment (a form framework, an SSO integration) knows who
//! is logged in; the core does not. Embedders install a strategy at
//! construction time. An absent id is "no id available", never an error.

use crate::person::PersonId;

pub trait CurrentUserIdSource: Send + Sync {
  fn current_user_id(&self) -> Option<PersonId>;
}

/// Default source: no hosting environment, no current user.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCurrentUser;

impl CurrentUserIdSource for NoCurrentUser {
  fn current_user_id(&self) -> Option<PersonId> { None }
}

/// A source that always yields the same id. Useful for tests and for
/// embedders whose session layer resolves the id up front.
#[derive(Debug, Clone)]
pub struct FixedUser(pub PersonId);

impl CurrentUserIdSource for FixedUser {
  fn current_user_id(&self) -> Option<PersonId> { Some(self.0.clone()) }
}
