//! Error types for `joinfix-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown model: {0}")]
  UnknownModel(String),

  #[error("component {uid} is nested deeper than {max_depth} levels")]
  ComponentDepthExceeded { uid: String, max_depth: usize },

  #[error("schema error: {0}")]
  Schema(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error coming out of a [`RelationalStore`](crate::store::RelationalStore).
  pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
