//! Error types for `plaint-core`.

use thiserror::Error;

use crate::{classify::ClassifyError, complaint::ComplaintId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("complaint text must not be empty")]
  EmptyText,

  #[error("complaint not found: {0}")]
  ComplaintNotFound(ComplaintId),

  #[error(transparent)]
  Classification(#[from] ClassifyError),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
