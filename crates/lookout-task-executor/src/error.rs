//! Supervised task errors.

use lookout_context::CancelCause;
use thiserror::Error;

/// Errors reported for a supervised task.
#[derive(Debug, Error)]
pub enum TaskError {
  /// The error the task itself returned, surfaced verbatim.
  #[error(transparent)]
  Failed(#[from] anyhow::Error),

  /// The task panicked; the payload is captured in `message`.
  #[error("panic occurred in task: {message}")]
  Panicked { message: String },

  /// The task's context was cancelled or its deadline elapsed.
  #[error(transparent)]
  Cancelled(#[from] CancelCause),
}

impl TaskError {
  /// True for panic-derived errors.
  pub fn is_panic(&self) -> bool {
    matches!(self, TaskError::Panicked { .. })
  }

  /// True when the context was cancelled or timed out.
  pub fn is_cancelled(&self) -> bool {
    matches!(self, TaskError::Cancelled(_))
  }

  /// True specifically for deadline expiry.
  pub fn is_deadline(&self) -> bool {
    matches!(self, TaskError::Cancelled(CancelCause::DeadlineExceeded))
  }
}
