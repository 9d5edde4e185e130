//! Cancellation causes.

use thiserror::Error;

/// Why a context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelCause {
  /// The cancel trigger was pulled explicitly.
  #[error("context cancelled")]
  Cancelled,

  /// The context's deadline elapsed.
  #[error("deadline exceeded")]
  DeadlineExceeded,
}
