//! Deadline- and cancellation-aware context for lookout tasks.
//!
//! A [`TaskContext`] carries a cancel signal, an optional deadline, and
//! ordered key-value annotations through a call chain. Cancellation is
//! cooperative: a task is only interrupted if it observes the context
//! itself.

mod context;
mod error;

pub use context::TaskContext;
pub use error::CancelCause;
