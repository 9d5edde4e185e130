//! Supervised single-task execution.
//!
//! [`run`] supervises one task future under a context deadline and
//! converts panics into ordinary errors. [`execute`] layers task-name
//! annotation and lifecycle logging on top of it. [`spawn_task`] and
//! [`run_task`] are the single-task entry points for callers that do
//! not need a whole group.

mod error;
mod executor;
mod supervisor;

pub use error::TaskError;
pub use executor::{execute, run_task, spawn_task};
pub use supervisor::run;
