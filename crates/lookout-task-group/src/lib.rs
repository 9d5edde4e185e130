//! Named-task groups and launch policies.
//!
//! A [`TaskGroup`] collects named tasks in order and launches them all
//! concurrently under one group-wide timeout, either fire-and-forget
//! ([`TaskGroup::spawn`]) or waiting with fail-fast aggregation
//! ([`TaskGroup::join`]).

mod group;

pub use group::{TaskFuture, TaskGroup};
pub use lookout_task_executor::TaskError;
