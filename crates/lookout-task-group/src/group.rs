//! Task group builder and orchestration policies.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use lookout_context::TaskContext;
use lookout_log::TaskLogger;
use lookout_task_executor::{TaskError, execute};
use tokio::task::JoinSet;

/// Boxed future a named task resolves to.
pub type TaskFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

type TaskFn = Box<dyn FnOnce(TaskContext) -> TaskFuture + Send>;

struct NamedTask {
  name: String,
  task: TaskFn,
}

/// An ordered collection of named tasks launched together under one
/// group-wide timeout.
///
/// Built incrementally with [`TaskGroup::add`] and consumed by exactly
/// one launch call. Tasks start in the order they were added; nothing
/// is guaranteed about completion order or log interleaving. Duplicate
/// names are legal and logged independently.
#[derive(Default)]
pub struct TaskGroup {
  tasks: Vec<NamedTask>,
}

impl TaskGroup {
  /// Create an empty group.
  pub fn new() -> Self {
    Self { tasks: Vec::new() }
  }

  /// Append a named task, returning the group for chaining.
  pub fn add<F, Fut>(mut self, name: impl Into<String>, task: F) -> Self
  where
    F: FnOnce(TaskContext) -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
  {
    self.tasks.push(NamedTask {
      name: name.into(),
      task: Box::new(move |ctx| Box::pin(task(ctx))),
    });
    self
  }

  /// Number of tasks added so far.
  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  /// Whether the group has no tasks.
  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  /// Fire-and-forget launch.
  ///
  /// Starts every task concurrently under a group context bound to
  /// `timeout` and returns immediately without waiting. Outcomes are
  /// visible only through `logger`.
  pub fn spawn(self, ctx: &TaskContext, timeout: Duration, logger: Arc<dyn TaskLogger>) {
    let group_ctx = ctx.child_with_timeout(timeout);
    let guard = group_ctx.drop_guard();

    let mut set = JoinSet::new();
    for NamedTask { name, task } in self.tasks {
      let task_ctx = group_ctx.clone();
      let logger = Arc::clone(&logger);
      set.spawn(async move {
        let _ = execute(&task_ctx, task, &name, logger.as_ref()).await;
      });
    }

    // Hold the guard until the last task exits so the group context is
    // released exactly then.
    tokio::spawn(async move {
      let _guard = guard;
      while set.join_next().await.is_some() {}
    });
  }

  /// Wait-all-fail-fast launch.
  ///
  /// Starts every task concurrently under a group context bound to
  /// `timeout` and blocks until all of them succeeded, one of them
  /// failed, or the group deadline elapsed. The first observed failure
  /// cancels the group context, so cancellation-honoring siblings stop
  /// early and the wait does not linger on stragglers; that failure is
  /// the single error returned and later failures from the same launch
  /// are discarded. Callers needing multi-error aggregation must
  /// collect per task themselves.
  pub async fn join(
    self,
    ctx: &TaskContext,
    timeout: Duration,
    logger: Arc<dyn TaskLogger>,
  ) -> Result<(), TaskError> {
    let group_ctx = ctx.child_with_timeout(timeout);
    let _guard = group_ctx.drop_guard();

    let mut set = JoinSet::new();
    for NamedTask { name, task } in self.tasks {
      let task_ctx = group_ctx.clone();
      let logger = Arc::clone(&logger);
      set.spawn(async move { execute(&task_ctx, task, &name, logger.as_ref()).await });
    }

    // First failure wins; the slot is written at most once per launch.
    let mut first_error: Option<TaskError> = None;
    while let Some(joined) = set.join_next().await {
      // The execute wrapper contains task panics itself; a join error
      // here would mean the wrapper task died.
      let result = joined.unwrap_or_else(|join_err| {
        Err(TaskError::Panicked {
          message: join_err.to_string(),
        })
      });

      if let Err(error) = result {
        if first_error.is_none() {
          group_ctx.cancel();
          first_error = Some(error);
        }
      }
    }

    match first_error {
      Some(error) => Err(error),
      None => Ok(()),
    }
  }
}
