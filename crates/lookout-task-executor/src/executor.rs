//! Named-task execution wrapper and single-task entry points.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use lookout_context::TaskContext;
use lookout_log::TaskLogger;
use tokio::time::Instant;

use crate::error::TaskError;
use crate::supervisor::run;

/// Run a named task under `ctx` with lifecycle logging.
///
/// Derives a child context annotated with the task name, records
/// "task started", and always records "task finished" with the elapsed
/// wall-clock time, also when the task failed. Failures are
/// additionally recorded and returned unchanged.
pub async fn execute<F, Fut>(
  ctx: &TaskContext,
  task: F,
  task_name: &str,
  logger: &dyn TaskLogger,
) -> Result<(), TaskError>
where
  F: FnOnce(TaskContext) -> Fut,
  Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
  let ctx = ctx.with_annotation("taskname", task_name);

  let start = Instant::now();
  logger.info(&ctx, "task started", &[]);

  let result = run(&ctx, task).await;

  let elapsed = start.elapsed();
  logger.info(&ctx, "task finished", &[("elapsed", format!("{elapsed:?}"))]);

  if let Err(error) = &result {
    logger.error(
      &ctx,
      "error occurred in executing task",
      &[("error", error.to_string())],
    );
  }

  result
}

/// Fire-and-forget launch of a single named task.
///
/// Derives a child context bound to `timeout` and returns immediately
/// without waiting. Failures are visible only through `logger`. The
/// derived context is released when the task finishes.
pub fn spawn_task<F, Fut>(
  ctx: &TaskContext,
  task_name: &str,
  task: F,
  timeout: Duration,
  logger: Arc<dyn TaskLogger>,
) where
  F: FnOnce(TaskContext) -> Fut + Send + 'static,
  Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
  let child = ctx.child_with_timeout(timeout);
  let guard = child.drop_guard();
  let task_name = task_name.to_string();

  tokio::spawn(async move {
    let _guard = guard;
    let _ = execute(&child, task, &task_name, logger.as_ref()).await;
  });
}

/// Run a single named task and wait for its outcome.
///
/// Wait-one variant of [`spawn_task`]: derives a child context bound to
/// `timeout`, executes the task, and returns its result.
pub async fn run_task<F, Fut>(
  ctx: &TaskContext,
  task_name: &str,
  task: F,
  timeout: Duration,
  logger: &dyn TaskLogger,
) -> Result<(), TaskError>
where
  F: FnOnce(TaskContext) -> Fut,
  Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
  let child = ctx.child_with_timeout(timeout);
  let _guard = child.drop_guard();
  execute(&child, task, task_name, logger).await
}

#[cfg(test)]
mod tests {
  use super::*;

  use lookout_log::{ChannelLogger, LogLevel};
  use tokio::time::sleep;

  #[tokio::test]
  async fn execute_records_lifecycle_events() {
    let (logger, mut events) = ChannelLogger::new();
    let ctx = TaskContext::new().child_with_timeout(Duration::from_millis(500));

    let result = execute(&ctx, |_ctx| async { Ok(()) }, "report-sync", &logger).await;
    assert!(result.is_ok());

    let started = events.recv().await.unwrap();
    assert_eq!(started.message, "task started");
    assert_eq!(started.annotation("taskname"), Some("report-sync"));

    let finished = events.recv().await.unwrap();
    assert_eq!(finished.message, "task finished");
    assert!(finished.field("elapsed").is_some());
  }

  #[tokio::test]
  async fn execute_records_the_error_and_still_logs_finish() {
    let (logger, mut events) = ChannelLogger::new();
    let ctx = TaskContext::new().child_with_timeout(Duration::from_millis(500));

    let result = execute(
      &ctx,
      |_ctx| async { Err(anyhow::anyhow!("no database")) },
      "db-check",
      &logger,
    )
    .await;
    assert!(result.is_err());

    let started = events.recv().await.unwrap();
    assert_eq!(started.message, "task started");

    let finished = events.recv().await.unwrap();
    assert_eq!(finished.message, "task finished");
    assert!(finished.field("elapsed").is_some());

    let failed = events.recv().await.unwrap();
    assert_eq!(failed.level, LogLevel::Error);
    assert!(failed.field("error").unwrap().contains("no database"));
  }

  #[tokio::test]
  async fn spawn_task_returns_without_blocking() {
    let (logger, mut events) = ChannelLogger::new();
    let ctx = TaskContext::new();

    let start = Instant::now();
    spawn_task(
      &ctx,
      "slow-warmup",
      |_ctx| async {
        sleep(Duration::from_millis(300)).await;
        Ok(())
      },
      Duration::from_secs(5),
      Arc::new(logger),
    );
    assert!(start.elapsed() < Duration::from_millis(100));

    // The task still runs to completion in the background.
    let started = events.recv().await.unwrap();
    assert_eq!(started.message, "task started");
    let finished = events.recv().await.unwrap();
    assert_eq!(finished.message, "task finished");
  }

  #[tokio::test]
  async fn run_task_enforces_the_timeout() {
    let (logger, _events) = ChannelLogger::new();
    let ctx = TaskContext::new();

    let err = run_task(
      &ctx,
      "stuck-task",
      |_ctx| async {
        sleep(Duration::from_secs(5)).await;
        Ok(())
      },
      Duration::from_millis(50),
      &logger,
    )
    .await
    .unwrap_err();

    assert!(err.is_deadline());
  }
}
