//! Demo launcher for the lookout crates.
//!
//! Runs a fire-and-forget task and a waiting group, logging through the
//! `tracing` adapter.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;

use lookout_context::TaskContext;
use lookout_log::{TaskLogger, TracingLogger};
use lookout_task_executor::spawn_task;
use lookout_task_group::TaskGroup;

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();

  let ctx = TaskContext::new();
  let logger: Arc<dyn TaskLogger> = Arc::new(TracingLogger);

  // Background task nobody waits for.
  spawn_task(
    &ctx,
    "cache-warmup",
    |_ctx| async {
      sleep(Duration::from_millis(200)).await;
      Ok(())
    },
    Duration::from_secs(5),
    Arc::clone(&logger),
  );

  // Group the caller waits on; the failing task cancels its sibling.
  let outcome = TaskGroup::new()
    .add("index-rebuild", |ctx: TaskContext| async move {
      tokio::select! {
        _ = ctx.cancelled() => {}
        _ = sleep(Duration::from_secs(2)) => {}
      }
      Ok(())
    })
    .add("report-upload", |_ctx| async {
      sleep(Duration::from_millis(100)).await;
      Err(anyhow::anyhow!("upload endpoint unreachable"))
    })
    .join(&ctx, Duration::from_secs(10), Arc::clone(&logger))
    .await;

  match outcome {
    Ok(()) => tracing::info!("all tasks completed"),
    Err(error) => tracing::error!(error = %error, "group failed"),
  }

  // Let the fire-and-forget task finish before the process exits.
  sleep(Duration::from_millis(300)).await;

  Ok(())
}
