//! Supervised runner for a single task future.

use std::any::Any;
use std::future::Future;

use lookout_context::{CancelCause, TaskContext};

use crate::error::TaskError;

/// Run `task` on its own tokio task under `ctx`.
///
/// Returns whichever comes first: the task's own result, a
/// [`TaskError::Panicked`] if it panicked, or a
/// [`TaskError::Cancelled`] once `ctx` is cancelled or past its
/// deadline. A cancelled task is abandoned, never aborted: it keeps
/// running in the background and is expected to observe `ctx` itself if
/// it wants to stop early.
pub async fn run<F, Fut>(ctx: &TaskContext, task: F) -> Result<(), TaskError>
where
  F: FnOnce(TaskContext) -> Fut,
  Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
  let handle = tokio::spawn(task(ctx.clone()));

  tokio::select! {
    joined = handle => match joined {
      Ok(result) => result.map_err(TaskError::from),
      Err(join_err) if join_err.is_panic() => Err(TaskError::Panicked {
        message: panic_message(join_err.into_panic()),
      }),
      // Only reachable while the runtime is shutting down.
      Err(_) => Err(TaskError::Cancelled(CancelCause::Cancelled)),
    },
    _ = ctx.cancelled() => Err(TaskError::Cancelled(
      ctx.cancel_cause().unwrap_or(CancelCause::Cancelled),
    )),
  }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  match payload.downcast::<String>() {
    Ok(message) => *message,
    Err(payload) => match payload.downcast::<&'static str>() {
      Ok(message) => (*message).to_string(),
      Err(_) => "opaque panic payload".to_string(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  use tokio::time::sleep;

  fn ctx_with_timeout(timeout: Duration) -> TaskContext {
    TaskContext::new().child_with_timeout(timeout)
  }

  async fn panicking_task(_ctx: TaskContext) -> anyhow::Result<()> {
    sleep(Duration::from_millis(10)).await;
    panic!("invalid state reached");
  }

  #[tokio::test]
  async fn completes_before_deadline() {
    let ctx = ctx_with_timeout(Duration::from_millis(300));

    let result = run(&ctx, |_ctx| async {
      sleep(Duration::from_millis(10)).await;
      Ok(())
    })
    .await;

    assert!(result.is_ok());
  }

  #[tokio::test]
  async fn deadline_elapses_before_completion() {
    let ctx = ctx_with_timeout(Duration::from_millis(50));

    let err = run(&ctx, |_ctx| async {
      sleep(Duration::from_millis(300)).await;
      Ok(())
    })
    .await
    .unwrap_err();

    assert!(err.is_deadline());
    assert!(err.to_string().contains("deadline exceeded"));
  }

  #[tokio::test]
  async fn panic_is_contained() {
    let ctx = ctx_with_timeout(Duration::from_millis(500));

    let err = run(&ctx, panicking_task).await.unwrap_err();

    assert!(err.is_panic());
    assert!(err.to_string().contains("panic occurred in task"));
    assert!(err.to_string().contains("invalid state reached"));
  }

  #[tokio::test]
  async fn task_error_is_surfaced_verbatim() {
    let ctx = ctx_with_timeout(Duration::from_millis(300));

    let err = run(&ctx, |_ctx| async {
      Err(anyhow::anyhow!("connection refused"))
    })
    .await
    .unwrap_err();

    assert!(!err.is_panic());
    assert_eq!(err.to_string(), "connection refused");
  }

  #[tokio::test]
  async fn explicit_cancel_unblocks_the_caller() {
    let ctx = ctx_with_timeout(Duration::from_secs(5));

    let canceller = ctx.clone();
    tokio::spawn(async move {
      sleep(Duration::from_millis(20)).await;
      canceller.cancel();
    });

    let err = run(&ctx, |_ctx| async {
      sleep(Duration::from_secs(5)).await;
      Ok(())
    })
    .await
    .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!err.is_deadline());
  }
}
