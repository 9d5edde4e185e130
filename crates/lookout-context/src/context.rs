//! Task context implementation.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::CancelCause;

/// A propagating deadline/cancellation/annotation carrier.
///
/// Cloning is cheap; clones observe the same cancel signal. Children
/// derived with [`TaskContext::child_with_timeout`] may shorten the
/// deadline but never lengthen it, and are cancelled whenever their
/// parent is. Once a context is cancelled, by trigger or by expiry, it
/// stays cancelled.
#[derive(Debug, Clone)]
pub struct TaskContext {
  cancel: CancellationToken,
  deadline: Option<Instant>,
  annotations: Arc<Vec<(String, String)>>,
}

impl TaskContext {
  /// Create a root context with no deadline and no annotations.
  pub fn new() -> Self {
    Self {
      cancel: CancellationToken::new(),
      deadline: None,
      annotations: Arc::new(Vec::new()),
    }
  }

  /// Derive a child context whose deadline is at most `timeout` from now.
  ///
  /// The child inherits the parent's annotations and is cancelled when
  /// the parent is. If the parent deadline is already sooner, the child
  /// keeps it.
  pub fn child_with_timeout(&self, timeout: Duration) -> Self {
    let candidate = Instant::now() + timeout;
    let deadline = match self.deadline {
      Some(parent) if parent < candidate => parent,
      _ => candidate,
    };
    Self {
      cancel: self.cancel.child_token(),
      deadline: Some(deadline),
      annotations: Arc::clone(&self.annotations),
    }
  }

  /// Derive a context carrying an extra annotation for log calls.
  ///
  /// Shares the cancel signal and deadline with `self`.
  pub fn with_annotation(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
    let mut annotations = (*self.annotations).clone();
    annotations.push((key.into(), value.into()));
    Self {
      cancel: self.cancel.clone(),
      deadline: self.deadline,
      annotations: Arc::new(annotations),
    }
  }

  /// Ordered annotations, parents first.
  pub fn annotations(&self) -> &[(String, String)] {
    &self.annotations
  }

  /// The deadline, if one was set.
  pub fn deadline(&self) -> Option<Instant> {
    self.deadline
  }

  /// Trigger cancellation. Idempotent and safe to call concurrently.
  pub fn cancel(&self) {
    self.cancel.cancel();
  }

  /// Whether the cancel signal fired or the deadline elapsed.
  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled() || self.deadline_elapsed()
  }

  /// Why this context is cancelled, or `None` if it is still live.
  ///
  /// When both the deadline and the trigger fired, the deadline wins.
  pub fn cancel_cause(&self) -> Option<CancelCause> {
    if self.deadline_elapsed() {
      Some(CancelCause::DeadlineExceeded)
    } else if self.cancel.is_cancelled() {
      Some(CancelCause::Cancelled)
    } else {
      None
    }
  }

  /// Resolve once the cancel signal fires or the deadline elapses,
  /// whichever comes first.
  ///
  /// The deadline timer lives inside the returned future, so dropping
  /// the future releases it on every exit path of the awaiting scope.
  pub async fn cancelled(&self) {
    match self.deadline {
      Some(deadline) => {
        tokio::select! {
          _ = self.cancel.cancelled() => {}
          _ = tokio::time::sleep_until(deadline) => {}
        }
      }
      None => self.cancel.cancelled().await,
    }
  }

  /// Guard that cancels this context when dropped.
  ///
  /// Scoped release for derived contexts: whichever way the owning
  /// scope exits, the token fires and descendants are unblocked.
  pub fn drop_guard(&self) -> DropGuard {
    self.cancel.clone().drop_guard()
  }

  fn deadline_elapsed(&self) -> bool {
    self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
  }
}

impl Default for TaskContext {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn child_deadline_never_lengthens() {
    let root = TaskContext::new();
    let short = root.child_with_timeout(Duration::from_millis(50));
    let long = short.child_with_timeout(Duration::from_secs(60));

    assert_eq!(long.deadline(), short.deadline());

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(short.is_cancelled());
    assert!(long.is_cancelled());
    assert_eq!(long.cancel_cause(), Some(CancelCause::DeadlineExceeded));
  }

  #[tokio::test]
  async fn cancel_is_idempotent() {
    let ctx = TaskContext::new();
    ctx.cancel();
    ctx.cancel();

    assert!(ctx.is_cancelled());
    assert_eq!(ctx.cancel_cause(), Some(CancelCause::Cancelled));
  }

  #[tokio::test]
  async fn cancel_propagates_to_children() {
    let root = TaskContext::new();
    let child = root.child_with_timeout(Duration::from_secs(60));

    root.cancel();
    child.cancelled().await;

    assert_eq!(child.cancel_cause(), Some(CancelCause::Cancelled));
  }

  #[tokio::test]
  async fn annotations_are_ordered_and_inherited() {
    let ctx = TaskContext::new()
      .with_annotation("a", "1")
      .with_annotation("b", "2");
    let child = ctx
      .child_with_timeout(Duration::from_secs(1))
      .with_annotation("c", "3");

    let keys: Vec<_> = child.annotations().iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["a", "b", "c"]);

    // The parent is unaffected by the child's annotation.
    assert_eq!(ctx.annotations().len(), 2);
  }

  #[tokio::test]
  async fn drop_guard_cancels_on_scope_exit() {
    let ctx = TaskContext::new();
    {
      let _guard = ctx.drop_guard();
    }
    assert!(ctx.is_cancelled());
  }
}
