//! Logger trait and adapters.

use lookout_context::TaskContext;
use tokio::sync::mpsc;

use crate::event::{LogEvent, LogLevel};

/// Logger collaborator the engine reports task lifecycle events to.
///
/// The engine calls `info` at task start and finish (with the elapsed
/// duration) and `error` when a task fails. Implementations decide what
/// to do with the records: forward, collect, discard.
pub trait TaskLogger: Send + Sync {
  /// Record an informational event.
  fn info(&self, ctx: &TaskContext, message: &str, fields: &[(&str, String)]);

  /// Record a failure event.
  fn error(&self, ctx: &TaskContext, message: &str, fields: &[(&str, String)]);
}

/// Discards every record.
///
/// Useful for tests or callers that do not want task logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl TaskLogger for NoopLogger {
  fn info(&self, _ctx: &TaskContext, _message: &str, _fields: &[(&str, String)]) {
    // Intentionally empty
  }

  fn error(&self, _ctx: &TaskContext, _message: &str, _fields: &[(&str, String)]) {
    // Intentionally empty
  }
}

/// Forwards records to the `tracing` ecosystem.
///
/// Context annotations and call-site fields are rendered as `key=value`
/// pairs on the emitted event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TaskLogger for TracingLogger {
  fn info(&self, ctx: &TaskContext, message: &str, fields: &[(&str, String)]) {
    tracing::info!(
      context = %render_annotations(ctx),
      fields = %render_fields(fields),
      "{message}"
    );
  }

  fn error(&self, ctx: &TaskContext, message: &str, fields: &[(&str, String)]) {
    tracing::error!(
      context = %render_annotations(ctx),
      fields = %render_fields(fields),
      "{message}"
    );
  }
}

/// Sends records to an unbounded channel.
///
/// Use this when a consumer wants to observe the exact sequence of task
/// lifecycle events (persist them, assert on them in tests). Send
/// errors are ignored - the receiver may have been dropped.
#[derive(Debug, Clone)]
pub struct ChannelLogger {
  sender: mpsc::UnboundedSender<LogEvent>,
}

impl ChannelLogger {
  /// Create a logger together with the receiving half of its channel.
  pub fn new() -> (Self, mpsc::UnboundedReceiver<LogEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self { sender }, receiver)
  }
}

impl TaskLogger for ChannelLogger {
  fn info(&self, ctx: &TaskContext, message: &str, fields: &[(&str, String)]) {
    let _ = self
      .sender
      .send(LogEvent::new(LogLevel::Info, ctx, message, fields));
  }

  fn error(&self, ctx: &TaskContext, message: &str, fields: &[(&str, String)]) {
    let _ = self
      .sender
      .send(LogEvent::new(LogLevel::Error, ctx, message, fields));
  }
}

fn render_annotations(ctx: &TaskContext) -> String {
  render_pairs(ctx.annotations().iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

fn render_fields(fields: &[(&str, String)]) -> String {
  render_pairs(fields.iter().map(|(k, v)| (*k, v.as_str())))
}

fn render_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
  pairs
    .map(|(key, value)| format!("{key}={value}"))
    .collect::<Vec<_>>()
    .join(" ")
}
