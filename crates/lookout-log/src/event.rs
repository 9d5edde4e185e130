//! Structured log records.

use lookout_context::TaskContext;

/// Severity of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
  Info,
  Error,
}

/// A single structured record captured from the engine.
#[derive(Debug, Clone)]
pub struct LogEvent {
  pub level: LogLevel,
  pub message: String,
  /// Ordered annotations from the context the call was made with.
  pub annotations: Vec<(String, String)>,
  /// Extra key-value fields supplied at the call site.
  pub fields: Vec<(String, String)>,
}

impl LogEvent {
  pub(crate) fn new(
    level: LogLevel,
    ctx: &TaskContext,
    message: &str,
    fields: &[(&str, String)],
  ) -> Self {
    Self {
      level,
      message: message.to_string(),
      annotations: ctx.annotations().to_vec(),
      fields: fields
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect(),
    }
  }

  /// Look up an annotation by key.
  pub fn annotation(&self, key: &str) -> Option<&str> {
    self
      .annotations
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  /// Look up a call-site field by key.
  pub fn field(&self, key: &str) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }
}
