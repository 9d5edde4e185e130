//! Logger collaborator for the lookout engine.
//!
//! The engine reports task lifecycle events (start, finish, error)
//! through the [`TaskLogger`] trait. There is no implicit global
//! logger: callers pass an implementation explicitly to every entry
//! point. Adapters are provided for the `tracing` ecosystem
//! ([`TracingLogger`]), for discarding records ([`NoopLogger`]), and
//! for channel-based consumption ([`ChannelLogger`]).

mod event;
mod logger;

pub use event::{LogEvent, LogLevel};
pub use logger::{ChannelLogger, NoopLogger, TaskLogger, TracingLogger};
