//! Forward `tracing` events to the host's log sink
//!
//! The plugin never talks to the host log directly. Code logs through the
//! usual `tracing` macros; while a host callback runs, the plugin's
//! dispatcher routes those events here, where they are flattened to one
//! prefixed line each.

use crate::host::{HostLog, HostLogLevel};
use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Prefix on every line sent to the host
pub const LOG_PREFIX: &str = "[plugin][keyaxis] ";

/// A `tracing_subscriber` layer writing to a [`HostLog`]
pub struct HostLogLayer {
    sink: Arc<dyn HostLog>,
}

impl HostLogLayer {
    pub fn new(sink: Arc<dyn HostLog>) -> Self {
        Self { sink }
    }
}

impl<S: Subscriber> Layer<S> for HostLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = host_level(*event.metadata().level());
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.sink
            .log(level, &format!("{}{}{}", LOG_PREFIX, visitor.message, visitor.fields));
    }
}

fn host_level(level: Level) -> HostLogLevel {
    match level {
        Level::ERROR => HostLogLevel::Error,
        Level::WARN => HostLogLevel::Warning,
        _ => HostLogLevel::Message,
    }
}

/// Collects the formatted message plus any structured fields as `key=value`
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Build a dispatcher that sends `INFO` and above to `sink`
pub fn dispatch(sink: Arc<dyn HostLog>) -> Dispatch {
    let subscriber = tracing_subscriber::registry()
        .with(HostLogLayer::new(sink).with_filter(LevelFilter::INFO));
    Dispatch::new(subscriber)
}

/// Run `f` with its log output going to `dispatch`, if there is one
///
/// Without a dispatcher events go wherever the thread's default subscriber
/// sends them.
pub fn with_host_log<R>(dispatch: Option<&Dispatch>, f: impl FnOnce() -> R) -> R {
    match dispatch {
        Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
        None => f(),
    }
}
