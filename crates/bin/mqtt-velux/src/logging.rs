//! Tracing setup and the diagnostics-to-bus forwarder.

use std::fmt::{self, Write as _};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt as _};
use tracing_subscriber::util::SubscriberInitExt as _;

use mqtt_velux_app::ports::BusPublisher;
use mqtt_velux_app::publisher::StatePublisher;

use crate::config::LoggingConfig;

/// Target prefix shared by every crate of the bridge.
pub const TARGET_PREFIX: &str = "mqtt_velux";

/// Filter used when nothing else is configured.
pub const DEFAULT_FILTER: &str = "warn,mqtt_velux=error";

/// Command-line verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Quiet,
    /// `-v`: bridge crates at `info`.
    Verbose,
    /// `-d`: bridge crates at `debug`, forwarded to the bus.
    Debug,
}

/// Resolve the filter directive, highest precedence first: `RUST_LOG`,
/// `MQTT_VELUX_LOG`, `-d`, `-v`, the config file, the default.
pub fn filter_directive(
    config: &LoggingConfig,
    verbosity: Verbosity,
    var: impl Fn(&str) -> Option<String>,
) -> String {
    if let Some(filter) = var("RUST_LOG").or_else(|| var("MQTT_VELUX_LOG")) {
        return filter;
    }
    match verbosity {
        Verbosity::Debug => format!("warn,{TARGET_PREFIX}=debug"),
        Verbosity::Verbose => format!("warn,{TARGET_PREFIX}=info"),
        Verbosity::Quiet => config
            .filter
            .clone()
            .filter(|filter| !filter.is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
    }
}

/// Install the global subscriber.
///
/// With [`Verbosity::Debug`] the bridge's own events are also captured for
/// the bus; the returned receiver feeds [`spawn_forwarder`].
pub fn init(config: &LoggingConfig, verbosity: Verbosity) -> Option<DiagnosticsReceiver> {
    let directive = filter_directive(config, verbosity, |key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        eprintln!("mqtt-velux: invalid log filter {directive:?}: {err}");
        EnvFilter::new(DEFAULT_FILTER)
    });

    let (layer, receiver) = if verbosity == Verbosity::Debug {
        let (layer, receiver) = DiagnosticsLayer::new();
        (Some(layer), Some(receiver))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(layer)
        .init();
    receiver
}

/// One captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

pub type DiagnosticsReceiver = mpsc::UnboundedReceiver<Diagnostic>;

/// Captures events emitted by the bridge's crates.
///
/// Third-party targets are skipped so the bus client's own logs never loop
/// back onto the bus.
#[derive(Debug, Clone)]
pub struct DiagnosticsLayer {
    sender: mpsc::UnboundedSender<Diagnostic>,
}

impl DiagnosticsLayer {
    #[must_use]
    pub fn new() -> (Self, DiagnosticsReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl<S: Subscriber> Layer<S> for DiagnosticsLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(TARGET_PREFIX) {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        // closed once the runtime is gone
        let _ = self.sender.send(Diagnostic {
            level: *metadata.level(),
            message: visitor.finish(),
        });
    }
}

/// Renders `message` followed by the remaining fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
            return;
        }
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={value:?}", field.name());
    }
}

/// Publish captured events on `response/mqtt-velux/system/<level>`.
///
/// Failures go to stderr; logging them would feed them back in.
pub fn spawn_forwarder<P>(
    mut receiver: DiagnosticsReceiver,
    publisher: StatePublisher<P>,
) -> JoinHandle<()>
where
    P: BusPublisher + 'static,
{
    tokio::spawn(async move {
        while let Some(diagnostic) = receiver.recv().await {
            if let Err(err) =
                publisher.publish_diagnostic(diagnostic.level.as_str(), &diagnostic.message)
            {
                eprintln!("mqtt-velux: failed to forward diagnostic: {err}");
            }
        }
    })
}
