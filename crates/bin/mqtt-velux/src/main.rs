//! # mqtt-velux — MQTT ↔ Velux bridge daemon
//!
//! Composition root that wires the bus client and the device gateway
//! together and runs the bridge until a termination signal arrives.
//!
//! ## Responsibilities
//! - Parse the command line and the configuration file
//! - Install logging (and, with `-d`, forward diagnostics to the bus)
//! - Construct the adapters and inject them into the app layer
//! - Shut down in order: stop routing, disconnect the gateway, announce
//!   `ended.`, drain the bus client
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod logging;
mod signals;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mqtt_velux_adapter_mqtt::MqttBus;
use mqtt_velux_adapter_virtual::VirtualGateway;
use mqtt_velux_app::bridge::Bridge;
use mqtt_velux_app::lifecycle::RunState;
use mqtt_velux_app::publisher::StatePublisher;
use mqtt_velux_app::router::CommandRouter;
use mqtt_velux_app::{directory, scheduler};
use mqtt_velux_domain::error::BridgeError;

use crate::config::Config;
use crate::logging::{DiagnosticsReceiver, Verbosity};

/// Bridge MQTT topics to Velux actuators.
#[derive(Debug, Parser)]
#[command(name = "mqtt-velux", version, about)]
struct Args {
    /// Log progress at info level.
    #[arg(short, long)]
    verbose: bool,
    /// Log at debug level and publish log lines to the bus.
    #[arg(short, long)]
    debug: bool,
    /// Path to the TOML configuration file.
    config: PathBuf,
}

impl Args {
    fn verbosity(&self) -> Verbosity {
        if self.debug {
            Verbosity::Debug
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("mqtt-velux: {}", report(&err));
            return ExitCode::FAILURE;
        }
    };
    let diagnostics = logging::init(&config.logging, args.verbosity());

    match run(config, diagnostics).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %report(&err), "bridge failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, diagnostics: Option<DiagnosticsReceiver>) -> Result<(), BridgeError> {
    let gateway = VirtualGateway::new(&config.gateway.nodes)
        .map_err(|err| BridgeError::startup("configuring gateway", err))?;

    let bus = MqttBus::new(&config.mqtt);
    let publisher = StatePublisher::new(
        bus.publisher(),
        config.mqtt.response.clone(),
        config.mqtt.retain,
    );
    let forwarder =
        diagnostics.map(|receiver| logging::spawn_forwarder(receiver, publisher.clone()));

    let (scheduler, commands) = scheduler::channel();
    let (directory, directory_reader) = directory::channel();
    let router = CommandRouter::new(
        config.mqtt.prefix.clone(),
        scheduler,
        directory_reader,
        publisher.clone(),
    );

    let run_state = RunState::new();
    let session = bus.start(router, run_state.clone());
    let signals = signals::spawn(run_state.clone());

    let bridge = Bridge::new(gateway, publisher, commands, directory)
        .with_poll_interval(config.polling.interval());
    let result = bridge.run(run_state.clone()).await;

    run_state.request_stop();
    if let Some(forwarder) = forwarder {
        forwarder.abort();
    }
    if let Err(err) = session.shutdown().await {
        tracing::warn!(error = %report(&err), "bus shutdown incomplete");
    }
    if let Err(err) = signals.await {
        tracing::debug!(%err, "signal watcher ended abnormally");
    }
    result
}

/// `error: cause: cause` over the whole source chain.
fn report(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
