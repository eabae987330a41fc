//! Termination signals — SIGINT, SIGTERM, SIGHUP flip the run state.

use tokio::task::JoinHandle;

use mqtt_velux_app::lifecycle::RunState;

/// Watch for a termination signal until `run_state` stops.
pub fn spawn(run_state: RunState) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            name = received() => {
                tracing::error!(signal = name, "{name} received");
                run_state.request_stop();
            }
            () = run_state.stopped() => {}
        }
    })
}

#[cfg(unix)]
async fn received() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let (Ok(mut interrupt), Ok(mut terminate), Ok(mut hangup)) = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::hangup()),
    ) else {
        tracing::warn!("failed to install signal handlers, only ctrl-c is watched");
        return ctrl_c().await;
    };

    tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = hangup.recv() => "SIGHUP",
    }
}

#[cfg(not(unix))]
async fn received() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to watch ctrl-c");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
