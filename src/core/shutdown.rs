//! OS termination signals that start draining the order runtime.
//!
//! [`stop_signal`] resolves with the [`StopSignal`] that arrived first; the
//! router records its name as the reason of `ShutdownRequested`.

/// Termination signal that triggered a drain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StopSignal {
    /// SIGINT, or Ctrl-C on non-unix targets.
    Interrupt,
    Terminate,
    Quit,
}

impl StopSignal {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            StopSignal::Interrupt => "sigint",
            StopSignal::Terminate => "sigterm",
            StopSignal::Quit => "sigquit",
        }
    }
}

#[cfg(unix)]
pub(crate) async fn stop_signal() -> std::io::Result<StopSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let received = tokio::select! {
        _ = interrupt.recv() => StopSignal::Interrupt,
        _ = terminate.recv() => StopSignal::Terminate,
        _ = quit.recv() => StopSignal::Quit,
    };
    Ok(received)
}

#[cfg(not(unix))]
pub(crate) async fn stop_signal() -> std::io::Result<StopSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(StopSignal::Interrupt)
}
