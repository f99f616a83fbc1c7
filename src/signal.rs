//! Signal listener
//!
//! Waits for a termination signal on the runtime and exits the process.
//! The listener never touches the store; process exit aborts whatever the
//! interactive loop was doing.

use std::fmt;
use std::io;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Signals that terminate the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Hangup,
    Interrupt,
    Terminate,
    Quit,
}

impl Signal {
    /// Exit status for this signal: success only for a termination request
    pub fn exit_code(self) -> i32 {
        match self {
            Signal::Terminate => 0,
            Signal::Hangup | Signal::Interrupt | Signal::Quit => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Signal::Hangup => "SIGHUP",
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Notice printed before exiting on a signal
pub fn exit_notice(signal: Signal) -> String {
    format!("\nGot signal [{}] to exit.", signal)
}

/// Spawn the listener on `runtime`
///
/// Handlers are registered before this returns, so signals arriving while
/// the store connection is being opened are already caught.
pub fn spawn_listener(runtime: &Handle) -> io::Result<JoinHandle<()>> {
    let _guard = runtime.enter();
    let signals = Signals::register()?;

    Ok(runtime.spawn(async move {
        let signal = signals.recv().await;
        tracing::info!("Received {}, exiting", signal);
        println!("{}", exit_notice(signal));
        std::process::exit(signal.exit_code());
    }))
}

#[cfg(unix)]
struct Signals {
    hangup: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            hangup: signal(SignalKind::hangup())?,
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    async fn recv(mut self) -> Signal {
        tokio::select! {
            _ = self.hangup.recv() => Signal::Hangup,
            _ = self.interrupt.recv() => Signal::Interrupt,
            _ = self.terminate.recv() => Signal::Terminate,
            _ = self.quit.recv() => Signal::Quit,
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn register() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(self) -> Signal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        Signal::Interrupt
    }
}
