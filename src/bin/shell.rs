//! tikv-shell Binary
//!
//! Connects to the cluster and starts the interactive loop.

use std::io;

use tikv_shell::cli::Args;
use tikv_shell::repl::{Exit, LineEditor, Repl};
use tikv_shell::store::TikvStore;
use tikv_shell::{signal, Dispatcher};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // Logs go to stderr so they never mix with command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let config = match Args::from_env().into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("tikv-shell v{}", tikv_shell::VERSION);
    tracing::info!("pd endpoints: {}", config.pd_endpoints.join(","));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = signal::spawn_listener(runtime.handle()) {
        tracing::error!("Failed to install signal handlers: {}", e);
        std::process::exit(1);
    }

    // Open store
    let store = match runtime.block_on(TikvStore::connect(&config.pd_endpoints)) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to connect to store: {}", e);
            std::process::exit(1);
        }
    };

    let dispatcher = Dispatcher::new(store).with_scan_batch_size(config.scan_batch_size);

    let mut editor = match LineEditor::open(&config) {
        Ok(editor) => editor,
        Err(e) => {
            tracing::error!("Failed to open terminal: {}", e);
            std::process::exit(1);
        }
    };

    let repl = Repl::new(&dispatcher, runtime.handle().clone(), config.prompt.as_str());
    match repl.run(&mut editor, &mut io::stdout()) {
        Ok(Exit::Command) => std::process::exit(0),
        Ok(exit) => tracing::debug!("Loop ended: {:?}", exit),
        Err(e) => {
            tracing::error!("Shell error: {}", e);
            std::process::exit(1);
        }
    }
}
