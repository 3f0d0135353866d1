use monocheck::cli::{handle_check, CliArgs, EXIT_INTERRUPTED};
use monocheck::util::{init_logging, resolve_level, LoggingConfig};
use monocheck::{CancellationToken, VERSION};

use clap::Parser;
use std::env;
use tracing::{debug, warn};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let configured = env::var("MONOCHECK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let level = resolve_level(args.log_level.as_deref(), args.verbose, args.quiet, &configured);
    init_logging(LoggingConfig::with_level(level));

    debug!("monocheck v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let exit_code = handle_check(&args, cancel).await;
    std::process::exit(exit_code);
}

/// First Ctrl-C stops at the next package boundary; a second one exits now
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupt received, finishing the current package (press Ctrl-C again to exit)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(EXIT_INTERRUPTED);
        }
    });
}
