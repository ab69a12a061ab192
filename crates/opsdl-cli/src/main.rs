use clap::Parser;
use opsdl_core::config;
use opsdl_core::control::CancelToken;
use opsdl_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Config is read before logging so its log_level can take part in the filter.
    let cfg = config::load_or_init();
    let configured = cfg.as_ref().ok().and_then(|c| c.log_level.clone());
    let verbosity = cli.verbosity();
    let filter = logging::build_filter(verbosity, configured.as_deref());
    if logging::init_logging(filter).is_err() {
        logging::init_logging_stderr(logging::build_filter(verbosity, configured.as_deref()));
    }

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping");
            eprintln!("opsdl: interrupted, finishing the current step...");
            on_interrupt.cancel();
        }
    });

    if let Err(err) = cli.run(cfg, cancel).await {
        tracing::error!("{:#}", err);
        eprintln!("opsdl error: {:#}", err);
        std::process::exit(1);
    }
}
