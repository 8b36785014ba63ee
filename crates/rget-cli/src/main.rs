use rget_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // The engine's decision audit trail goes to stderr via tracing; keep
    // stdout for progress and results.
    logging::init_logging_stderr();

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("rget error: {:#}", err);
        std::process::exit(1);
    }
}
