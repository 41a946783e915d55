mod commands;

use anyhow::Result;
use cmdflow::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    init_tracing();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(run()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Already printed together with the help text.
            if !is_reported(&err) {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let mut parser = Parser::new(commands::schema())?;
    parser.run_env().await?;
    Ok(())
}

fn is_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<cmdflow::Error>()
        .is_some_and(cmdflow::Error::is_reported)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
