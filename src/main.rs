//! proxy-probe: a raw HTTP-over-TCP probe for a local forward proxy
//!
//! Sends one hand-written absolute-form `GET` through the proxy and prints
//! every chunk of the reply, unparsed, until the proxy closes the
//! connection.
//!
//! Features:
//! - Byte-exact request template with the remote host substituted twice
//! - One output line per received chunk, plus an end-of-stream line
//! - Configuration via CLI arguments or TOML file

mod config;
mod probe;
mod request;

use config::Config;
use probe::ProbeClient;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging; stdout is reserved for the received bytes
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!(
        proxy = %config.target,
        remote_host = %config.remote_host,
        "Starting proxy-probe"
    );

    // One connection, one task: no worker threads needed
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let client = ProbeClient::new(
        config.target.clone(),
        request::build_request(&config.remote_host),
    );
    let mut stdout = std::io::stdout();

    match runtime.block_on(client.run(&mut stdout)) {
        Ok(summary) => {
            info!(
                chunks = summary.chunks,
                bytes = summary.bytes,
                "Probe finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Probe aborted");
            Err(e.into())
        }
    }
}
