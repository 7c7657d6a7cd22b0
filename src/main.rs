use std::path::PathBuf;
use std::process::ExitCode;

use fazebook::social::config::Config;
use fazebook::social::error::Result;
use fazebook::social::network::SocialNetwork;
use fazebook::time_it;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn run() -> Result<()> {
    let mut config = time_it!(at once | "loading config" => Config::discover())?;
    config
        .sources
        .extend(std::env::args_os().skip(1).map(PathBuf::from));

    let network = SocialNetwork::new();
    let outcome = network.ingest_with(&config.sources(), &config.ingest_options())?;

    info!(
        users = network.user_count(),
        friendships = network.friendship_edge_count() / 2,
        failed_sources = outcome.failed().count(),
        "network built"
    );

    if let Some(path) = &config.report {
        let report = time_it!(at once | "building report" => network.report());
        time_it!("writing report" => report.write_to(path))?;
        info!(path = %path.display(), users = report.users.len(), "report written");
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "fazebook failed");
            ExitCode::FAILURE
        }
    }
}
