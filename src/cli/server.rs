use clap::Parser;
use error_stack::{Result, ResultExt};
use std::net::IpAddr;
use std::num::NonZeroUsize;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use super::RunError;
use agora::{config, http};

/// Expose the forum API HTTP server
#[derive(Debug, Parser)]
pub struct ServerCommand {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub port: Option<u16>,
    #[clap(long)]
    pub workers: Option<NonZeroUsize>,
}

pub fn run(args: &ServerCommand) -> Result<(), RunError> {
    let mut config = config::Server::load().change_context(RunError)?;
    args.override_config(&mut config);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .change_context(RunError)
        .attach_printable("could not build tokio runtime")?
        .block_on(http::run(config))
        .change_context(RunError)
}

impl ServerCommand {
    fn override_config(&self, config: &mut config::Server) {
        // override server configurations if set by the cli
        if let Some(address) = self.address {
            config.http.ip = address;
        }

        if let Some(port) = self.port {
            config.http.port = port;
        }

        if let Some(workers) = self.workers {
            config.http.workers = Some(workers);
        }
    }
}
