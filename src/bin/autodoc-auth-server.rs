//! Local token proxy serving `POST /getToken` for embedded API explorers.

// crates.io
use clap::Parser;
use color_eyre::Result;
use tokio::net::TcpListener;
// self
use autodoc::{config::ServerConfig, obs, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ServerConfig::parse();

	obs::init_subscriber(&config.log_filter)?;

	let dispatcher = config.dispatcher()?;
	let listener = TcpListener::bind(config.socket_addr()).await?;

	tracing::info!(
		addr = %listener.local_addr()?,
		timeout_secs = config.timeout_secs,
		"auth server listening"
	);

	server::serve(listener, dispatcher).await?;

	tracing::info!("auth server stopped");

	Ok(())
}
