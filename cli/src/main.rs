use clap::Parser;
use redisai_cli::config::cli::Cli;
use redisai_cli::connect::run_command;
use redisai_client_rs::AiClient;
use std::io;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();
    tracer::init_tracing(
        "redisai-cli",
        Some(&cli.config.log_level),
        cli.config.otel_endpoint(),
    )
    .map_err(io::Error::other)?;

    let config = cli
        .config
        .connection_config()
        .map_err(io::Error::other)?;
    tracing::debug!(address = %config.address(), "Connecting");
    let mut client = AiClient::new(config).await.map_err(io::Error::other)?;

    let output = run_command(&mut client, cli.command).await;
    if let Err(err) = client.close().await {
        tracing::warn!("Could not close connection cleanly {err}");
    }
    if cli.config.enable_tracing {
        tracer::shutdown_tracing();
    }
    println!("{}", output.map_err(io::Error::other)?);
    Ok(())
}
