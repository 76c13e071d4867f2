use std::sync::Arc;

use cartero::config::ServiceConfig;
use cartero::http::routes;
use cartero::pipeline::SubmissionPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export CARTERO_API_KEY=...");
        std::process::exit(1);
    });

    let port = config.bind_port;
    eprintln!("📮 Cartero v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Provider: {}", config.provider.api_base);
    eprintln!(
        "   Test mode: {}",
        if config.provider.test_mode { "on" } else { "off" }
    );
    eprintln!("   Max sends: {}", config.max_sends);
    eprintln!("   Endpoint: http://0.0.0.0:{port}/api/postcards\n");

    let pipeline = Arc::new(SubmissionPipeline::new(config)?);
    let app = routes(pipeline);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(port, "Postcard server started");
    axum::serve(listener, app).await?;

    Ok(())
}
