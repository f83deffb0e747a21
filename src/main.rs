use std::sync::Arc;

use voicegram::config::{Script, ServerConfig};
use voicegram::twilio::{TwilioClient, TwilioConfig};
use voicegram::web::{AppState, routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let server = ServerConfig::from_env();

    // A broken script must never reach a live call
    let script = Script::load(&server.script_path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("📞 Voicegram v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Script: {}", server.script_path);
    eprintln!("   Public URL: {}", server.public_url);
    eprintln!("   Trigger page: http://localhost:{}/", server.port);

    let twilio = match TwilioConfig::from_env() {
        Some(config) => {
            eprintln!(
                "   Twilio: enabled (from {}, to {})",
                config.from_number, config.to_number
            );
            Some(Arc::new(TwilioClient::new(config)))
        }
        None => {
            eprintln!("   Twilio: disabled (set TWILIO_ACCOUNT_SID to enable call initiation)");
            None
        }
    };

    let state = AppState {
        script: Arc::new(script),
        twilio,
        public_url: server.public_url.clone(),
    };

    let app = routes(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", server.port)).await?;
    tracing::info!(port = server.port, "Voice webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
