//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use tally_core::{AIClient, CommentaryBackend, Config};
use tally_server::{ServerConfig, SnapshotSource};

/// Parse a comma-separated origin list (TALLY_ALLOWED_ORIGINS)
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn cmd_serve(state_path: &Path, config: &Config, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting Tally web server...");
    println!("   State: {}", state_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let ai = AIClient::from_config(&config.ai);
    match &ai {
        Some(client) => println!(
            "   🤖 Commentary: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => println!("   💡 Tip: Set OLLAMA_HOST for panel commentary"),
    }

    let allowed_origins =
        parse_origins(&std::env::var("TALLY_ALLOWED_ORIGINS").unwrap_or_default());
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {} (TALLY_ALLOWED_ORIGINS)",
            allowed_origins.join(", ")
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let snapshot = SnapshotSource::from_path(state_path)
        .with_context(|| format!("Failed to read state snapshot {}", state_path.display()))?;

    let server_config = ServerConfig {
        allowed_origins,
        fixed_now: None,
    };

    tally_server::serve(snapshot, ai, host, port, server_config).await
}
