use std::sync::Arc;

use anyhow::Result;

use daybook_core::Config;
use daybook_notes::NoteStore;
use daybook_tools::{tools, ToolServer};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    tracing::info!("Daybook tool server starting");

    let notes = Arc::new(NoteStore::new(&config.notes_path));
    let registry = tools::builtin_registry(&config, notes.clone());

    ToolServer::new(registry, notes).run().await
}
