//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use clap::{Args, Subcommand};
use lyra_core::{CatalogResolver, JsonFileCatalog, LyraConfig, Quality};
use tracing::debug;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the media server
    Server {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
        #[command(flatten)]
        media: MediaArgs,
    },
    /// Show which file a track resolves to
    Resolve {
        /// Catalog track id
        track_id: u64,
        /// Requested quality tier (flac or ogg)
        #[arg(short, long)]
        quality: Option<Quality>,
        #[command(flatten)]
        media: MediaArgs,
    },
}

/// Overrides for where media and the catalog live
#[derive(Args, Debug, Default)]
pub struct MediaArgs {
    /// Directory containing audio files
    #[arg(long)]
    media_root: Option<PathBuf>,
    /// Path to the tracks.json catalog
    #[arg(long)]
    catalog: Option<PathBuf>,
}

impl MediaArgs {
    fn apply(self, config: &mut LyraConfig) {
        if let Some(root) = self.media_root {
            config.media.media_root = root;
        }
        if let Some(catalog) = self.catalog {
            config.media.catalog_path = catalog;
        }
    }
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = LyraConfig::from_env();

    match command {
        Commands::Server { host, port, media } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            media.apply(&mut config);
            start_server(config).await
        }
        Commands::Resolve {
            track_id,
            quality,
            media,
        } => {
            media.apply(&mut config);
            let quality = quality.unwrap_or(config.media.default_quality);
            resolve_track(&config, track_id, quality)
                .await
                .map_err(|e| anyhow!("{}: {e}", e.user_message()))
        }
    }
}

async fn start_server(config: LyraConfig) -> anyhow::Result<()> {
    lyra_web::run_server(config)
        .await
        .map_err(|e| anyhow!("Server failed: {e}"))
}

/// Print the file a track resolves to, or why it does not.
async fn resolve_track(
    config: &LyraConfig,
    track_id: u64,
    quality: Quality,
) -> lyra_core::Result<()> {
    debug!(
        "Resolving track {track_id} ({quality}) against {}",
        config.media.catalog_path.display()
    );

    let resolver = CatalogResolver::new(
        Arc::new(JsonFileCatalog::new(config.media.catalog_path.clone())),
        config.media.media_root.clone(),
    );

    let location = resolver.resolve(track_id, quality).await?;

    println!("Track {track_id} ({quality})");
    println!("  Path: {}", location.path.display());
    println!("  Served tier: {}", location.quality);
    println!("  Size: {} bytes", location.len);
    println!("  Content-Type: {}", location.content_type);

    Ok(())
}
