use anyhow::Context;
use clap::{Parser, ValueEnum};
use godot_delivery_builder::{EngineFlavor, ExportBuilder, GitFetcher, GodotCli};
use godot_delivery_cache::MetadataCache;
use godot_delivery_fs::PackageStorage;
use godot_delivery_server::prelude::*;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Builds godot projects from git repositories and serves their packs in rotation.
#[derive(Parser, Debug)]
#[command(name = "godot-delivery", version, about)]
struct Args {
    /// Storage root, holds `pcks/` and `cache.json`
    #[arg(long, env = "STORAGE_PATH")]
    storage_path: PathBuf,

    /// Password of the `manager` user
    #[arg(long, env = "AUTH_PW", hide_env_values = true)]
    auth_pw: String,

    /// Externally visible base URL used for download links
    #[arg(long, env = "BASE_URL")]
    base_url: String,

    /// Address to listen on
    #[arg(long, env = "WEBADDRESS", default_value = "0.0.0.0:8080")]
    address: String,

    /// Engine executable
    #[arg(long, env = "GODOT_BINARY", default_value = "godot")]
    godot_binary: PathBuf,

    /// Command line dialect of the engine executable
    #[arg(long, env = "GODOT_FLAVOR", value_enum, default_value_t = Flavor::Godot3)]
    godot_flavor: Flavor,

    /// Git executable
    #[arg(long, env = "GIT_BINARY", default_value = "git")]
    git_binary: PathBuf,

    /// Scratch directory for cloned projects, wiped on every build
    #[arg(long, env = "WORKSPACE_PATH", default_value = "/tmp/godot-delivery")]
    workspace: PathBuf,

    /// Seconds a clone may take
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 600)]
    fetch_timeout: u64,

    /// Seconds each engine invocation may take
    #[arg(long, env = "EXPORT_TIMEOUT_SECS", default_value_t = 900)]
    export_timeout: u64,

    /// Platforms served by next-game
    #[arg(
        long,
        env = "PLATFORMS",
        value_delimiter = ',',
        default_value = "linuxx11,windowsdesktop"
    )]
    platforms: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Flavor {
    Godot3,
    Godot4,
}

impl From<Flavor> for EngineFlavor {
    fn from(flavor: Flavor) -> Self {
        match flavor {
            Flavor::Godot3 => EngineFlavor::Godot3,
            Flavor::Godot4 => EngineFlavor::Godot4,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let storage = PackageStorage::new(&args.storage_path);
    storage
        .ensure_layout()
        .await
        .with_context(|| format!("failed to create {}", storage.pcks_dir().display()))?;

    let cache = MetadataCache::restore(storage.cache_file()).await;

    let builder = ExportBuilder::new(
        GitFetcher::new(&args.git_binary, Duration::from_secs(args.fetch_timeout)),
        GodotCli::new(
            &args.godot_binary,
            args.godot_flavor.into(),
            Duration::from_secs(args.export_timeout),
        ),
        storage.clone(),
        &args.workspace,
    );

    let config = DeliveryServerConfig::new(args.auth_pw, args.base_url, storage.pcks_dir())
        .with_platforms(&args.platforms);
    let app = DeliveryServer::new(config).build(builder, cache.clone());

    let listener = tokio::net::TcpListener::bind(&args.address)
        .await
        .with_context(|| format!("failed to bind {}", args.address))?;
    info!("Server listening on http://{}", args.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutting down");
    cache.persist().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_flags() {
        let args = Args::try_parse_from([
            "godot-delivery",
            "--storage-path",
            "/srv/delivery",
            "--auth-pw",
            "pw",
            "--base-url",
            "https://games.example.com/",
            "--godot-flavor",
            "godot4",
            "--platforms",
            "linuxx11,html5",
        ])
        .unwrap();

        assert_eq!(args.storage_path, PathBuf::from("/srv/delivery"));
        assert!(matches!(args.godot_flavor, Flavor::Godot4));
        assert_eq!(args.platforms, ["linuxx11", "html5"]);
        assert_eq!(args.fetch_timeout, 600);
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
