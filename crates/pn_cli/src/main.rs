use clap::Parser;
use pn_core::config::{DEFAULT_FRONTEND_URL, DEFAULT_NEWS_API_BASE, DEFAULT_PORT};
use pn_core::logging::init_logging;
use pn_core::{AppConfig, ArticleStore, HumanDuration, NewsQuery, NewsQueryParams};
use pn_feeds::{FetchCoordinator, NewsApiSource};
use pn_realtime::{BroadcastConfig, BroadcastScheduler, SubscriptionRegistry};
use pn_web::{create_app, AppState};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "memory")]
    storage: String,
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Origin allowed to call the API from a browser
    #[arg(long, env = "FRONTEND_URL", default_value = DEFAULT_FRONTEND_URL)]
    frontend_url: String,
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    news_api_key: Option<String>,
    #[arg(long, env = "NEWS_API_BASE", default_value = DEFAULT_NEWS_API_BASE)]
    news_api_base: String,
    /// How long fetched pages stay fresh (e.g. 30s, 5m, 1h)
    #[arg(long, default_value = "5m")]
    cache_window: HumanDuration,
    #[arg(long, default_value = "10s")]
    request_timeout: HumanDuration,
    /// Time between news pushes to subscribed clients
    #[arg(long, default_value = "30s")]
    broadcast_interval: HumanDuration,
    /// Articles per broadcast (1-100)
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=100))]
    broadcast_size: u32,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP and WebSocket server (default)
    Serve,
    /// Fetch one page of news and print it as JSON
    Fetch {
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        page_size: Option<String>,
    },
}

impl Cli {
    fn config(&self) -> AppConfig {
        AppConfig {
            port: self.port,
            frontend_url: self.frontend_url.clone(),
            news_api_key: self.news_api_key.clone(),
            news_api_base: self.news_api_base.clone(),
            request_timeout: self.request_timeout.into(),
            cache_window: self.cache_window.into(),
            broadcast_interval: self.broadcast_interval.into(),
            broadcast_page_size: self.broadcast_size,
        }
    }
}

async fn build_coordinator(config: &AppConfig, storage: &str) -> anyhow::Result<FetchCoordinator> {
    let store: Arc<dyn ArticleStore> = pn_storage::create_storage(storage).await?;
    info!("💾 Checking storage connection...");
    let saved = store.count().await?;
    info!("✨ Storage initialized successfully (using {}, {} saved)", storage, saved);

    let source = NewsApiSource::from_config(config)?;
    if !source.has_api_key() {
        warn!("⚠️ NEWS_API_KEY is not set, serving mock news");
    }
    Ok(FetchCoordinator::new(Arc::new(source), store, config.cache_window))
}

async fn serve(config: AppConfig, coordinator: FetchCoordinator) -> anyhow::Result<()> {
    let coordinator = Arc::new(coordinator);
    let registry = Arc::new(SubscriptionRegistry::new());
    let broadcast = BroadcastConfig::try_from(&config)?;

    let scheduler = BroadcastScheduler::new(coordinator.clone(), registry.clone(), broadcast)?;
    let handle = scheduler.spawn();
    info!(
        "📡 Broadcasting {} articles every {}",
        broadcast.page_size,
        HumanDuration(broadcast.interval)
    );

    let app = create_app(AppState::new(coordinator, registry, broadcast), &config.frontend_url);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("🚀 Server running on port {}", config.port);
    info!("🔌 WebSocket server ready at /ws");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    handle.stop().await?;
    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = cli.config();
    let coordinator = build_coordinator(&config, &cli.storage).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, coordinator).await?,
        Commands::Fetch { q, category, country, page, page_size } => {
            let query = NewsQuery::try_from(NewsQueryParams {
                q,
                category,
                country,
                page,
                page_size,
            })?;
            info!("📰 Fetching {}", query.cache_key());
            let news = coordinator.fetch(&query).await?;
            println!("{}", serde_json::to_string_pretty(&news)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pn"]).unwrap();
        let config = cli.config();
        assert_eq!(config.broadcast_page_size, 3);
        assert_eq!(config.cache_window, std::time::Duration::from_secs(300));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_broadcast_size_is_bounded() {
        for size in ["0", "101", "150"] {
            let parsed = Cli::try_parse_from(["pn", "--broadcast-size", size]);
            assert!(parsed.is_err(), "{}", size);
        }
        let cli = Cli::try_parse_from(["pn", "--broadcast-size", "100"]).unwrap();
        assert_eq!(cli.config().broadcast_page_size, 100);
    }
}
