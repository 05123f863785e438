use std::sync::Arc;
use std::time::Duration;

use pn_core::logging::Logger;
use pn_core::models::MAX_PAGE_SIZE;
use pn_core::{AppConfig, Article, Error, Result};
use pn_feeds::FetchCoordinator;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::events::{ServerEvent, NEWS_CHANNEL};
use crate::registry::SubscriptionRegistry;

#[derive(Debug, Clone, Copy)]
pub struct BroadcastConfig {
    pub interval: Duration,
    pub page_size: u32,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            page_size: 3,
        }
    }
}

impl BroadcastConfig {
    /// Rejects settings that would make every tick fail or spin.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::Validation(
                "broadcast interval must be greater than zero".to_string(),
            ));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::Validation(format!(
                "broadcast page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }
}

impl TryFrom<&AppConfig> for BroadcastConfig {
    type Error = Error;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let broadcast = Self {
            interval: config.broadcast_interval,
            page_size: config.broadcast_page_size,
        };
        broadcast.validate()?;
        Ok(broadcast)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nobody is listening, nothing was fetched
    NoSubscribers,
    NoArticles,
    Emitted { subscribers: usize, articles: usize },
}

/// Periodically pushes the latest political news to the news channel.
#[derive(Clone)]
pub struct BroadcastScheduler {
    coordinator: Arc<FetchCoordinator>,
    registry: Arc<SubscriptionRegistry>,
    config: BroadcastConfig,
    logger: Logger,
}

impl BroadcastScheduler {
    pub fn new(
        coordinator: Arc<FetchCoordinator>,
        registry: Arc<SubscriptionRegistry>,
        config: BroadcastConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            coordinator,
            registry,
            config,
            logger: Logger::new().with_prefix("📡 [broadcast]"),
        })
    }

    pub fn config(&self) -> BroadcastConfig {
        self.config
    }

    /// One scheduler cycle: fetch through the coordinator and emit a
    /// `news:update` if anyone is subscribed and anything came back.
    pub async fn tick(&self) -> Result<TickOutcome> {
        if self.registry.subscriber_count(NEWS_CHANNEL) == 0 {
            return Ok(TickOutcome::NoSubscribers);
        }

        let news = self.coordinator.political(1, self.config.page_size).await?;
        if news.articles.is_empty() {
            return Ok(TickOutcome::NoArticles);
        }

        let articles = news.articles.len();
        let subscribers = self.registry.emit(NEWS_CHANNEL, &ServerEvent::update(news.articles));
        Ok(TickOutcome::Emitted { subscribers, articles })
    }

    /// Push a single article to the news channel right away.
    pub fn push_breaking(&self, article: Article) -> usize {
        let title = article.title.clone();
        let delivered = self.registry.emit(NEWS_CHANNEL, &ServerEvent::breaking(article));
        self.logger
            .info(&format!("🚨 Breaking news pushed to {} subscribers: {}", delivered, title));
        delivered
    }

    /// Run `tick` every interval until the handle is stopped. The first tick
    /// fires one full interval after spawning. A failing tick is logged and
    /// the loop carries on.
    pub fn spawn(&self) -> SchedulerHandle {
        let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
        let this = self.clone();

        let join = tokio::spawn(async move {
            let period = this.config.interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            this.logger
                .info(&format!("Broadcasting news updates every {}s", period.as_secs()));

            loop {
                tokio::select! {
                    _ = cancel_rx.recv() => {
                        this.logger.info("Scheduler shutdown requested");
                        break;
                    }
                    _ = ticker.tick() => {
                        match this.tick().await {
                            Ok(TickOutcome::Emitted { subscribers, articles }) => {
                                this.logger.info(&format!(
                                    "Broadcasted {} articles to {} subscribers",
                                    articles, subscribers
                                ));
                            }
                            Ok(TickOutcome::NoArticles) => this.logger.warn("No articles to broadcast"),
                            Ok(TickOutcome::NoSubscribers) => this.logger.debug("No subscribers, tick skipped"),
                            Err(e) => this.logger.error(&format!("Error fetching news for broadcast: {}", e)),
                        }
                    }
                }
            }
        });

        SchedulerHandle { cancel_tx, join }
    }
}

pub struct SchedulerHandle {
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub async fn stop(self) -> Result<()> {
        let _ = self.cancel_tx.send(());
        self.join.await.map_err(|e| Error::External(e.into()))
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
