use std::sync::Once;
use std::collections::VecDeque;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Tags every message with a chain of component prefixes.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            prefixes: VecDeque::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push_back(prefix.into());
        self
    }

    fn prefixed(&self, message: &str) -> String {
        let prefix = self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>();
        format!("{}{}", prefix, message)
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.prefixed(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", self.prefixed(message));
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", self.prefixed(message));
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.prefixed(message));
    }
}

/// Install the global fmt subscriber once. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_logging() -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .try_init();
        });
    }
    Logger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_chain() {
        let logger = Logger::new().with_prefix("[a]").with_prefix("[b]");
        assert_eq!(logger.prefixed("hello"), "[a] [b] hello");
        assert_eq!(Logger::new().prefixed("hello"), "hello");
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging().info("first");
        init_logging().info("second");
    }
}
