use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_NEWS_API_BASE: &str = "https://newsapi.org/v2";

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Origin allowed by CORS
    pub frontend_url: String,
    /// Without a key every fetch is served from the mock dataset
    pub news_api_key: Option<String>,
    pub news_api_base: String,
    pub request_timeout: Duration,
    /// How long a fetched page stays fresh in the cache
    pub cache_window: Duration,
    pub broadcast_interval: Duration,
    pub broadcast_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            news_api_key: None,
            news_api_base: DEFAULT_NEWS_API_BASE.to_string(),
            request_timeout: Duration::from_secs(10),
            cache_window: Duration::from_secs(5 * 60),
            broadcast_interval: Duration::from_secs(30),
            broadcast_page_size: 3,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("frontend_url", &self.frontend_url)
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "<redacted>"))
            .field("news_api_base", &self.news_api_base)
            .field("request_timeout", &self.request_timeout)
            .field("cache_window", &self.cache_window)
            .field("broadcast_interval", &self.broadcast_interval)
            .field("broadcast_page_size", &self.broadcast_page_size)
            .finish()
    }
}

/// Duration written as `30s`, `5m`, `1h15m30s` or a bare number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing number without a unit counts as seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds = total_seconds
                        .checked_add(num)
                        .ok_or_else(|| "Duration too large".to_string())?;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut secs = self.0.as_secs();
        if secs == 0 {
            return f.write_str("0s");
        }
        for (unit, size) in [("d", 86400), ("h", 3600), ("m", 60), ("s", 1)] {
            if secs >= size {
                write!(f, "{}{}", secs / size, unit)?;
                secs %= size;
            }
        }
        Ok(())
    }
}

impl From<HumanDuration> for Duration {
    fn from(value: HumanDuration) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_durations() {
        assert_eq!("30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(30));
        assert_eq!("5m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(300));
        assert_eq!(
            "1h15m30s".parse::<HumanDuration>().unwrap().0,
            Duration::from_secs(4530)
        );
        assert_eq!("45".parse::<HumanDuration>().unwrap().0, Duration::from_secs(45));
        assert!("".parse::<HumanDuration>().is_err());
        assert!("10x".parse::<HumanDuration>().is_err());
        assert!("0s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_oversized_durations_are_rejected() {
        assert_eq!(
            "999999999999999d".parse::<HumanDuration>(),
            Err("Duration too large".to_string())
        );
        assert_eq!(
            format!("{}s 1", u64::MAX).parse::<HumanDuration>(),
            Err("Duration too large".to_string())
        );
        assert!("99999999999999999999s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_display_durations() {
        assert_eq!(HumanDuration(Duration::from_secs(30)).to_string(), "30s");
        assert_eq!(HumanDuration(Duration::from_secs(300)).to_string(), "5m");
        assert_eq!(HumanDuration(Duration::from_secs(4530)).to_string(), "1h15m30s");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = AppConfig {
            news_api_key: Some("secret".to_string()),
            ..AppConfig::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
