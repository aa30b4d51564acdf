use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::worker::limits::TimeLimits;

/// How long a task may stay `processing` past the hard limit before a read
/// reports it lost.
const STALE_TASK_GRACE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Sled,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "sled" => Ok(StoreBackend::Sled),
            _ => Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub store_backend: StoreBackend,
    pub redis_url: String,
    pub sled_path: String,
    pub cache_ttl: Duration,
    pub task_result_ttl: Duration,
    pub task_pending_timeout: Duration,
    pub time_limits: TimeLimits,
    pub worker_concurrency: usize,
    pub queue_name: String,
    pub consumer_id: String,
    pub poll_interval: Duration,
    pub max_text_length: usize,
    pub rate_limit_requests: usize,
    pub rate_limit_window: Duration,
    pub server_domain: String,
    pub embedded_workers: bool,
}

impl Config {
    /// Reads the configuration from the environment, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store_backend: StoreBackend = env_or("STORE_BACKEND", "redis").parse()?;

        let time_limits = TimeLimits::new(
            Duration::from_secs(parse_env("TASK_SOFT_TIME_LIMIT", 240)?),
            Duration::from_secs(parse_env("TASK_TIME_LIMIT", 300)?),
        );
        if time_limits.soft >= time_limits.hard {
            return Err(ConfigError::Invalid {
                name: "TASK_SOFT_TIME_LIMIT",
                value: format!(
                    "{} (must be below TASK_TIME_LIMIT {})",
                    time_limits.soft.as_secs(),
                    time_limits.hard.as_secs()
                ),
            });
        }

        let worker_concurrency = parse_env("WORKER_CONCURRENCY", 4usize)?;
        if worker_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "WORKER_CONCURRENCY",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty()),
            store_backend,
            redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            sled_path: env_or("SLED_PATH", "precis_db"),
            cache_ttl: Duration::from_secs(parse_env("CACHE_TTL", 3600)?),
            task_result_ttl: Duration::from_secs(parse_env("TASK_RESULT_TTL", 86_400)?),
            task_pending_timeout: Duration::from_secs(parse_env("TASK_PENDING_TIMEOUT", 3600)?),
            time_limits,
            worker_concurrency,
            queue_name: env_or("QUEUE_NAME", "summarize"),
            consumer_id: env_or("CONSUMER_ID", "consumer"),
            poll_interval: Duration::from_millis(parse_env("POLL_INTERVAL_MS", 1000)?),
            max_text_length: parse_env("MAX_TEXT_LENGTH", 10_000)?,
            rate_limit_requests: parse_env("RATE_LIMIT_REQUESTS", 100)?,
            rate_limit_window: Duration::from_secs(parse_env("RATE_LIMIT_WINDOW", 3600)?),
            server_domain: env_or("SERVER_DOMAIN", "0.0.0.0:8000"),
            // The sled database is locked to one process, so its queue must be too.
            embedded_workers: store_backend == StoreBackend::Sled
                || parse_env("EMBEDDED_WORKERS", false)?,
        })
    }

    pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }

    pub fn stale_task_after(&self) -> Duration {
        self.time_limits.hard + STALE_TASK_GRACE
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
