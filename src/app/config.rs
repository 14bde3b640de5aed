use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u8,
    pub redis_timeout_ms: u64,
    pub default_processor_url: String,
    pub fallback_processor_url: String,
    pub payments_main_queue: String,
    pub max_concurrent_payments: u64,
    pub batch_size: u64,
    pub execution_delay_ms: u64,
    pub max_retry_attempts: u32,
    pub max_reenqueue_count: u32,
    pub assume_healthy_when_unknown: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            redis_host: env::var("REDIS_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            redis_port: env::var("REDIS_PORT")
                .unwrap_or_else(|_| "6379".to_string())
                .parse()
                .unwrap_or(6379),
            redis_db: env::var("REDIS_DB")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),
            redis_timeout_ms: env::var("REDIS_TIMEOUT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            default_processor_url: env::var("PAYMENT_PROCESSOR_DEFAULT_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            fallback_processor_url: env::var("PAYMENT_PROCESSOR_FALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),
            payments_main_queue: env::var("REDIS_QUEUE_PAYMENTS_MAIN")
                .unwrap_or_else(|_| "rinha-payments-main-queue".to_string()),
            max_concurrent_payments: env::var("WORKER_MAX_CONCURRENT_PAYMENTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            batch_size: env::var("WORKER_BATCH_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            execution_delay_ms: env::var("WORKER_EXECUTION_DELAY")
                .unwrap_or_else(|_| "200".to_string())
                .parse()
                .unwrap_or(200),
            max_retry_attempts: env::var("WORKER_MAX_RETRY_ATTEMPTS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .unwrap_or(2),
            max_reenqueue_count: env::var("WORKER_MAX_REENQUEUE_COUNT")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            assume_healthy_when_unknown: env::var("WORKER_ASSUME_HEALTHY_WHEN_UNKNOWN")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        }
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.redis_host, self.redis_port, self.redis_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_url() {
        let mut config = Config::from_env();
        config.redis_host = "cache".to_string();
        config.redis_port = 6380;
        config.redis_db = 2;
        assert_eq!(config.redis_url(), "redis://cache:6380/2");
    }
}
