use crate::models::{HealthStatus, PaymentProcessorType};
use crate::store::RedisStore;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, warn};

const HEALTH_CACHE_KEY_PREFIX: &str = "payment_processor_health:";

// Ligeiramente menor que o intervalo de probe: sem líder vivo a visão expira
pub const HEALTH_CACHE_TTL: Duration = Duration::from_millis(4900);

#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Visão corrente do processador; `None` significa "sem opinião fresca".
    async fn get(&self, processor_type: PaymentProcessorType) -> Option<HealthStatus>;
    async fn save(&self, processor_type: PaymentProcessorType, status: &HealthStatus);
    async fn remove(&self, processor_type: PaymentProcessorType);
}

pub struct HealthCacheRepository {
    store: RedisStore,
}

impl HealthCacheRepository {
    pub fn new(store: RedisStore) -> Self {
        Self { store }
    }

    fn cache_key(processor_type: PaymentProcessorType) -> String {
        format!("{}{}", HEALTH_CACHE_KEY_PREFIX, processor_type.as_str())
    }
}

#[async_trait]
impl HealthStore for HealthCacheRepository {
    async fn get(&self, processor_type: PaymentProcessorType) -> Option<HealthStatus> {
        let key = Self::cache_key(processor_type);
        let raw = match self.store.get_string(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!(
                    "Failed to read health cache for {} processor: {}",
                    processor_type.as_str(),
                    e
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(
                    "Removing corrupted health cache entry for {} processor: {}",
                    processor_type.as_str(),
                    e
                );
                self.remove(processor_type).await;
                None
            }
        }
    }

    async fn save(&self, processor_type: PaymentProcessorType, status: &HealthStatus) {
        let json = match serde_json::to_string(status) {
            Ok(json) => json,
            Err(e) => {
                warn!(
                    "Failed to serialize health status for {} processor: {}",
                    processor_type.as_str(),
                    e
                );
                return;
            }
        };

        let key = Self::cache_key(processor_type);
        if let Err(e) = self.store.set_string_with_ttl(&key, &json, HEALTH_CACHE_TTL).await {
            error!(
                "Failed to save health status for {} processor: {}",
                processor_type.as_str(),
                e
            );
        }
    }

    async fn remove(&self, processor_type: PaymentProcessorType) {
        let key = Self::cache_key(processor_type);
        if let Err(e) = self.store.delete(&key).await {
            error!(
                "Failed to remove health cache entry for {} processor: {}",
                processor_type.as_str(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys() {
        assert_eq!(
            HealthCacheRepository::cache_key(PaymentProcessorType::Default),
            "payment_processor_health:default"
        );
        assert_eq!(
            HealthCacheRepository::cache_key(PaymentProcessorType::Fallback),
            "payment_processor_health:fallback"
        );
    }
}
