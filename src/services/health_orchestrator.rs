use crate::models::PaymentProcessorType;
use crate::services::health_cache::HealthStore;
use crate::services::processor_client::ProcessorPort;
use crate::store::RedisStore;
use futures::future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

// Abaixo de 5s o processador devolve 429 e o probe não traz informação
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_millis(4998);
const LEADER_LEASE_NAME: &str = "global-health-check-leader-task";
// Cobre o pior ciclo de probe (~5s) com folga para failover
const LEADER_LEASE_TTL: Duration = Duration::from_secs(12);
const PROBE_JOIN_DEADLINE: Duration = Duration::from_secs(5);

/// Probe periódico dos dois processadores, executado apenas pela instância
/// que detém o lease de líder naquele intervalo.
pub struct HealthCheckOrchestrator {
    store: RedisStore,
    processor: Arc<dyn ProcessorPort>,
    cache: Arc<dyn HealthStore>,
}

impl HealthCheckOrchestrator {
    pub fn new(
        store: RedisStore,
        processor: Arc<dyn ProcessorPort>,
        cache: Arc<dyn HealthStore>,
    ) -> Self {
        Self {
            store,
            processor,
            cache,
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(HEALTH_CHECK_INTERVAL);
        loop {
            interval.tick().await;
            self.run_tick().await;
        }
    }

    pub async fn run_tick(&self) {
        let lease = match self
            .store
            .try_acquire_lease(LEADER_LEASE_NAME, LEADER_LEASE_TTL)
            .await
        {
            Ok(Some(lease)) => lease,
            Ok(None) => {
                debug!("Another instance leads the health check, skipping probe");
                return;
            }
            Err(e) => {
                warn!("Failed to contend for the health check lease: {}", e);
                return;
            }
        };

        info!("Acquired health check leadership, probing processors");

        let probes = future::join(
            self.refresh(PaymentProcessorType::Default),
            self.refresh(PaymentProcessorType::Fallback),
        );
        if tokio::time::timeout(PROBE_JOIN_DEADLINE, probes).await.is_err() {
            warn!(
                "Health probes exceeded the {}s join deadline",
                PROBE_JOIN_DEADLINE.as_secs()
            );
        }

        lease.release().await;
    }

    /// Atualiza a visão em cache de um processador a partir de um probe.
    pub async fn refresh(&self, processor_type: PaymentProcessorType) {
        match self.processor.probe(processor_type).await {
            Some(status) => self.cache.save(processor_type, &status).await,
            None => {
                warn!(
                    "No health status available for {} processor, clearing cached view",
                    processor_type.as_str()
                );
                self.cache.remove(processor_type).await;
            }
        }
    }
}
