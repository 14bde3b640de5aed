use crate::models::{Payment, PaymentProcessorType};
use crate::store::RedisStore;
use async_trait::async_trait;
use tracing::{debug, error};

const HISTORY_KEY_PREFIX: &str = "payments:history:";

#[async_trait]
pub trait HistorySink: Send + Sync {
    /// Registra um pagamento aceito na lista de histórico do processador.
    /// Nunca propaga falha: o pagamento já foi aceito pelo processador.
    async fn record(&self, payment: &Payment);
}

pub struct PaymentHistoryService {
    store: RedisStore,
}

impl PaymentHistoryService {
    pub fn new(store: RedisStore) -> Self {
        Self { store }
    }

    fn history_key(processor_type: PaymentProcessorType) -> String {
        format!("{}{}", HISTORY_KEY_PREFIX, processor_type.as_str())
    }
}

#[async_trait]
impl HistorySink for PaymentHistoryService {
    async fn record(&self, payment: &Payment) {
        let Some(processor_type) = payment.payment_processor_type else {
            error!(
                "Refusing to record payment {} without a processor type",
                payment.correlation_id
            );
            return;
        };

        let json = match serde_json::to_string(payment) {
            Ok(json) => json,
            Err(e) => {
                error!(
                    "Failed to serialize payment {} for history: {}",
                    payment.correlation_id, e
                );
                return;
            }
        };

        let key = Self::history_key(processor_type);
        match self.store.list_push_head(&key, &json).await {
            Ok(()) => debug!(
                "Recorded payment {} in {} history",
                payment.correlation_id,
                processor_type.as_str()
            ),
            Err(e) => error!(
                "Failed to record payment {} in {} history: {}",
                payment.correlation_id,
                processor_type.as_str(),
                e
            ),
        }
    }
}
