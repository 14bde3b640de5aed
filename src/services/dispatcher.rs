use crate::app::config::Config;
use crate::models::{Payment, PaymentProcessorType, PaymentStatus};
use crate::queue::PaymentPublisher;
use crate::services::health_cache::HealthStore;
use crate::services::payment_history::HistorySink;
use crate::services::processor_client::{ProcessorPort, SubmitOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Seam entre o worker e o motor de dispatch.
#[async_trait]
pub trait ProcessPayment: Send + Sync {
    /// Retorna true quando algum processador aceitou o pagamento.
    async fn process(&self, payment: Payment) -> bool;
}

/// Motor de dispatch: escolhe o processador pela visão de saúde em cache,
/// submete e trata sucesso ou reenfileiramento.
pub struct PaymentDispatcher {
    processor: Arc<dyn ProcessorPort>,
    health: Arc<dyn HealthStore>,
    publisher: Arc<dyn PaymentPublisher>,
    history: Arc<dyn HistorySink>,
    max_retry_attempts: u32,
    max_reenqueue_count: u32,
    assume_healthy_when_unknown: bool,
}

impl PaymentDispatcher {
    pub fn new(
        processor: Arc<dyn ProcessorPort>,
        health: Arc<dyn HealthStore>,
        publisher: Arc<dyn PaymentPublisher>,
        history: Arc<dyn HistorySink>,
        config: &Config,
    ) -> Self {
        Self {
            processor,
            health,
            publisher,
            history,
            max_retry_attempts: config.max_retry_attempts,
            max_reenqueue_count: config.max_reenqueue_count,
            assume_healthy_when_unknown: config.assume_healthy_when_unknown,
        }
    }

    async fn attempt_processing(&self, payment: &mut Payment) -> bool {
        for attempt in 1..=self.max_retry_attempts {
            // Default primeiro (menor taxa), fallback na sequência
            for processor_type in PaymentProcessorType::ALL {
                if !self.is_processor_healthy(processor_type).await {
                    debug!(
                        "Skipping {} processor for payment {}: no healthy view",
                        processor_type.as_str(),
                        payment.correlation_id
                    );
                    continue;
                }

                let outcome = self.processor.submit(payment, processor_type).await;
                if outcome.is_accepted() {
                    if outcome == SubmitOutcome::AlreadyProcessed {
                        debug!(
                            "Payment {} had already been accepted by the {} processor",
                            payment.correlation_id,
                            processor_type.as_str()
                        );
                    }
                    payment.payment_processor_type = Some(processor_type);
                    return true;
                }

                warn!(
                    "Attempt {}/{} with {} processor rejected payment {}",
                    attempt,
                    self.max_retry_attempts,
                    processor_type.as_str(),
                    payment.correlation_id
                );
            }
        }
        false
    }

    async fn is_processor_healthy(&self, processor_type: PaymentProcessorType) -> bool {
        match self.health.get(processor_type).await {
            Some(status) => status.is_healthy(),
            None => self.assume_healthy_when_unknown,
        }
    }

    async fn handle_failure(&self, mut payment: Payment) {
        payment.retry_count += 1;

        if payment.retry_count <= self.max_reenqueue_count {
            payment.status = PaymentStatus::Retry;
            if let Err(e) = self.publisher.publish(&payment).await {
                // Sem serialização não há retry possível: o pagamento é perdido
                error!(
                    "Failed to re-enqueue payment {}: {}",
                    payment.correlation_id, e
                );
            }
        } else {
            payment.status = PaymentStatus::Failed;
            warn!(
                "Payment {} exhausted {} re-enqueues, marking as failed",
                payment.correlation_id, self.max_reenqueue_count
            );
        }
    }
}

#[async_trait]
impl ProcessPayment for PaymentDispatcher {
    async fn process(&self, mut payment: Payment) -> bool {
        payment.status = PaymentStatus::Processing;

        if self.attempt_processing(&mut payment).await {
            payment.status = PaymentStatus::Success;
            self.history.record(&payment).await;
            info!(
                "Payment {} processed successfully by {} processor",
                payment.correlation_id,
                payment
                    .payment_processor_type
                    .map(|t| t.as_str())
                    .unwrap_or("unknown")
            );
            true
        } else {
            self.handle_failure(payment).await;
            false
        }
    }
}
