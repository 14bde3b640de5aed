use crate::app::config::Config;
use crate::models::Payment;
use crate::queue::PaymentQueue;
use crate::services::dispatcher::ProcessPayment;
use crate::services::worker_metrics::WorkerMetrics;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

// Bloqueio curto só no primeiro pop do tick, para reduzir polling ocioso
const FIRST_POP_WAIT: Duration = Duration::from_millis(100);

/// Consumer da fila principal: a cada tick puxa um lote limitado pelos slots
/// livres e despacha cada mensagem numa task leve.
pub struct PaymentWorker {
    queue: Arc<dyn PaymentQueue>,
    dispatcher: Arc<dyn ProcessPayment>,
    metrics: Arc<WorkerMetrics>,
    max_concurrent_payments: u64,
    batch_size: u64,
    execution_delay: Duration,
}

impl PaymentWorker {
    pub fn new(
        queue: Arc<dyn PaymentQueue>,
        dispatcher: Arc<dyn ProcessPayment>,
        metrics: Arc<WorkerMetrics>,
        config: &Config,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            metrics,
            max_concurrent_payments: config.max_concurrent_payments,
            batch_size: config.batch_size,
            execution_delay: Duration::from_millis(config.execution_delay_ms),
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.execution_delay);
        loop {
            interval.tick().await;
            self.run_tick().await;
        }
    }

    /// Um tick do consumer, exposto para os testes exercitarem o algoritmo.
    pub async fn run_tick(&self) {
        let available_slots = self
            .max_concurrent_payments
            .saturating_sub(self.metrics.active());
        if available_slots == 0 {
            return;
        }
        let current_batch = self.batch_size.min(available_slots);

        let first = match self.queue.pop_tail_blocking(FIRST_POP_WAIT).await {
            Ok(Some(message)) => message,
            Ok(None) => return,
            Err(e) => {
                // Nada foi perdido: o pop não chegou a remover a mensagem
                error!("Failed to pop from the payment queue: {}", e);
                return;
            }
        };
        self.metrics.batch_tick();
        self.submit(first);

        for _ in 1..current_batch {
            match self.queue.try_pop_tail().await {
                Ok(Some(message)) => self.submit(message),
                // Fila vazia, encerra o lote
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to drain the payment queue: {}", e);
                    break;
                }
            }
        }

        if let Ok(depth) = self.queue.len().await {
            debug!("Queue depth after tick: {}", depth);
        }
    }

    fn submit(&self, message: String) {
        self.metrics.task_started();
        let dispatcher = Arc::clone(&self.dispatcher);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            let accepted = match serde_json::from_str::<Payment>(&message) {
                Ok(payment) => dispatcher.process(payment).await,
                Err(e) => {
                    // Mensagem malformada não tem retry que faça sentido
                    error!("Dropping malformed payment message: {}", e);
                    false
                }
            };
            metrics.task_finished(accepted);
        });
    }
}
