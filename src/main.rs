use async_payment_worker::app::config::Config;
use async_payment_worker::queue::RedisPaymentQueue;
use async_payment_worker::services::{
    HealthCacheRepository, HealthCheckOrchestrator, PaymentDispatcher, PaymentHistoryService,
    PaymentProcessorClient, PaymentWorker, WorkerMetrics,
};
use async_payment_worker::store::RedisStore;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    info!(
        "Starting async payment worker, main queue {}",
        config.payments_main_queue
    );

    let store = match RedisStore::connect(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to connect to the shared store: {}", e);
            std::process::exit(1);
        }
    };

    let processor_client = match PaymentProcessorClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build the processor HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let queue = Arc::new(RedisPaymentQueue::new(
        store.clone(),
        config.payments_main_queue.clone(),
    ));
    let health_cache = Arc::new(HealthCacheRepository::new(store.clone()));
    let history = Arc::new(PaymentHistoryService::new(store.clone()));

    let dispatcher = Arc::new(PaymentDispatcher::new(
        processor_client.clone(),
        health_cache.clone(),
        queue.clone(),
        history,
        &config,
    ));

    let orchestrator = HealthCheckOrchestrator::new(store, processor_client, health_cache);
    tokio::spawn(async move {
        orchestrator.run().await;
    });

    let metrics = Arc::new(WorkerMetrics::new());
    let worker = PaymentWorker::new(queue, dispatcher, metrics, &config);

    info!(
        "Worker loop started: batch size {}, max concurrent {}",
        config.batch_size, config.max_concurrent_payments
    );
    worker.run().await;
}
