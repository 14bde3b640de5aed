pub mod dispatcher;
pub mod health_cache;
pub mod health_orchestrator;
pub mod payment_history;
pub mod processor_client;
pub mod worker;
pub mod worker_metrics;

pub use dispatcher::{PaymentDispatcher, ProcessPayment};
pub use health_cache::{HealthCacheRepository, HealthStore};
pub use health_orchestrator::HealthCheckOrchestrator;
pub use payment_history::{HistorySink, PaymentHistoryService};
pub use processor_client::{PaymentProcessorClient, ProcessorPort, SubmitOutcome};
pub use worker::PaymentWorker;
pub use worker_metrics::WorkerMetrics;
