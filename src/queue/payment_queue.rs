use crate::models::Payment;
use crate::store::{RedisStore, StoreError};
use async_trait::async_trait;
use std::time::Duration;

/// Capacidade de publicação usada pelo motor de dispatch para reenfileirar
/// falhas. Mantém o grafo de dependências acíclico: o motor não conhece a
/// fila, só esta capacidade.
#[async_trait]
pub trait PaymentPublisher: Send + Sync {
    async fn publish(&self, payment: &Payment) -> Result<(), StoreError>;
}

/// Lado de consumo da fila principal, usado pelo worker.
#[async_trait]
pub trait PaymentQueue: PaymentPublisher {
    /// BRPOP com espera curta; expirar a espera retorna `None`.
    async fn pop_tail_blocking(&self, wait: Duration) -> Result<Option<String>, StoreError>;
    async fn try_pop_tail(&self) -> Result<Option<String>, StoreError>;
    async fn len(&self) -> Result<u64, StoreError>;
}

pub struct RedisPaymentQueue {
    store: RedisStore,
    queue_key: String,
}

impl RedisPaymentQueue {
    pub fn new(store: RedisStore, queue_key: String) -> Self {
        Self { store, queue_key }
    }
}

#[async_trait]
impl PaymentPublisher for RedisPaymentQueue {
    async fn publish(&self, payment: &Payment) -> Result<(), StoreError> {
        let payload = serde_json::to_string(payment)?;
        self.store.list_push_head(&self.queue_key, &payload).await
    }
}

#[async_trait]
impl PaymentQueue for RedisPaymentQueue {
    async fn pop_tail_blocking(&self, wait: Duration) -> Result<Option<String>, StoreError> {
        self.store.list_pop_tail_blocking(&self.queue_key, wait).await
    }

    async fn try_pop_tail(&self) -> Result<Option<String>, StoreError> {
        self.store.list_pop_tail(&self.queue_key).await
    }

    async fn len(&self) -> Result<u64, StoreError> {
        self.store.list_len(&self.queue_key).await
    }
}
