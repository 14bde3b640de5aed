mod lease;

pub use lease::LeaseHandle;

use crate::app::config::Config;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

// Prefixo do registro de locks distribuídos (compartilhado com as demais instâncias)
const LOCK_REGISTRY_PREFIX: &str = "healthcheck-leader-lock-registry";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation timed out")]
    Timeout,
    #[error("store transport error: {0}")]
    Transport(#[from] redis::RedisError),
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Cliente fino sobre o data store compartilhado: listas, chaves com TTL,
/// hashes e lease distribuído. Todas as operações respeitam o timeout
/// configurado.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisStore {
    /// Conecta e valida a conexão com um PING. Falha aqui derruba o bootstrap.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.redis_url())?;
        let conn = ConnectionManager::new(client).await?;
        let store = Self {
            conn,
            op_timeout: Duration::from_millis(config.redis_timeout_ms),
        };

        let mut ping = redis::cmd("PING");
        ping.arg("async-payment-worker");
        let _: String = store.run(ping).await?;
        Ok(store)
    }

    async fn run<T: redis::FromRedisValue>(&self, cmd: redis::Cmd) -> Result<T, StoreError> {
        self.run_with_deadline(cmd, self.op_timeout).await
    }

    async fn run_with_deadline<T: redis::FromRedisValue>(
        &self,
        cmd: redis::Cmd,
        deadline: Duration,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn.clone();
        match tokio::time::timeout(deadline, cmd.query_async(&mut conn)).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    pub async fn list_push_head(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("LPUSH");
        cmd.arg(key).arg(value);
        self.run(cmd).await
    }

    pub async fn list_pop_tail(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut cmd = redis::cmd("RPOP");
        cmd.arg(key);
        self.run(cmd).await
    }

    /// BRPOP com espera curta. Expirar a espera não é erro: retorna `None`.
    pub async fn list_pop_tail_blocking(
        &self,
        key: &str,
        wait: Duration,
    ) -> Result<Option<String>, StoreError> {
        let mut cmd = redis::cmd("BRPOP");
        cmd.arg(key).arg(wait.as_secs_f64());
        let popped: Option<(String, String)> =
            self.run_with_deadline(cmd, self.op_timeout + wait).await?;
        Ok(popped.map(|(_, value)| value))
    }

    pub async fn list_len(&self, key: &str) -> Result<u64, StoreError> {
        let mut cmd = redis::cmd("LLEN");
        cmd.arg(key);
        self.run(cmd).await
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.run(cmd).await
    }

    pub async fn set_string_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("PX").arg(ttl.as_millis() as u64);
        self.run(cmd).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        self.run(cmd).await
    }

    pub async fn hash_incr_int(
        &self,
        key: &str,
        field: &str,
        delta: i64,
    ) -> Result<i64, StoreError> {
        let mut cmd = redis::cmd("HINCRBY");
        cmd.arg(key).arg(field).arg(delta);
        self.run(cmd).await
    }

    pub async fn hash_incr_float(
        &self,
        key: &str,
        field: &str,
        delta: f64,
    ) -> Result<f64, StoreError> {
        let mut cmd = redis::cmd("HINCRBYFLOAT");
        cmd.arg(key).arg(field).arg(delta);
        self.run(cmd).await
    }

    pub async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut cmd = redis::cmd("HGETALL");
        cmd.arg(key);
        self.run(cmd).await
    }

    /// Tenta adquirir o lease nomeado via SET NX PX. `None` significa que
    /// outra instância já é a dona.
    pub async fn try_acquire_lease(
        &self,
        name: &str,
        ttl: Duration,
    ) -> Result<Option<LeaseHandle>, StoreError> {
        let key = format!("{}:{}", LOCK_REGISTRY_PREFIX, name);
        let token = Uuid::new_v4().to_string();

        let mut cmd = redis::cmd("SET");
        cmd.arg(&key)
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64);
        let acquired: Option<String> = self.run(cmd).await?;

        Ok(acquired.map(|_| LeaseHandle::new(self.conn.clone(), key, token)))
    }
}
