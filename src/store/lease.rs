use redis::aio::ConnectionManager;
use tracing::{debug, warn};

/// Posse de um lease distribuído. Liberar explicitamente com `release`;
/// se o handle vazar, o `Drop` dispara uma liberação de melhor esforço.
pub struct LeaseHandle {
    conn: ConnectionManager,
    key: String,
    token: String,
    released: bool,
}

impl LeaseHandle {
    pub(crate) fn new(conn: ConnectionManager, key: String, token: String) -> Self {
        Self {
            conn,
            key,
            token,
            released: false,
        }
    }

    pub async fn release(mut self) {
        self.released = true;
        let mut conn = self.conn.clone();

        // DEL somente se o token ainda for nosso; o TTL cobre o caso contrário
        match delete_if_owner(&mut conn, &self.key, &self.token).await {
            Ok(true) => debug!("Released lease {}", self.key),
            Ok(false) => debug!("Lease {} already expired or taken over", self.key),
            Err(e) => warn!("Failed to release lease {}: {}", self.key, e),
        }
    }
}

impl Drop for LeaseHandle {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let mut conn = self.conn.clone();
        let key = self.key.clone();
        let token = self.token.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = delete_if_owner(&mut conn, &key, &token).await;
            });
        }
    }
}

async fn delete_if_owner(
    conn: &mut ConnectionManager,
    key: &str,
    token: &str,
) -> Result<bool, redis::RedisError> {
    let mut get = redis::cmd("GET");
    get.arg(key);
    let current: Option<String> = get.query_async(conn).await?;
    if current.as_deref() != Some(token) {
        return Ok(false);
    }

    let mut del = redis::cmd("DEL");
    del.arg(key);
    let _: () = del.query_async(conn).await?;
    Ok(true)
}
