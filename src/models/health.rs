use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot de saúde de um Payment Processor, mantido no cache Redis com TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub failing: bool,
    #[serde(rename = "minResponseTime")]
    pub min_response_time: u64,
    // Entradas gravadas por versões antigas não carregam o campo
    #[serde(rename = "lastCheckedAt", default = "Utc::now")]
    pub last_checked_at: DateTime<Utc>,
}

impl HealthStatus {
    pub fn new(failing: bool, min_response_time: u64) -> Self {
        Self {
            failing,
            min_response_time,
            last_checked_at: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        !self.failing
    }
}
