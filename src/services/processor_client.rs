use crate::app::config::Config;
use crate::models::{HealthStatus, Payment, PaymentProcessorType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(4);

/// Resultado de uma submissão de pagamento a um processador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// 422 com correlationId já conhecido: o pagamento foi aceito numa
    /// tentativa anterior cuja resposta se perdeu.
    AlreadyProcessed,
    Rejected,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted | SubmitOutcome::AlreadyProcessed)
    }
}

#[async_trait]
pub trait ProcessorPort: Send + Sync {
    async fn submit(
        &self,
        payment: &Payment,
        processor_type: PaymentProcessorType,
    ) -> SubmitOutcome;

    async fn probe(&self, processor_type: PaymentProcessorType) -> Option<HealthStatus>;
}

// Corpo enviado no POST /payments
#[derive(Debug, Serialize)]
struct ProcessorPaymentRequest {
    #[serde(rename = "correlationId")]
    correlation_id: Uuid,
    amount: Decimal,
    #[serde(rename = "requestedAt")]
    requested_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ServiceHealthResponse {
    failing: bool,
    #[serde(rename = "minResponseTime")]
    min_response_time: u64,
}

pub struct PaymentProcessorClient {
    client: Client,
    default_url: String,
    fallback_url: String,
}

impl PaymentProcessorClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

        Ok(Self {
            client,
            default_url: config.default_processor_url.clone(),
            fallback_url: config.fallback_processor_url.clone(),
        })
    }

    fn base_url(&self, processor_type: PaymentProcessorType) -> &str {
        match processor_type {
            PaymentProcessorType::Default => &self.default_url,
            PaymentProcessorType::Fallback => &self.fallback_url,
        }
    }
}

/// Classificação da resposta de submissão, isolada para teste.
pub fn classify_submit_response(status: u16, body: &str) -> SubmitOutcome {
    if status == 200 && body.contains("payment processed successfully") {
        return SubmitOutcome::Accepted;
    }
    if status == 422 && body.to_lowercase().contains("correlationid already exists") {
        return SubmitOutcome::AlreadyProcessed;
    }
    SubmitOutcome::Rejected
}

#[async_trait]
impl ProcessorPort for PaymentProcessorClient {
    async fn submit(
        &self,
        payment: &Payment,
        processor_type: PaymentProcessorType,
    ) -> SubmitOutcome {
        let body = ProcessorPaymentRequest {
            correlation_id: payment.correlation_id,
            amount: payment.amount,
            requested_at: payment.requested_at,
        };
        let url = format!("{}/payments", self.base_url(processor_type));

        let response = match self
            .client
            .post(&url)
            .timeout(SUBMIT_TIMEOUT)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "Failed to submit payment {} to {} processor: {}",
                    payment.correlation_id,
                    processor_type.as_str(),
                    e
                );
                return SubmitOutcome::Rejected;
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    "Failed to read {} processor response for payment {}: {}",
                    processor_type.as_str(),
                    payment.correlation_id,
                    e
                );
                return SubmitOutcome::Rejected;
            }
        };

        classify_submit_response(status, &body)
    }

    async fn probe(&self, processor_type: PaymentProcessorType) -> Option<HealthStatus> {
        let url = format!("{}/payments/service-health", self.base_url(processor_type));

        let response = match self.client.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "Health probe for {} processor failed: {}",
                    processor_type.as_str(),
                    e
                );
                return None;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            // O processador limita a frequência dos probes; 429 não traz informação nova
            warn!("{} processor rate-limited the health probe", processor_type.as_str());
            return None;
        }
        if !status.is_success() {
            warn!(
                "{} processor health probe returned status {}",
                processor_type.as_str(),
                status
            );
            return None;
        }

        match response.json::<ServiceHealthResponse>().await {
            Ok(health) => Some(HealthStatus::new(health.failing, health.min_response_time)),
            Err(e) => {
                warn!(
                    "Failed to decode health probe response from {} processor: {}",
                    processor_type.as_str(),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_200_with_known_phrase() {
        let outcome = classify_submit_response(200, "payment processed successfully");
        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_rejects_200_with_unknown_body() {
        assert_eq!(classify_submit_response(200, "ok"), SubmitOutcome::Rejected);
    }

    #[test]
    fn test_accepts_422_duplicate_case_insensitive() {
        let outcome = classify_submit_response(422, "CorrelationId already exists.");
        assert_eq!(outcome, SubmitOutcome::AlreadyProcessed);
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_rejects_422_with_other_validation_error() {
        assert_eq!(
            classify_submit_response(422, "amount must be positive"),
            SubmitOutcome::Rejected
        );
    }

    #[test]
    fn test_rejects_server_errors_and_rate_limit() {
        assert_eq!(
            classify_submit_response(500, "payment processed successfully"),
            SubmitOutcome::Rejected
        );
        assert_eq!(classify_submit_response(429, ""), SubmitOutcome::Rejected);
    }

    #[test]
    fn test_submit_body_wire_format() {
        let body = ProcessorPaymentRequest {
            correlation_id: Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
            amount: Decimal::new(1990, 2),
            requested_at: "2025-01-01T00:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"correlationId":"11111111-1111-1111-1111-111111111111","amount":19.9,"requestedAt":"2025-01-01T00:00:00Z"}"#
        );
    }
}
