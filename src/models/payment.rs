use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifica qual Payment Processor aceitou o pagamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentProcessorType {
    Default,
    Fallback,
}

impl PaymentProcessorType {
    /// Fragmento usado nas chaves Redis (`default` / `fallback`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProcessorType::Default => "default",
            PaymentProcessorType::Fallback => "fallback",
        }
    }

    pub const ALL: [PaymentProcessorType; 2] =
        [PaymentProcessorType::Default, PaymentProcessorType::Fallback];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Success,
    Failed,
    Retry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "correlationId")]
    pub correlation_id: Uuid,
    pub amount: Decimal,
    #[serde(rename = "requestedAt")]
    pub requested_at: DateTime<Utc>,
    // Setado apenas depois que um processador aceita o pagamento
    #[serde(
        rename = "paymentProcessorType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_processor_type: Option<PaymentProcessorType>,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(rename = "retryCount", default)]
    pub retry_count: u32,
}

impl Payment {
    pub fn new(correlation_id: Uuid, amount: Decimal, requested_at: DateTime<Utc>) -> Self {
        Self {
            correlation_id,
            amount,
            requested_at,
            payment_processor_type: None,
            status: PaymentStatus::Pending,
            retry_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_queued_payment() {
        let json = r#"{"correlationId":"11111111-1111-1111-1111-111111111111","amount":19.90,"requestedAt":"2025-01-01T00:00:00Z","status":"PENDING","retryCount":0}"#;
        let payment: Payment = serde_json::from_str(json).unwrap();

        assert_eq!(
            payment.correlation_id.to_string(),
            "11111111-1111-1111-1111-111111111111"
        );
        assert_eq!(payment.amount.to_string(), "19.9");
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.retry_count, 0);
        assert!(payment.payment_processor_type.is_none());
    }

    #[test]
    fn test_decode_defaults_for_missing_fields() {
        // Produtores antigos enviam apenas os campos imutáveis
        let json = r#"{"correlationId":"11111111-1111-1111-1111-111111111111","amount":5,"requestedAt":"2025-01-01T00:00:00Z"}"#;
        let payment: Payment = serde_json::from_str(json).unwrap();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.retry_count, 0);
        assert!(payment.payment_processor_type.is_none());
    }

    #[test]
    fn test_encode_field_names() {
        let mut payment = Payment::new(
            Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
            Decimal::new(1990, 2),
            "2025-01-01T00:00:00Z".parse().unwrap(),
        );
        payment.payment_processor_type = Some(PaymentProcessorType::Default);
        payment.status = PaymentStatus::Success;

        let json = serde_json::to_string(&payment).unwrap();
        assert!(json.contains("\"correlationId\":\"11111111-1111-1111-1111-111111111111\""));
        assert!(json.contains("\"amount\":19.9"));
        assert!(json.contains("\"requestedAt\":\"2025-01-01T00:00:00Z\""));
        assert!(json.contains("\"paymentProcessorType\":\"DEFAULT\""));
        assert!(json.contains("\"status\":\"SUCCESS\""));
        assert!(json.contains("\"retryCount\":0"));
    }

    #[test]
    fn test_processor_type_absent_when_unset() {
        let payment = Payment::new(Uuid::new_v4(), Decimal::new(100, 2), Utc::now());
        let json = serde_json::to_string(&payment).unwrap();
        assert!(!json.contains("paymentProcessorType"));
    }

    #[test]
    fn test_reenqueue_roundtrip_preserves_mutated_fields() {
        let mut payment = Payment::new(Uuid::new_v4(), Decimal::new(4200, 2), Utc::now());
        payment.status = PaymentStatus::Retry;
        payment.retry_count = 2;

        let json = serde_json::to_string(&payment).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();

        assert_eq!(back.status, PaymentStatus::Retry);
        assert_eq!(back.retry_count, 2);
        assert_eq!(back.correlation_id, payment.correlation_id);
        assert_eq!(back.amount, payment.amount);
    }

    #[test]
    fn test_processor_key_fragments() {
        assert_eq!(PaymentProcessorType::Default.as_str(), "default");
        assert_eq!(PaymentProcessorType::Fallback.as_str(), "fallback");
    }
}
