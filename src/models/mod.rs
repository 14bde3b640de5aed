pub mod health;
pub mod payment;

pub use health::HealthStatus;
pub use payment::{Payment, PaymentProcessorType, PaymentStatus};
