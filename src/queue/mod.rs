pub mod payment_queue;

pub use payment_queue::{PaymentPublisher, PaymentQueue, RedisPaymentQueue};
