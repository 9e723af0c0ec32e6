pub mod code;
pub mod engine;
pub mod record;

pub use code::TransactionCodeGenerator;
pub use engine::{LedgerEngine, PaymentOutcome, PaymentRequest};
pub use record::{status_for, LedgerRecord, Student};
