//! School fee ledger: per-student running balances, an append-only audit
//! trail, levy computation and day/week/month/term reporting.

pub mod aggregation;
pub mod audit;
pub mod auth;
pub mod billing;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod receipt;
pub mod repository;
pub mod service;
pub mod types;
pub mod utils;

// re-export key types
pub use aggregation::{
    AggregationService, Defaulter, PeriodSummary, ReconciliationReport, Window, WindowTotals,
};
pub use audit::{AuditTrail, AuditTrailEntry};
pub use auth::{Authorizer, StaffCredential, StaffRole, StaffRoster};
pub use billing::{BillingCalculator, Charge, TaxBreakdown};
pub use config::{ClassBillSchedule, FinanceConfig, LedgerPolicy, TaxConfig};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{
    LedgerEngine, LedgerRecord, PaymentOutcome, PaymentRequest, Student, TransactionCodeGenerator,
};
pub use receipt::Receipt;
pub use repository::{
    AuditRepository, ConfigRepository, InMemoryConfigRepository, InMemoryLedgerStore,
    JsonFileConfigRepository, LedgerCommit, LedgerSnapshot, LedgerStore, StudentRepository,
};
pub use service::LedgerService;
pub use types::{
    ActorIdentity, ArrearsPolicy, CategoryPolicy, PaymentStatus, ProcessedBy, RecordId, StudentId,
};
pub use utils::init_tracing;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
