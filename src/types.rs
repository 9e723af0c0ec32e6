use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a student
pub type StudentId = Uuid;

/// unique identifier for a ledger record or audit entry
pub type RecordId = Uuid;

/// settlement status of a ledger record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// nothing outstanding after this transaction (includes credit)
    Full,
    /// balance still owed after this transaction
    Partial,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Full => "Full",
            PaymentStatus::Partial => "Partial",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// authorized staff member performing a transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub staff_id: String,
    pub staff_name: String,
}

impl ActorIdentity {
    pub fn new(staff_id: impl Into<String>, staff_name: impl Into<String>) -> Self {
        Self {
            staff_id: staff_id.into(),
            staff_name: staff_name.into(),
        }
    }

    /// both id and name must carry something other than whitespace
    pub fn is_present(&self) -> bool {
        !self.staff_id.trim().is_empty() && !self.staff_name.trim().is_empty()
    }
}

/// actor stamp kept on every ledger record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedBy {
    pub staff_id: String,
    pub staff_name: String,
    pub time: DateTime<Utc>,
}

impl ProcessedBy {
    pub fn stamp(actor: &ActorIdentity, time: DateTime<Utc>) -> Self {
        Self {
            staff_id: actor.staff_id.clone(),
            staff_name: actor.staff_name.clone(),
            time,
        }
    }
}

/// how credit (negative) balances feed the institutional arrears figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArrearsPolicy {
    /// sum raw signed balances, credits reduce the total
    #[default]
    SignedSum,
    /// count credit balances as zero
    FloorAtZero,
}

/// how a category missing from the configuration is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CategoryPolicy {
    /// bill nothing for an unknown category
    #[default]
    Lenient,
    /// reject the transaction
    Strict,
}
