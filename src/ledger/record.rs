use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::TaxBreakdown;
use crate::decimal::Money;
use crate::types::{PaymentStatus, ProcessedBy, RecordId, StudentId};

/// one immutable line of a student's fee ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub transaction_code: String,

    // balances
    pub balance_bf: Money,
    pub new_bill: Money,
    pub tax_amount: Money,
    pub tax_breakdown: TaxBreakdown,
    pub total_bill: Money,
    pub amount_paid: Money,
    pub current_balance: Money,

    pub status: PaymentStatus,
    pub category: String,
    pub processed_by: ProcessedBy,
}

impl LedgerRecord {
    /// true when the arithmetic identities of the record hold
    pub fn is_balanced(&self) -> bool {
        let total_bill = self
            .balance_bf
            .checked_add(self.new_bill)
            .and_then(|t| t.checked_add(self.tax_amount));
        total_bill == Some(self.total_bill)
            && self.total_bill.checked_sub(self.amount_paid) == Some(self.current_balance)
            && self.status == status_for(self.current_balance)
    }
}

/// `Full` once nothing is owed, credit included
pub fn status_for(current_balance: Money) -> PaymentStatus {
    if current_balance.is_positive() {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Full
    }
}

/// student as seen by the ledger: identity plus the ledger it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub serial_id: String,
    pub name: String,
    pub current_class: String,
    pub ledger: Vec<LedgerRecord>,
    pub is_fees_cleared: bool,
}

impl Student {
    /// freshly admitted student, never billed
    pub fn new(serial_id: impl Into<String>, name: impl Into<String>, current_class: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            serial_id: serial_id.into(),
            name: name.into(),
            current_class: current_class.into(),
            ledger: Vec::new(),
            is_fees_cleared: false,
        }
    }

    pub fn latest_record(&self) -> Option<&LedgerRecord> {
        self.ledger.last()
    }

    /// balance carried into the next transaction
    pub fn balance_bf(&self) -> Money {
        self.latest_record().map(|r| r.current_balance).unwrap_or(Money::ZERO)
    }

    /// owed after the latest transaction, zero when never billed
    pub fn outstanding(&self) -> Money {
        self.balance_bf()
    }

    /// latest balance is positive, or never billed and not cleared
    pub fn is_defaulter(&self) -> bool {
        match self.latest_record() {
            Some(record) => record.current_balance.is_positive(),
            None => !self.is_fees_cleared,
        }
    }

    /// checks every record's arithmetic and the balance chain between records
    pub fn verify_ledger(&self) -> bool {
        let mut expected_bf = Money::ZERO;
        for record in &self.ledger {
            if record.balance_bf != expected_bf || !record.is_balanced() {
                return false;
            }
            expected_bf = record.current_balance;
        }
        self.ledger.is_empty() || self.is_fees_cleared == !expected_bf.is_positive()
    }
}
