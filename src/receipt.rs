//! receipt view of a processed payment, for printing and display

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::billing::TaxBreakdown;
use crate::decimal::Money;
use crate::ledger::{LedgerRecord, Student};
use crate::types::{PaymentStatus, StudentId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_code: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub learner: LearnerView,
    pub category: String,
    pub amounts: AmountView,
    pub status: PaymentStatus,
    pub processed_by: String,
    pub staff_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerView {
    pub id: StudentId,
    pub serial_id: String,
    pub name: String,
    pub current_class: String,
    pub is_fees_cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountView {
    pub balance_bf: Money,
    pub new_bill: Money,
    pub tax_amount: Money,
    pub tax_breakdown: TaxBreakdown,
    pub total_bill: Money,
    pub amount_paid: Money,
    pub current_balance: Money,
}

impl Receipt {
    pub fn from_record(student: &Student, record: &LedgerRecord, message: &str) -> Self {
        Receipt {
            transaction_code: record.transaction_code.clone(),
            date: record.date,
            time: record.time,
            learner: LearnerView {
                id: student.id,
                serial_id: student.serial_id.clone(),
                name: student.name.clone(),
                current_class: student.current_class.clone(),
                is_fees_cleared: student.is_fees_cleared,
            },
            category: record.category.clone(),
            amounts: AmountView {
                balance_bf: record.balance_bf,
                new_bill: record.new_bill,
                tax_amount: record.tax_amount,
                tax_breakdown: record.tax_breakdown,
                total_bill: record.total_bill,
                amount_paid: record.amount_paid,
                current_balance: record.current_balance,
            },
            status: record.status,
            processed_by: record.processed_by.staff_name.clone(),
            staff_id: record.processed_by.staff_id.clone(),
            message: message.to_string(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn json(&self) -> String {
        self.to_json_pretty().unwrap_or_default()
    }
}
