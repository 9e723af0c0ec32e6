use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::audit::AuditTrailEntry;
use crate::decimal::Money;
use crate::ledger::{LedgerRecord, Student};
use crate::types::StudentId;

/// ledger record whose code has no audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanedRecord {
    pub student_id: StudentId,
    pub transaction_code: String,
    pub amount_paid: Money,
}

/// audit entry whose code has no ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanedAuditEntry {
    pub learner_id: StudentId,
    pub transaction_code: String,
    pub amount: Money,
}

/// pair sharing a code but disagreeing on what was paid or by whom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MismatchedPair {
    pub transaction_code: String,
    pub ledger_amount: Money,
    pub audit_amount: Money,
    pub ledger_student: StudentId,
    pub audit_learner: StudentId,
}

/// advisory comparison of ledgers against the audit trail
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub ledger_records: usize,
    pub audit_entries: usize,
    pub matched: usize,
    pub orphaned_records: Vec<OrphanedRecord>,
    pub orphaned_audit_entries: Vec<OrphanedAuditEntry>,
    pub mismatched: Vec<MismatchedPair>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.orphaned_records.is_empty() && self.orphaned_audit_entries.is_empty() && self.mismatched.is_empty()
    }
}

/// match ledger records and audit entries by transaction code.
/// only records and entries accepted by the filters take part
pub fn reconcile<R, A>(
    students: &[Student],
    audit: &[AuditTrailEntry],
    include_record: R,
    include_entry: A,
) -> ReconciliationReport
where
    R: Fn(&LedgerRecord) -> bool,
    A: Fn(&AuditTrailEntry) -> bool,
{
    let entries: Vec<&AuditTrailEntry> = audit.iter().filter(|e| include_entry(e)).collect();
    let mut by_code: HashMap<&str, &AuditTrailEntry> =
        entries.iter().map(|e| (e.transaction_code.as_str(), *e)).collect();

    let mut report = ReconciliationReport {
        audit_entries: entries.len(),
        ..ReconciliationReport::default()
    };

    for student in students {
        for record in student.ledger.iter().filter(|r| include_record(r)) {
            report.ledger_records += 1;
            match by_code.remove(record.transaction_code.as_str()) {
                Some(entry) if entry.amount == record.amount_paid && entry.learner_id == student.id => {
                    report.matched += 1;
                }
                Some(entry) => report.mismatched.push(MismatchedPair {
                    transaction_code: record.transaction_code.clone(),
                    ledger_amount: record.amount_paid,
                    audit_amount: entry.amount,
                    ledger_student: student.id,
                    audit_learner: entry.learner_id,
                }),
                None => report.orphaned_records.push(OrphanedRecord {
                    student_id: student.id,
                    transaction_code: record.transaction_code.clone(),
                    amount_paid: record.amount_paid,
                }),
            }
        }
    }

    // whatever is left never met a ledger record; keep audit order
    report.orphaned_audit_entries = entries
        .iter()
        .filter(|e| by_code.contains_key(e.transaction_code.as_str()))
        .map(|e| OrphanedAuditEntry {
            learner_id: e.learner_id,
            transaction_code: e.transaction_code.clone(),
            amount: e.amount,
        })
        .collect();

    report
}
