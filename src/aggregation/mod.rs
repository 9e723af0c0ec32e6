//! read-only rollups over every student's ledger and the audit trail.
//!
//! the service works on a `LedgerSnapshot`, so a report never observes a
//! payment whose ledger record is committed but whose audit entry is not.

pub mod reconciliation;
pub mod window;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::ledger::{LedgerRecord, Student};
use crate::repository::LedgerSnapshot;
use crate::types::{ArrearsPolicy, StudentId};

pub use reconciliation::{
    reconcile, MismatchedPair, OrphanedAuditEntry, OrphanedRecord, ReconciliationReport,
};
pub use window::{week_start, Window};

/// sums over the records of one window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowTotals {
    pub amount_paid: Money,
    pub new_bill: Money,
    pub tax_amount: Money,
    pub transaction_count: usize,
}

impl WindowTotals {
    fn add(&mut self, record: &LedgerRecord) {
        self.amount_paid += record.amount_paid;
        self.new_bill += record.new_bill;
        self.tax_amount += record.tax_amount;
        self.transaction_count += 1;
    }
}

/// all four windows for one reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub reference: NaiveDate,
    pub day: WindowTotals,
    pub week: WindowTotals,
    pub month: WindowTotals,
    pub term: WindowTotals,
}

/// student owing money after their latest transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaulter {
    pub student_id: StudentId,
    pub serial_id: String,
    pub name: String,
    pub current_class: String,
    /// zero for a student never billed
    pub outstanding: Money,
    pub last_transaction: Option<NaiveDate>,
}

/// collections for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub category: String,
    pub totals: WindowTotals,
}

/// cash taken by one staff member, from the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffCollection {
    pub staff_id: String,
    pub staff_name: String,
    pub amount: Money,
    pub transaction_count: usize,
}

/// rollups over a consistent snapshot
#[derive(Debug, Clone)]
pub struct AggregationService {
    snapshot: LedgerSnapshot,
    arrears_policy: ArrearsPolicy,
}

impl AggregationService {
    pub fn new(snapshot: LedgerSnapshot, arrears_policy: ArrearsPolicy) -> Self {
        Self {
            snapshot,
            arrears_policy,
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.snapshot.students
    }

    fn records_in(&self, window: Window, reference: NaiveDate) -> impl Iterator<Item = (&Student, &LedgerRecord)> {
        self.snapshot.students.iter().flat_map(move |student| {
            student
                .ledger
                .iter()
                .filter(move |r| window.contains(r.date, reference))
                .map(move |r| (student, r))
        })
    }

    pub fn window_totals(&self, window: Window, reference: NaiveDate) -> WindowTotals {
        let mut totals = WindowTotals::default();
        for (_, record) in self.records_in(window, reference) {
            totals.add(record);
        }
        totals
    }

    pub fn summary(&self, reference: NaiveDate) -> PeriodSummary {
        PeriodSummary {
            reference,
            day: self.window_totals(Window::Day, reference),
            week: self.window_totals(Window::Week, reference),
            month: self.window_totals(Window::Month, reference),
            term: self.window_totals(Window::Term, reference),
        }
    }

    /// defaulters, largest balance first; equal balances keep registration order
    pub fn defaulters(&self) -> Vec<Defaulter> {
        let mut defaulters: Vec<Defaulter> = self
            .snapshot
            .students
            .iter()
            .filter(|s| s.is_defaulter())
            .map(|s| Defaulter {
                student_id: s.id,
                serial_id: s.serial_id.clone(),
                name: s.name.clone(),
                current_class: s.current_class.clone(),
                outstanding: s.outstanding(),
                last_transaction: s.latest_record().map(|r| r.date),
            })
            .collect();
        // stable sort
        defaulters.sort_by(|a, b| b.outstanding.cmp(&a.outstanding));
        defaulters
    }

    /// institutional arrears under the configured policy
    pub fn closing_arrears(&self) -> Money {
        self.closing_arrears_with(self.arrears_policy)
    }

    pub fn closing_arrears_with(&self, policy: ArrearsPolicy) -> Money {
        self.snapshot
            .students
            .iter()
            .map(|s| apply_policy(s.outstanding(), policy))
            .sum()
    }

    /// latest balances summed per class
    pub fn arrears_by_class(&self) -> BTreeMap<String, Money> {
        let mut by_class = BTreeMap::new();
        for student in &self.snapshot.students {
            *by_class.entry(student.current_class.clone()).or_insert(Money::ZERO) +=
                apply_policy(student.outstanding(), self.arrears_policy);
        }
        by_class
    }

    /// window totals split by category, in category name order
    pub fn collections_by_category(&self, window: Window, reference: NaiveDate) -> Vec<CategoryTotals> {
        let mut by_category: BTreeMap<&str, WindowTotals> = BTreeMap::new();
        for (_, record) in self.records_in(window, reference) {
            by_category.entry(record.category.as_str()).or_default().add(record);
        }
        by_category
            .into_iter()
            .map(|(category, totals)| CategoryTotals {
                category: category.to_string(),
                totals,
            })
            .collect()
    }

    /// cash taken per staff member in the window, largest first
    pub fn collections_by_staff(&self, window: Window, reference: NaiveDate) -> Vec<StaffCollection> {
        let mut by_staff: Vec<StaffCollection> = Vec::new();
        for entry in self.snapshot.audit.iter().filter(|e| window.contains(e.date, reference)) {
            match by_staff.iter_mut().find(|c| c.staff_id == entry.staff_id) {
                Some(collection) => {
                    collection.amount += entry.amount;
                    collection.transaction_count += 1;
                }
                None => by_staff.push(StaffCollection {
                    staff_id: entry.staff_id.clone(),
                    staff_name: entry.staff_name.clone(),
                    amount: entry.amount,
                    transaction_count: 1,
                }),
            }
        }
        by_staff.sort_by(|a, b| b.amount.cmp(&a.amount));
        by_staff
    }

    /// compare every ledger record against the audit trail
    pub fn reconcile(&self) -> ReconciliationReport {
        reconcile(&self.snapshot.students, &self.snapshot.audit, |_| true, |_| true)
    }

    /// compare only what was dated inside the window
    pub fn reconcile_window(&self, window: Window, reference: NaiveDate) -> ReconciliationReport {
        reconcile(
            &self.snapshot.students,
            &self.snapshot.audit,
            |r| window.contains(r.date, reference),
            |e| window.contains(e.date, reference),
        )
    }
}

fn apply_policy(balance: Money, policy: ArrearsPolicy) -> Money {
    match policy {
        ArrearsPolicy::SignedSum => balance,
        ArrearsPolicy::FloorAtZero => balance.max(Money::ZERO),
    }
}
