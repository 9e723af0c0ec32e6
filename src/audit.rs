use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{RecordId, StudentId};

/// who collected what, from whom, and when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrailEntry {
    pub id: RecordId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub staff_id: String,
    pub staff_name: String,
    pub learner_id: StudentId,
    pub learner_name: String,
    pub amount: Money,
    pub category: String,
    pub transaction_code: String,
}

/// append-only audit log, independent of student storage
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    entries: Vec<AuditTrailEntry>,
    by_code: HashMap<String, usize>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// append an entry, rejecting a transaction code already on file
    pub fn append(&mut self, entry: AuditTrailEntry) -> Result<()> {
        self.ensure_unique(&entry.transaction_code)?;
        self.by_code.insert(entry.transaction_code.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn ensure_unique(&self, code: &str) -> Result<()> {
        if self.by_code.contains_key(code) {
            return Err(LedgerError::DuplicateTransactionCode {
                code: code.to_string(),
            });
        }
        Ok(())
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn entries(&self) -> &[AuditTrailEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_code(&self, code: &str) -> Option<&AuditTrailEntry> {
        self.by_code.get(code).map(|&i| &self.entries[i])
    }

    pub fn by_date(&self, date: NaiveDate) -> Vec<&AuditTrailEntry> {
        self.filter(|e| e.date == date)
    }

    /// entries dated within `start..=end`
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&AuditTrailEntry> {
        self.filter(|e| e.date >= start && e.date <= end)
    }

    pub fn by_staff(&self, staff_id: &str) -> Vec<&AuditTrailEntry> {
        self.filter(|e| e.staff_id == staff_id)
    }

    pub fn by_learner(&self, learner_id: StudentId) -> Vec<&AuditTrailEntry> {
        self.filter(|e| e.learner_id == learner_id)
    }

    fn filter<F>(&self, predicate: F) -> Vec<&AuditTrailEntry>
    where
        F: Fn(&AuditTrailEntry) -> bool,
    {
        self.entries.iter().filter(|e| predicate(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry(code: &str, staff: &str, learner: StudentId, day: u32) -> AuditTrailEntry {
        AuditTrailEntry {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            staff_id: staff.to_string(),
            staff_name: format!("Staff {}", staff),
            learner_id: learner,
            learner_name: "Ama Mensah".to_string(),
            amount: Money::from_major(100),
            category: "School Fees".to_string(),
            transaction_code: code.to_string(),
        }
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let learner = Uuid::new_v4();
        let mut trail = AuditTrail::new();
        trail.append(entry("TXN-1", "S01", learner, 1)).unwrap();

        let err = trail.append(entry("TXN-1", "S02", learner, 2)).unwrap_err();
        assert_eq!(err, LedgerError::DuplicateTransactionCode { code: "TXN-1".to_string() });
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.by_code("TXN-1").map(|e| e.staff_id.as_str()), Some("S01"));
    }

    #[test]
    fn test_queries() {
        let ama = Uuid::new_v4();
        let kofi = Uuid::new_v4();
        let mut trail = AuditTrail::new();
        trail.append(entry("TXN-1", "S01", ama, 1)).unwrap();
        trail.append(entry("TXN-2", "S02", kofi, 1)).unwrap();
        trail.append(entry("TXN-3", "S01", kofi, 5)).unwrap();

        let feb1 = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let feb4 = NaiveDate::from_ymd_opt(2024, 2, 4).unwrap();
        let feb5 = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();

        assert_eq!(trail.by_date(feb1).len(), 2);
        assert_eq!(trail.by_staff("S01").len(), 2);
        assert_eq!(trail.by_learner(kofi).len(), 2);
        assert_eq!(trail.between(feb1, feb4).len(), 2);
        assert_eq!(trail.between(feb1, feb5).len(), 3);
        assert!(trail.by_code("TXN-9").is_none());
        // queries never reorder
        let codes: Vec<_> = trail.entries().iter().map(|e| e.transaction_code.as_str()).collect();
        assert_eq!(codes, vec!["TXN-1", "TXN-2", "TXN-3"]);
    }
}
