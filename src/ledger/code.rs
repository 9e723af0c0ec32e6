use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use uuid::Uuid;

/// issues transaction codes of the form `TXN-20240115-3F9A1C-000042`.
///
/// the date part keeps codes readable on receipts, the salt separates
/// generators (and processes), and the counter makes every code issued by
/// one generator distinct.
#[derive(Debug)]
pub struct TransactionCodeGenerator {
    salt: String,
    counter: AtomicU64,
}

impl TransactionCodeGenerator {
    pub fn new() -> Self {
        let salt = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
        Self::with_salt(salt)
    }

    /// fixed salt, mostly useful for reproducible output
    pub fn with_salt(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn next_code(&self, date: NaiveDate) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("TXN-{}-{}-{:06}", date.format("%Y%m%d"), self.salt, n)
    }

    /// number of codes issued so far
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for TransactionCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
