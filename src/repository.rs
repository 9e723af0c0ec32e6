//! storage seams for the ledger.
//!
//! students, the audit trail and the finance configuration are reached through
//! traits so the engine never depends on where they live. `LedgerStore::commit`
//! is the single write path for payments: the ledger append and its audit
//! entry become visible together or not at all.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::audit::{AuditTrail, AuditTrailEntry};
use crate::config::FinanceConfig;
use crate::errors::{LedgerError, Result};
use crate::ledger::Student;
use crate::types::StudentId;

/// student directory
pub trait StudentRepository: Send + Sync {
    fn get(&self, id: StudentId) -> Result<Option<Student>>;

    /// all students in registration order
    fn list(&self) -> Result<Vec<Student>>;

    /// register a student, ids must be new
    fn insert(&self, student: Student) -> Result<()>;
}

/// audit trail storage, append and read only
pub trait AuditRepository: Send + Sync {
    fn append(&self, entry: AuditTrailEntry) -> Result<()>;

    fn audit_entries(&self) -> Result<Vec<AuditTrailEntry>>;

    fn find_by_code(&self, code: &str) -> Result<Option<AuditTrailEntry>>;
}

/// finance configuration storage
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<FinanceConfig>;

    fn save(&self, config: &FinanceConfig) -> Result<()>;
}

/// one processed payment ready to be made durable
#[derive(Debug, Clone)]
pub struct LedgerCommit {
    /// student with exactly one record appended. only that record is
    /// stored; earlier records must match the ledger on file and profile
    /// fields are ignored
    pub student: Student,
    pub audit_entry: AuditTrailEntry,
    /// ledger length observed when the payment was computed
    pub expected_len: usize,
}

/// consistent copy of every ledger and the audit trail
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub students: Vec<Student>,
    pub audit: Vec<AuditTrailEntry>,
}

/// students plus audit trail behind one transactional boundary
pub trait LedgerStore: StudentRepository + AuditRepository {
    /// append the record and its audit entry atomically.
    /// fails with `ConcurrentModification` when the stored ledger no longer
    /// has `expected_len` records, `DuplicateTransactionCode` when the
    /// code is already on file, and `Storage` when the commit alters recorded
    /// history or breaks the balance chain
    fn commit(&self, commit: LedgerCommit) -> Result<()>;

    fn snapshot(&self) -> Result<LedgerSnapshot>;
}

#[derive(Debug, Default)]
struct StoreState {
    students: HashMap<StudentId, Student>,
    order: Vec<StudentId>,
    audit: AuditTrail,
}

/// in-memory ledger store guarded by a single lock
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<StoreState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| LedgerError::Storage {
            message: "ledger store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| LedgerError::Storage {
            message: "ledger store lock poisoned".to_string(),
        })
    }
}

impl StudentRepository for InMemoryLedgerStore {
    fn get(&self, id: StudentId) -> Result<Option<Student>> {
        Ok(self.read()?.students.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Student>> {
        let state = self.read()?;
        Ok(state.order.iter().filter_map(|id| state.students.get(id).cloned()).collect())
    }

    fn insert(&self, student: Student) -> Result<()> {
        let mut state = self.write()?;
        if state.students.contains_key(&student.id) {
            return Err(LedgerError::Storage {
                message: format!("student {} already registered", student.id),
            });
        }
        debug!(student_id = %student.id, serial_id = %student.serial_id, "student registered");
        state.order.push(student.id);
        state.students.insert(student.id, student);
        Ok(())
    }
}

impl AuditRepository for InMemoryLedgerStore {
    fn append(&self, entry: AuditTrailEntry) -> Result<()> {
        self.write()?.audit.append(entry)
    }

    fn audit_entries(&self) -> Result<Vec<AuditTrailEntry>> {
        Ok(self.read()?.audit.entries().to_vec())
    }

    fn find_by_code(&self, code: &str) -> Result<Option<AuditTrailEntry>> {
        Ok(self.read()?.audit.by_code(code).cloned())
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn commit(&self, commit: LedgerCommit) -> Result<()> {
        let LedgerCommit {
            mut student,
            audit_entry,
            expected_len,
        } = commit;

        let mut guard = self.write()?;
        let state = &mut *guard;

        let stored = state
            .students
            .get_mut(&student.id)
            .ok_or(LedgerError::StudentNotFound { id: student.id })?;

        let found = stored.ledger.len();
        if found != expected_len {
            warn!(student_id = %student.id, expected_len, found, "ledger moved during commit");
            return Err(LedgerError::ConcurrentModification {
                id: student.id,
                expected: expected_len,
                found,
            });
        }

        let record = match student.ledger.pop() {
            Some(record) if student.ledger.len() == expected_len => record,
            _ => {
                return Err(LedgerError::Storage {
                    message: "commit must append exactly one ledger record".to_string(),
                })
            }
        };

        // recorded history is immutable, only the new record is taken
        if student.ledger != stored.ledger {
            warn!(student_id = %student.id, "commit carried altered ledger history");
            return Err(LedgerError::Storage {
                message: format!("commit for {} rewrites recorded ledger history", student.id),
            });
        }
        if record.balance_bf != stored.balance_bf() || !record.is_balanced() {
            return Err(LedgerError::Storage {
                message: format!(
                    "record {} does not continue the balance chain from {}",
                    record.transaction_code,
                    stored.balance_bf()
                ),
            });
        }
        if record.transaction_code != audit_entry.transaction_code
            || record.amount_paid != audit_entry.amount
            || audit_entry.learner_id != stored.id
        {
            return Err(LedgerError::Storage {
                message: format!(
                    "ledger record {} does not match audit entry {}",
                    record.transaction_code, audit_entry.transaction_code
                ),
            });
        }

        // every check passes before either write happens
        state.audit.ensure_unique(&audit_entry.transaction_code)?;

        debug!(
            student_id = %stored.id,
            transaction_code = %audit_entry.transaction_code,
            ledger_len = expected_len + 1,
            "ledger commit"
        );
        state.audit.append(audit_entry)?;
        stored.is_fees_cleared = !record.current_balance.is_positive();
        stored.ledger.push(record);
        Ok(())
    }

    fn snapshot(&self) -> Result<LedgerSnapshot> {
        let state = self.read()?;
        Ok(LedgerSnapshot {
            students: state.order.iter().filter_map(|id| state.students.get(id).cloned()).collect(),
            audit: state.audit.entries().to_vec(),
        })
    }
}

/// configuration held in memory
#[derive(Debug, Default)]
pub struct InMemoryConfigRepository {
    config: RwLock<FinanceConfig>,
}

impl InMemoryConfigRepository {
    pub fn new(config: FinanceConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

impl ConfigRepository for InMemoryConfigRepository {
    fn load(&self) -> Result<FinanceConfig> {
        self.config.read().map(|c| c.clone()).map_err(|_| LedgerError::Storage {
            message: "config lock poisoned".to_string(),
        })
    }

    fn save(&self, config: &FinanceConfig) -> Result<()> {
        config.validate()?;
        let mut current = self.config.write().map_err(|_| LedgerError::Storage {
            message: "config lock poisoned".to_string(),
        })?;
        *current = config.clone();
        Ok(())
    }
}

/// configuration kept in a json file
#[derive(Debug, Clone)]
pub struct JsonFileConfigRepository {
    path: PathBuf,
}

impl JsonFileConfigRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigRepository for JsonFileConfigRepository {
    fn load(&self) -> Result<FinanceConfig> {
        FinanceConfig::load(&self.path)
    }

    fn save(&self, config: &FinanceConfig) -> Result<()> {
        config.save(&self.path)
    }
}
