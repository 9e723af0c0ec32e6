use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info, warn};

use crate::aggregation::AggregationService;
use crate::auth::{Authorizer, StaffCredential};
use crate::config::FinanceConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::{LedgerEngine, PaymentOutcome, PaymentRequest, Student};
use crate::receipt::Receipt;
use crate::repository::{ConfigRepository, LedgerCommit, LedgerStore, StudentRepository};
use crate::types::{ActorIdentity, StudentId};

/// payment terminal backend: authorizes, applies and commits payments
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    config: Arc<dyn ConfigRepository>,
    authorizer: Arc<dyn Authorizer>,
    engine: LedgerEngine,
    student_locks: Mutex<HashMap<StudentId, Arc<Mutex<()>>>>,
    events: Mutex<EventStore>,
}

impl LedgerService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        config: Arc<dyn ConfigRepository>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self::with_engine(store, config, authorizer, LedgerEngine::new())
    }

    pub fn with_engine(
        store: Arc<dyn LedgerStore>,
        config: Arc<dyn ConfigRepository>,
        authorizer: Arc<dyn Authorizer>,
        engine: LedgerEngine,
    ) -> Self {
        Self {
            store,
            config,
            authorizer,
            engine,
            student_locks: Mutex::new(HashMap::new()),
            events: Mutex::new(EventStore::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn register_student(&self, student: Student) -> Result<()> {
        self.store.insert(student)
    }

    pub fn finance_config(&self) -> Result<FinanceConfig> {
        self.config.load()
    }

    /// replace the finance configuration; recorded history is unaffected
    pub fn update_finance_config(&self, config: &FinanceConfig) -> Result<()> {
        self.config.save(config)?;
        info!(categories = config.categories.len(), "finance configuration updated");
        Ok(())
    }

    /// process a payment with system time
    pub fn process_payment_now(&self, credential: &StaffCredential, request: &PaymentRequest) -> Result<Receipt> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.process_payment(credential, request, &time)
    }

    /// authorize, apply and commit one payment.
    ///
    /// calls for the same student run one at a time; a commit that loses a
    /// race or draws a used transaction code is recomputed from fresh state.
    pub fn process_payment(
        &self,
        credential: &StaffCredential,
        request: &PaymentRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<Receipt> {
        let result = self.try_process_payment(credential, request, time_provider);
        if let Err(err) = &result {
            warn!(student_id = %request.student_id, staff_id = %credential.staff_id, error = %err, "payment rejected");
        }
        result
    }

    fn try_process_payment(
        &self,
        credential: &StaffCredential,
        request: &PaymentRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<Receipt> {
        let actor = self.authorizer.authorize(credential)?;
        let config = self.config.load()?;

        let lock = self.student_lock(request.student_id)?;
        let result = match lock.lock() {
            Ok(_guard) => self.commit_with_retry(request, &actor, &config, time_provider),
            Err(_) => Err(LedgerError::Storage {
                message: "student lock poisoned".to_string(),
            }),
        };
        self.release_student_lock(request.student_id, lock);
        result
    }

    fn commit_with_retry(
        &self,
        request: &PaymentRequest,
        actor: &ActorIdentity,
        config: &FinanceConfig,
        time_provider: &SafeTimeProvider,
    ) -> Result<Receipt> {
        let attempts = config.policy.max_commit_retries.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            let student = self
                .store
                .get(request.student_id)?
                .ok_or(LedgerError::StudentNotFound { id: request.student_id })?;

            let outcome = self
                .engine
                .process_payment(&student, request, actor, config, time_provider.now())?;

            let commit = LedgerCommit {
                student: outcome.student.clone(),
                audit_entry: outcome.audit_entry.clone(),
                expected_len: student.ledger.len(),
            };

            match self.store.commit(commit) {
                Ok(()) => {
                    self.emit_events(&student, &outcome, time_provider);
                    info!(
                        student_id = %student.id,
                        transaction_code = %outcome.record.transaction_code,
                        amount_paid = %outcome.record.amount_paid,
                        current_balance = %outcome.record.current_balance,
                        status = %outcome.record.status,
                        "payment processed"
                    );
                    return Ok(Receipt::from_record(&outcome.student, &outcome.record, &config.receipt_message));
                }
                Err(err) if err.is_retryable() => {
                    debug!(attempt, error = %err, "retrying payment commit");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or(LedgerError::Storage {
            message: "payment commit attempts exhausted".to_string(),
        }))
    }

    fn student_lock(&self, id: StudentId) -> Result<Arc<Mutex<()>>> {
        let mut locks = self.student_locks.lock().map_err(|_| LedgerError::Storage {
            message: "lock table poisoned".to_string(),
        })?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }

    /// drop the table entry once no other caller holds or waits on it,
    /// so the table only tracks students with payments in flight
    fn release_student_lock(&self, id: StudentId, lock: Arc<Mutex<()>>) {
        let Ok(mut locks) = self.student_locks.lock() else {
            return;
        };
        let idle = locks.get(&id).is_some_and(|held| Arc::ptr_eq(held, &lock)) && Arc::strong_count(&lock) == 2;
        if idle {
            locks.remove(&id);
        }
    }

    fn emit_events(&self, before: &Student, outcome: &PaymentOutcome, time_provider: &SafeTimeProvider) {
        let record = &outcome.record;
        let timestamp = time_provider.now();
        let Ok(mut events) = self.events.lock() else {
            warn!("event store lock poisoned, events dropped");
            return;
        };

        if record.new_bill.is_positive() {
            events.emit(Event::StudentBilled {
                student_id: before.id,
                category: record.category.clone(),
                new_bill: record.new_bill,
                tax_amount: record.tax_amount,
                timestamp,
            });
        }

        events.emit(Event::PaymentRecorded {
            student_id: before.id,
            transaction_code: record.transaction_code.clone(),
            amount_paid: record.amount_paid,
            current_balance: record.current_balance,
            status: record.status,
            staff_id: record.processed_by.staff_id.clone(),
            timestamp,
        });

        match (before.is_fees_cleared, outcome.student.is_fees_cleared) {
            (false, true) => events.emit(Event::FeesCleared {
                student_id: before.id,
                credit: (-record.current_balance).max(Money::ZERO),
                timestamp,
            }),
            (true, false) => events.emit(Event::ClearanceRevoked {
                student_id: before.id,
                outstanding: record.current_balance,
                timestamp,
            }),
            _ => {}
        }
    }

    /// drain events emitted since the last call
    pub fn take_events(&self) -> Vec<Event> {
        self.events.lock().map(|mut e| e.take_events()).unwrap_or_default()
    }

    /// reporting over a consistent snapshot of every ledger
    pub fn aggregation(&self) -> Result<AggregationService> {
        let policy = self.config.load()?.policy.arrears_policy;
        Ok(AggregationService::new(self.store.snapshot()?, policy))
    }
}
