use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::audit::AuditTrailEntry;
use crate::billing::BillingCalculator;
use crate::config::FinanceConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{ActorIdentity, CategoryPolicy, ProcessedBy, StudentId};

use super::code::TransactionCodeGenerator;
use super::record::{status_for, LedgerRecord, Student};

/// payment request as captured at the terminal
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub student_id: StudentId,
    pub category: String,
    pub amount_paid: Money,
    pub is_end_of_cycle_billing: bool,
}

impl PaymentRequest {
    pub fn new(
        student_id: StudentId,
        category: impl Into<String>,
        amount_paid: Money,
        is_end_of_cycle_billing: bool,
    ) -> Self {
        Self {
            student_id,
            category: category.into(),
            amount_paid,
            is_end_of_cycle_billing,
        }
    }

    /// build from raw terminal input, the amount must parse as a number
    pub fn from_input(
        student_id: StudentId,
        category: impl Into<String>,
        amount_text: &str,
        is_end_of_cycle_billing: bool,
    ) -> Result<Self> {
        let amount_paid = Money::from_str_exact(amount_text).map_err(|_| LedgerError::NonNumericAmount {
            input: amount_text.to_string(),
        })?;
        Ok(Self::new(student_id, category, amount_paid, is_end_of_cycle_billing))
    }
}

/// everything one successful payment produces
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    /// student with the new record appended and clearance recomputed
    pub student: Student,
    pub record: LedgerRecord,
    pub audit_entry: AuditTrailEntry,
}

/// builds the next ledger record for a student
#[derive(Debug, Default)]
pub struct LedgerEngine {
    codes: TransactionCodeGenerator,
}

impl LedgerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(codes: TransactionCodeGenerator) -> Self {
        Self { codes }
    }

    /// apply a payment to a student's ledger.
    ///
    /// the input student is left untouched; the outcome carries the updated
    /// student together with the new record and its paired audit entry.
    /// the caller commits both as one unit.
    pub fn process_payment(
        &self,
        student: &Student,
        request: &PaymentRequest,
        actor: &ActorIdentity,
        config: &FinanceConfig,
        now: DateTime<Utc>,
    ) -> Result<PaymentOutcome> {
        self.validate(student, request, actor, config)?;

        let schedule = config.class_schedule(&student.current_class);
        let charge = BillingCalculator::new(config.tax_config).compute_charge(
            &schedule,
            &request.category,
            request.is_end_of_cycle_billing,
        );

        let balance_bf = student.balance_bf();
        let total_bill = balance_bf
            .checked_add(charge.new_bill)
            .and_then(|t| t.checked_add(charge.tax_amount));
        let current_balance = total_bill.and_then(|t| t.checked_sub(request.amount_paid));
        let (Some(total_bill), Some(current_balance)) = (total_bill, current_balance) else {
            return Err(LedgerError::InvalidPaymentAmount {
                amount: request.amount_paid,
            });
        };

        let date = now.date_naive();
        let time = now.time();
        let transaction_code = self.codes.next_code(date);

        let record = LedgerRecord {
            id: Uuid::new_v4(),
            date,
            time,
            transaction_code: transaction_code.clone(),
            balance_bf,
            new_bill: charge.new_bill,
            tax_amount: charge.tax_amount,
            tax_breakdown: charge.tax_breakdown,
            total_bill,
            amount_paid: request.amount_paid,
            current_balance,
            status: status_for(current_balance),
            category: request.category.clone(),
            processed_by: ProcessedBy::stamp(actor, now),
        };

        let mut updated = student.clone();
        updated.ledger.push(record.clone());
        updated.is_fees_cleared = !current_balance.is_positive();

        let audit_entry = AuditTrailEntry {
            id: Uuid::new_v4(),
            date,
            time,
            staff_id: actor.staff_id.clone(),
            staff_name: actor.staff_name.clone(),
            learner_id: student.id,
            learner_name: student.name.clone(),
            amount: request.amount_paid,
            category: request.category.clone(),
            transaction_code,
        };

        Ok(PaymentOutcome {
            student: updated,
            record,
            audit_entry,
        })
    }

    fn validate(
        &self,
        student: &Student,
        request: &PaymentRequest,
        actor: &ActorIdentity,
        config: &FinanceConfig,
    ) -> Result<()> {
        if request.student_id != student.id {
            return Err(LedgerError::StudentNotFound { id: request.student_id });
        }

        if request.amount_paid.is_negative() || request.amount_paid > Money::MAX_AMOUNT {
            return Err(LedgerError::InvalidPaymentAmount {
                amount: request.amount_paid,
            });
        }

        if !actor.is_present() {
            return Err(LedgerError::MissingActor);
        }

        if config.policy.category_policy == CategoryPolicy::Strict {
            let unknown = !config.has_category(&request.category)
                || (request.is_end_of_cycle_billing
                    && !config.class_schedule(&student.current_class).contains_key(&request.category));
            if unknown {
                return Err(LedgerError::UnknownCategory {
                    category: request.category.clone(),
                    class: student.current_class.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LedgerPolicy, TaxConfig};
    use crate::types::PaymentStatus;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn config() -> FinanceConfig {
        FinanceConfig::new().with_class_bill("JHS 1", "School Fees", Money::from_major(500))
    }

    fn bursar() -> ActorIdentity {
        ActorIdentity::new("STF-001", "Esi Bursar")
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_first_transaction_partial() {
        let engine = LedgerEngine::new();
        let student = Student::new("SCH-0001", "Kwame Asante", "JHS 1");
        let request = PaymentRequest::new(student.id, "School Fees", Money::from_major(300), true);

        let outcome = engine.process_payment(&student, &request, &bursar(), &config(), at(8)).unwrap();
        let record = &outcome.record;

        assert_eq!(record.balance_bf, Money::ZERO);
        assert_eq!(record.new_bill, Money::from_major(500));
        assert_eq!(record.tax_amount, Money::ZERO);
        assert_eq!(record.total_bill, Money::from_major(500));
        assert_eq!(record.current_balance, Money::from_major(200));
        assert_eq!(record.status, PaymentStatus::Partial);
        assert!(!outcome.student.is_fees_cleared);
        assert_eq!(outcome.student.ledger.len(), 1);

        // input untouched
        assert!(student.ledger.is_empty());
    }

    #[test]
    fn test_arrears_payment_clears_student() {
        let engine = LedgerEngine::new();
        let student = Student::new("SCH-0001", "Kwame Asante", "JHS 1");
        let first = engine
            .process_payment(&student, &PaymentRequest::new(student.id, "School Fees", Money::from_major(300), true), &bursar(), &config(), at(8))
            .unwrap();

        let student = first.student;
        let second = engine
            .process_payment(&student, &PaymentRequest::new(student.id, "School Fees", Money::from_major(200), false), &bursar(), &config(), at(9))
            .unwrap();

        assert_eq!(second.record.balance_bf, Money::from_major(200));
        assert_eq!(second.record.new_bill, Money::ZERO);
        assert_eq!(second.record.total_bill, Money::from_major(200));
        assert_eq!(second.record.current_balance, Money::ZERO);
        assert_eq!(second.record.status, PaymentStatus::Full);
        assert!(second.student.is_fees_cleared);
        assert!(second.student.verify_ledger());
    }

    #[test]
    fn test_tax_added_to_total_bill() {
        let engine = LedgerEngine::new();
        let config = config().with_tax(TaxConfig::ghana_standard());
        let student = Student::new("SCH-0002", "Abena Owusu", "JHS 1");
        let request = PaymentRequest::new(student.id, "School Fees", Money::ZERO, true);

        let outcome = engine.process_payment(&student, &request, &bursar(), &config, at(8)).unwrap();
        assert_eq!(outcome.record.tax_amount, Money::from_decimal(dec!(105.00)));
        assert_eq!(outcome.record.total_bill, Money::from_major(605));
        assert_eq!(outcome.record.current_balance, Money::from_major(605));
    }

    #[test]
    fn test_overpayment_leaves_credit() {
        let engine = LedgerEngine::new();
        let student = Student::new("SCH-0003", "Yaw Boateng", "JHS 1");
        let first = engine
            .process_payment(&student, &PaymentRequest::new(student.id, "School Fees", Money::from_major(300), true), &bursar(), &config(), at(8))
            .unwrap();

        let second = engine
            .process_payment(&first.student, &PaymentRequest::new(student.id, "School Fees", Money::from_major(250), false), &bursar(), &config(), at(9))
            .unwrap();

        assert_eq!(second.record.current_balance, Money::from_major(-50));
        assert_eq!(second.record.status, PaymentStatus::Full);
        assert!(second.student.is_fees_cleared);
        assert!(!second.student.is_defaulter());

        // credit carries forward into the next bill
        let third = engine
            .process_payment(&second.student, &PaymentRequest::new(student.id, "School Fees", Money::ZERO, true), &bursar(), &config(), at(10))
            .unwrap();
        assert_eq!(third.record.balance_bf, Money::from_major(-50));
        assert_eq!(third.record.current_balance, Money::from_major(450));
    }

    #[test]
    fn test_audit_entry_pairs_with_record() {
        let engine = LedgerEngine::new();
        let student = Student::new("SCH-0004", "Efua Sarpong", "JHS 1");
        let request = PaymentRequest::new(student.id, "School Fees", Money::from_major(120), true);
        let outcome = engine.process_payment(&student, &request, &bursar(), &config(), at(8)).unwrap();

        let entry = &outcome.audit_entry;
        assert_eq!(entry.transaction_code, outcome.record.transaction_code);
        assert_eq!(entry.amount, outcome.record.amount_paid);
        assert_eq!(entry.learner_id, student.id);
        assert_eq!(entry.learner_name, "Efua Sarpong");
        assert_eq!(entry.staff_id, "STF-001");
        assert_eq!(entry.date, outcome.record.date);
        assert_eq!(outcome.record.processed_by.staff_name, "Esi Bursar");
        assert_eq!(outcome.record.processed_by.time, at(8));
    }

    #[test]
    fn test_validation_failures() {
        let engine = LedgerEngine::new();
        let student = Student::new("SCH-0005", "Kojo Mensah", "JHS 1");

        let negative = PaymentRequest::new(student.id, "School Fees", Money::from_major(-1), true);
        assert!(matches!(
            engine.process_payment(&student, &negative, &bursar(), &config(), at(8)),
            Err(LedgerError::InvalidPaymentAmount { .. })
        ));

        let request = PaymentRequest::new(student.id, "School Fees", Money::from_major(10), true);
        let nobody = ActorIdentity::new("  ", "");
        assert_eq!(
            engine.process_payment(&student, &request, &nobody, &config(), at(8)),
            Err(LedgerError::MissingActor)
        );

        let stranger = PaymentRequest::new(Uuid::new_v4(), "School Fees", Money::from_major(10), true);
        assert!(matches!(
            engine.process_payment(&student, &stranger, &bursar(), &config(), at(8)),
            Err(LedgerError::StudentNotFound { .. })
        ));

        assert!(matches!(
            PaymentRequest::from_input(student.id, "School Fees", "ten cedis", true),
            Err(LedgerError::NonNumericAmount { .. })
        ));
        let parsed = PaymentRequest::from_input(student.id, "School Fees", "99.50", true).unwrap();
        assert_eq!(parsed.amount_paid, Money::from_decimal(dec!(99.50)));
    }

    #[test]
    fn test_out_of_range_amounts_rejected_not_panicking() {
        let engine = LedgerEngine::new();
        let mut student = Student::new("SCH-0007", "Kwaku Ananse", "JHS 1");

        let huge = PaymentRequest::from_input(student.id, "School Fees", "79228162514264337593543950335", false).unwrap();
        for _ in 0..2 {
            assert!(matches!(
                engine.process_payment(&student, &huge, &bursar(), &config(), at(8)),
                Err(LedgerError::InvalidPaymentAmount { .. })
            ));
        }

        let ceiling = PaymentRequest::new(student.id, "School Fees", Money::MAX_AMOUNT, false);
        student = engine
            .process_payment(&student, &ceiling, &bursar(), &config(), at(8))
            .unwrap()
            .student;
        assert_eq!(student.outstanding(), -Money::MAX_AMOUNT);

        // a carried balance at the edge of the decimal range cannot take another bill
        if let Some(last) = student.ledger.last_mut() {
            last.current_balance = Money::from_decimal(Decimal::MAX);
        }
        let billed = PaymentRequest::new(student.id, "School Fees", Money::ZERO, true);
        assert!(matches!(
            engine.process_payment(&student, &billed, &bursar(), &config(), at(9)),
            Err(LedgerError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_category_policy() {
        let engine = LedgerEngine::new();
        let student = Student::new("SCH-0006", "Akosua Darko", "JHS 1");
        let request = PaymentRequest::new(student.id, "Transport", Money::from_major(10), true);

        // lenient: bills nothing
        let outcome = engine.process_payment(&student, &request, &bursar(), &config(), at(8)).unwrap();
        assert_eq!(outcome.record.new_bill, Money::ZERO);
        assert_eq!(outcome.record.current_balance, Money::from_major(-10));

        let strict = config().with_policy(LedgerPolicy {
            category_policy: CategoryPolicy::Strict,
            ..LedgerPolicy::default()
        });
        assert!(matches!(
            engine.process_payment(&student, &request, &bursar(), &strict, at(8)),
            Err(LedgerError::UnknownCategory { .. })
        ));

        // a configured category without a bill for this class is still refused for billing
        let strict = strict.with_category("Transport");
        assert!(engine.process_payment(&student, &request, &bursar(), &strict, at(8)).is_err());

        // but arrears repayment against it is fine
        let repay = PaymentRequest::new(student.id, "Transport", Money::from_major(10), false);
        assert!(engine.process_payment(&student, &repay, &bursar(), &strict, at(8)).is_ok());
    }

    #[test]
    fn test_balance_chain_over_many_transactions() {
        let engine = LedgerEngine::new();
        let config = config().with_tax(TaxConfig::ghana_standard());
        let mut student = Student::new("SCH-0007", "Nana Adjei", "JHS 1");

        let payments = [
            (dec!(100), true),
            (dec!(250.75), false),
            (dec!(0), true),
            (dec!(999.99), false),
            (dec!(12.34), true),
            (dec!(600), false),
        ];
        for (day, (amount, bill)) in payments.iter().enumerate() {
            let request = PaymentRequest::new(student.id, "School Fees", Money::from_decimal(*amount), *bill);
            student = engine
                .process_payment(&student, &request, &bursar(), &config, at(day as u32 + 1))
                .unwrap()
                .student;
        }

        assert_eq!(student.ledger.len(), payments.len());
        assert_eq!(student.ledger[0].balance_bf, Money::ZERO);
        for pair in student.ledger.windows(2) {
            assert_eq!(pair[1].balance_bf, pair[0].current_balance);
        }
        assert!(student.ledger.iter().all(LedgerRecord::is_balanced));
        assert!(student.verify_ledger());
    }
}
