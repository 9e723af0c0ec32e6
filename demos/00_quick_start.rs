/// quick start - bill a student and take two payments
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use fee_ledger_rs::{
    FinanceConfig, InMemoryConfigRepository, InMemoryLedgerStore, LedgerService, Money, PaymentRequest,
    SafeTimeProvider, StaffCredential, StaffRole, StaffRoster, Student, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fee_ledger_rs::init_tracing();

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap()));
    let controller = time.test_control().unwrap();

    let config = FinanceConfig::new()
        .with_class_bill("JHS 1", "School Fees", Money::from_major(500))
        .with_receipt_message("Thank you");

    let service = LedgerService::new(
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(InMemoryConfigRepository::new(config)),
        Arc::new(StaffRoster::new().with_member("STF-001", "Esi Bursar", StaffRole::Bursar)),
    );

    let student = Student::new("SCH-0001", "Kwame Asante", "JHS 1");
    let id = student.id;
    service.register_student(student)?;

    let bursar = StaffCredential::new("STF-001");

    let receipt = service.process_payment(&bursar, &PaymentRequest::new(id, "School Fees", Money::from_major(300), true), &time)?;
    println!("{} paid {}, balance {} ({})", receipt.learner.name, receipt.amounts.amount_paid, receipt.amounts.current_balance, receipt.status);

    controller.advance(chrono::Duration::days(14));

    let receipt = service.process_payment(&bursar, &PaymentRequest::new(id, "School Fees", Money::from_major(200), false), &time)?;
    println!("{} paid {}, balance {} ({})", receipt.learner.name, receipt.amounts.amount_paid, receipt.amounts.current_balance, receipt.status);
    println!("fees cleared: {}", receipt.learner.is_fees_cleared);

    Ok(())
}
