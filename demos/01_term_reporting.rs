/// term reporting - window totals, defaulters and reconciliation
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use fee_ledger_rs::{
    FinanceConfig, InMemoryConfigRepository, InMemoryLedgerStore, LedgerService, Money, PaymentRequest,
    SafeTimeProvider, StaffCredential, StaffRole, StaffRoster, Student, TaxConfig, TimeSource, Window,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 2, 26, 8, 0, 0).unwrap()));
    let controller = time.test_control().unwrap();

    let config = FinanceConfig::new()
        .with_class_bill("Basic 6", "School Fees", Money::from_major(450))
        .with_class_bill("Basic 6", "Feeding", Money::from_major(120))
        .with_class_bill("JHS 2", "School Fees", Money::from_major(600))
        .with_tax(TaxConfig::ghana_standard());

    let service = LedgerService::new(
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(InMemoryConfigRepository::new(config)),
        Arc::new(
            StaffRoster::new()
                .with_member("STF-001", "Esi Bursar", StaffRole::Bursar)
                .with_member("STF-004", "Kofi Accounts", StaffRole::Accountant),
        ),
    );

    let learners = [
        Student::new("B6-001", "Ama Serwaa", "Basic 6"),
        Student::new("B6-002", "Kojo Antwi", "Basic 6"),
        Student::new("J2-001", "Adjoa Frimpong", "JHS 2"),
        Student::new("J2-002", "Yaw Ofori", "JHS 2"),
    ];
    let ids: Vec<_> = learners.iter().map(|s| s.id).collect();
    for learner in learners {
        service.register_student(learner)?;
    }

    let esi = StaffCredential::new("STF-001");
    let kofi = StaffCredential::new("STF-004");

    service.process_payment(&esi, &PaymentRequest::new(ids[0], "School Fees", Money::from_major(300), true), &time)?;
    service.process_payment(&kofi, &PaymentRequest::new(ids[1], "School Fees", "544.50".parse()?, true), &time)?;

    // into march, same sunday-to-saturday week
    controller.advance(Duration::days(4));
    service.process_payment(&esi, &PaymentRequest::new(ids[2], "School Fees", Money::from_major(726), true), &time)?;
    service.process_payment(&kofi, &PaymentRequest::new(ids[0], "Feeding", Money::from_major(100), true), &time)?;

    let reports = service.aggregation()?;
    let today = time.now().date_naive();

    for window in Window::ALL {
        let totals = reports.window_totals(window, today);
        println!(
            "{:>5}: {} transactions, paid {}, billed {}, tax {}",
            window.label(),
            totals.transaction_count,
            totals.amount_paid,
            totals.new_bill,
            totals.tax_amount
        );
    }

    println!("\ndefaulters:");
    for defaulter in reports.defaulters() {
        println!("  {} {} ({}) owes {}", defaulter.serial_id, defaulter.name, defaulter.current_class, defaulter.outstanding);
    }

    println!("\nclosing arrears: {}", reports.closing_arrears());
    for collection in reports.collections_by_staff(Window::Term, today) {
        println!("  {} collected {} in {} transactions", collection.staff_name, collection.amount, collection.transaction_count);
    }

    let report = reports.reconcile();
    println!("\nreconciled {} of {} records, consistent: {}", report.matched, report.ledger_records, report.is_consistent());

    Ok(())
}
