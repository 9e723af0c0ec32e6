/// receipt json - what a presentation layer receives after a payment
use std::sync::Arc;

use fee_ledger_rs::{
    FinanceConfig, InMemoryConfigRepository, InMemoryLedgerStore, LedgerService, PaymentRequest, SafeTimeProvider,
    StaffCredential, StaffRole, StaffRoster, Student, TaxConfig, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);

    let config = FinanceConfig::new()
        .with_class_bill("SHS 1", "Tuition", "1250.00".parse()?)
        .with_tax(TaxConfig::ghana_standard())
        .with_receipt_message("Payments are non-refundable");

    let service = LedgerService::new(
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(InMemoryConfigRepository::new(config)),
        Arc::new(StaffRoster::new().with_member("STF-010", "Akua Bursar", StaffRole::Bursar)),
    );

    let student = Student::new("SHS-0042", "Nana Yaa Boakye", "SHS 1");
    let id = student.id;
    service.register_student(student)?;

    // amount as typed at the terminal
    let request = PaymentRequest::from_input(id, "Tuition", "1000", true)?;
    let receipt = service.process_payment(&StaffCredential::new("STF-010"), &request, &time)?;

    println!("{}", receipt.json());
    Ok(())
}
