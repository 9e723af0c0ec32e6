use serde::{Deserialize, Serialize};

use crate::config::{ClassBillSchedule, TaxConfig};
use crate::decimal::Money;

/// amount newly owed by one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Charge {
    pub new_bill: Money,
    pub tax_amount: Money,
    pub tax_breakdown: TaxBreakdown,
}

impl Charge {
    pub fn total(&self) -> Money {
        self.new_bill + self.tax_amount
    }
}

/// per-levy split of the tax charged, for receipt display.
/// `Charge::tax_amount` is computed on the combined rate and is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxBreakdown {
    pub vat: Money,
    pub nhil: Money,
    pub getfund_levy: Money,
    pub covid_levy: Money,
}

/// computes new bills and the tax levied on them
#[derive(Debug, Clone, Copy)]
pub struct BillingCalculator {
    tax_config: TaxConfig,
}

impl BillingCalculator {
    pub fn new(tax_config: TaxConfig) -> Self {
        Self { tax_config }
    }

    /// charge for one transaction.
    /// a category missing from the schedule bills nothing
    pub fn compute_charge(
        &self,
        schedule: &ClassBillSchedule,
        category: &str,
        is_end_of_cycle_billing: bool,
    ) -> Charge {
        let new_bill = if is_end_of_cycle_billing {
            schedule.get(category).copied().unwrap_or(Money::ZERO)
        } else {
            Money::ZERO
        };

        let (tax_amount, tax_breakdown) = self.tax_on(new_bill);

        Charge {
            new_bill,
            tax_amount,
            tax_breakdown,
        }
    }

    /// tax due on a bill, zero when tax is disabled or nothing is billed
    pub fn tax_on(&self, new_bill: Money) -> (Money, TaxBreakdown) {
        let tax = &self.tax_config;
        if !tax.is_tax_enabled || !new_bill.is_positive() {
            return (Money::ZERO, TaxBreakdown::default());
        }

        let breakdown = TaxBreakdown {
            vat: new_bill.percentage(tax.vat_rate),
            nhil: new_bill.percentage(tax.nhil_rate),
            getfund_levy: new_bill.percentage(tax.getfund_levy_rate),
            covid_levy: new_bill.percentage(tax.covid_levy_rate),
        };

        (new_bill.percentage(tax.total_rate()), breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use rust_decimal_macros::dec;

    fn schedule() -> ClassBillSchedule {
        let mut schedule = ClassBillSchedule::new();
        schedule.insert("School Fees".to_string(), Money::from_major(500));
        schedule.insert("Feeding".to_string(), Money::from_decimal(dec!(33.33)));
        schedule
    }

    #[test]
    fn test_end_of_cycle_bills_schedule_amount() {
        let calc = BillingCalculator::new(TaxConfig::default());
        let charge = calc.compute_charge(&schedule(), "School Fees", true);
        assert_eq!(charge.new_bill, Money::from_major(500));
        assert_eq!(charge.tax_amount, Money::ZERO);
        assert_eq!(charge.total(), Money::from_major(500));
    }

    #[test]
    fn test_arrears_only_bills_nothing() {
        let calc = BillingCalculator::new(TaxConfig::ghana_standard());
        let charge = calc.compute_charge(&schedule(), "School Fees", false);
        assert_eq!(charge, Charge::default());
    }

    #[test]
    fn test_missing_category_bills_nothing() {
        let calc = BillingCalculator::new(TaxConfig::ghana_standard());
        let charge = calc.compute_charge(&schedule(), "Transport", true);
        assert_eq!(charge.new_bill, Money::ZERO);
        assert_eq!(charge.tax_amount, Money::ZERO);
    }

    #[test]
    fn test_standard_levies() {
        let calc = BillingCalculator::new(TaxConfig::ghana_standard());
        let charge = calc.compute_charge(&schedule(), "School Fees", true);

        assert_eq!(charge.tax_amount, Money::from_major(105));
        assert_eq!(charge.tax_breakdown.vat, Money::from_major(75));
        assert_eq!(charge.tax_breakdown.nhil, Money::from_decimal(dec!(12.5)));
        assert_eq!(charge.tax_breakdown.getfund_levy, Money::from_decimal(dec!(12.5)));
        assert_eq!(charge.tax_breakdown.covid_levy, Money::from_major(5));
        assert_eq!(charge.total(), Money::from_major(605));
    }

    #[test]
    fn test_tax_rounds_to_currency_precision() {
        let calc = BillingCalculator::new(TaxConfig::ghana_standard());
        // 33.33 * 21% = 6.9993
        let charge = calc.compute_charge(&schedule(), "Feeding", true);
        assert_eq!(charge.tax_amount, Money::from_decimal(dec!(7.00)));
    }

    #[test]
    fn test_disabled_tax_is_zero_for_any_rates() {
        let tax = TaxConfig {
            vat_rate: Rate::from_percentage(99),
            nhil_rate: Rate::from_percentage(50),
            getfund_levy_rate: Rate::from_percentage(3),
            covid_levy_rate: Rate::from_percentage(7),
            is_tax_enabled: false,
        };
        let calc = BillingCalculator::new(tax);
        for category in ["School Fees", "Feeding", "Transport"] {
            for end_of_cycle in [true, false] {
                let charge = calc.compute_charge(&schedule(), category, end_of_cycle);
                assert_eq!(charge.tax_amount, Money::ZERO);
            }
        }

        let (tax_amount, _) = BillingCalculator::new(TaxConfig::ghana_standard()).tax_on(Money::ZERO);
        assert_eq!(tax_amount, Money::ZERO);
    }
}
