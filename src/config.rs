use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::{ArrearsPolicy, CategoryPolicy};

/// category name -> standing bill amount for one class
pub type ClassBillSchedule = BTreeMap<String, Money>;

/// finance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceConfig {
    /// billable categories in display order
    pub categories: Vec<String>,
    /// class name -> category -> amount
    pub class_bills: BTreeMap<String, ClassBillSchedule>,
    pub tax_config: TaxConfig,
    pub receipt_message: String,
    #[serde(default)]
    pub policy: LedgerPolicy,
}

/// tax levies charged on new bills, all rates are percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TaxConfig {
    pub vat_rate: Rate,
    pub nhil_rate: Rate,
    pub getfund_levy_rate: Rate,
    pub covid_levy_rate: Rate,
    pub is_tax_enabled: bool,
}

/// engine behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPolicy {
    pub arrears_policy: ArrearsPolicy,
    pub category_policy: CategoryPolicy,
    /// attempts made to commit one payment when the ledger moved underneath it
    pub max_commit_retries: u32,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            arrears_policy: ArrearsPolicy::SignedSum,
            category_policy: CategoryPolicy::Lenient,
            max_commit_retries: 8,
        }
    }
}

impl TaxConfig {
    /// VAT 15%, NHIL 2.5%, GETFund 2.5%, COVID-19 levy 1%
    pub fn ghana_standard() -> Self {
        Self {
            vat_rate: Rate::from_percentage(15),
            nhil_rate: Rate::from_percentage_decimal(dec!(2.5)),
            getfund_levy_rate: Rate::from_percentage_decimal(dec!(2.5)),
            covid_levy_rate: Rate::from_percentage(1),
            is_tax_enabled: true,
        }
    }

    /// combined rate of all levies
    pub fn total_rate(&self) -> Rate {
        [
            self.vat_rate,
            self.nhil_rate,
            self.getfund_levy_rate,
            self.covid_levy_rate,
        ]
        .into_iter()
        .sum()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.is_tax_enabled = enabled;
        self
    }
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FinanceConfig {
    /// empty configuration, tax disabled
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            class_bills: BTreeMap::new(),
            tax_config: TaxConfig::default(),
            receipt_message: String::new(),
            policy: LedgerPolicy::default(),
        }
    }

    /// builder-style category registration
    pub fn with_category(mut self, name: &str) -> Self {
        self.add_category(name);
        self
    }

    /// builder-style bill registration, registers the category too
    pub fn with_class_bill(mut self, class: &str, category: &str, amount: Money) -> Self {
        self.add_category(category);
        self.set_class_bill(class, category, amount);
        self
    }

    pub fn with_tax(mut self, tax_config: TaxConfig) -> Self {
        self.tax_config = tax_config;
        self
    }

    pub fn with_policy(mut self, policy: LedgerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_receipt_message(mut self, message: impl Into<String>) -> Self {
        self.receipt_message = message.into();
        self
    }

    /// add a category, returns false if it already exists
    pub fn add_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.has_category(name) {
            return false;
        }
        self.categories.push(name.to_string());
        true
    }

    /// remove a category and every schedule entry that bills it
    pub fn remove_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c != name);
        for schedule in self.class_bills.values_mut() {
            schedule.remove(name);
        }
        self.categories.len() != before
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// set the standing bill for one class and category
    pub fn set_class_bill(&mut self, class: &str, category: &str, amount: Money) {
        self.class_bills
            .entry(class.to_string())
            .or_default()
            .insert(category.to_string(), amount);
    }

    /// standing bill schedule for a class, empty when the class has none
    pub fn class_schedule(&self, class: &str) -> ClassBillSchedule {
        self.class_bills.get(class).cloned().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        let tax = &self.tax_config;
        for (name, rate) in [
            ("vat", tax.vat_rate),
            ("nhil", tax.nhil_rate),
            ("getfund levy", tax.getfund_levy_rate),
            ("covid levy", tax.covid_levy_rate),
        ] {
            if rate.is_negative() {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!("{} rate cannot be negative: {}", name, rate),
                });
            }
        }

        for (class, schedule) in &self.class_bills {
            for (category, amount) in schedule {
                if amount.is_negative() {
                    return Err(LedgerError::InvalidConfiguration {
                        message: format!("bill for {} / {} cannot be negative: {}", class, category, amount),
                    });
                }
                if *amount > Money::MAX_AMOUNT {
                    return Err(LedgerError::InvalidConfiguration {
                        message: format!("bill for {} / {} exceeds {}: {}", class, category, Money::MAX_AMOUNT, amount),
                    });
                }
                if !self.has_category(category) {
                    return Err(LedgerError::InvalidConfiguration {
                        message: format!("class {} bills unconfigured category {}", class, category),
                    });
                }
            }
        }

        if self.policy.max_commit_retries == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "max_commit_retries must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// parse and validate a json document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FinanceConfig = serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    /// load from a json file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| LedgerError::Storage {
            message: format!("reading {}: {}", path.display(), e),
        })?;
        Self::from_json(&raw)
    }

    /// validate then write to a json file on disk
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| LedgerError::Storage {
            message: format!("writing {}: {}", path.display(), e),
        })
    }
}
