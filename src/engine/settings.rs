// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{Settings, TaxBracket};

/// 2025 income tax brackets, used when a fresh database is seeded.
pub fn default_tax_brackets() -> Vec<TaxBracket> {
    vec![
        TaxBracket {
            limit: Some(dec!(110000)),
            rate: dec!(0.15),
        },
        TaxBracket {
            limit: Some(dec!(230000)),
            rate: dec!(0.20),
        },
        TaxBracket {
            limit: Some(dec!(580000)),
            rate: dec!(0.27),
        },
        TaxBracket {
            limit: Some(dec!(3000000)),
            rate: dec!(0.35),
        },
        TaxBracket {
            limit: None,
            rate: dec!(0.40),
        },
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sgk_rate: dec!(0.14),
            unemployment_rate: dec!(0.01),
            stamp_tax_rate: dec!(0.00759),
            minimum_wage: dec!(20002.50),
            daily_work_hours: dec!(8),
            overtime_multiplier: dec!(1.5),
            weekend_multiplier: dec!(2.0),
            holiday_multiplier: dec!(2.0),
            tax_brackets: default_tax_brackets(),
        }
    }
}

/// Brackets must be non-empty, strictly ascending, and end with exactly one
/// unbounded bracket. Nothing is reordered or patched up.
pub fn validate_brackets(brackets: &[TaxBracket]) -> PayrollResult<()> {
    let Some(last) = brackets.last() else {
        return Err(PayrollError::config("tax brackets are empty"));
    };
    if last.limit.is_some() {
        return Err(PayrollError::config(
            "last tax bracket must have no limit (null)",
        ));
    }

    let mut prev: Option<Decimal> = None;
    for (i, b) in brackets.iter().enumerate() {
        if b.rate < Decimal::ZERO {
            return Err(PayrollError::config(format!(
                "tax bracket {} has negative rate {}",
                i + 1,
                b.rate
            )));
        }
        match b.limit {
            None if i + 1 != brackets.len() => {
                return Err(PayrollError::config(format!(
                    "tax bracket {} has no limit but is not the last bracket",
                    i + 1
                )));
            }
            None => {}
            Some(limit) => {
                if limit <= Decimal::ZERO {
                    return Err(PayrollError::config(format!(
                        "tax bracket {} limit {} must be positive",
                        i + 1,
                        limit
                    )));
                }
                if let Some(p) = prev {
                    if limit <= p {
                        return Err(PayrollError::config(format!(
                            "tax bracket limits must be strictly increasing ({} after {})",
                            limit, p
                        )));
                    }
                }
                prev = Some(limit);
            }
        }
    }
    Ok(())
}

impl Settings {
    pub fn validate(&self) -> PayrollResult<()> {
        let non_negative = [
            ("sgkRate", self.sgk_rate),
            ("unemploymentRate", self.unemployment_rate),
            ("stampTaxRate", self.stamp_tax_rate),
            ("minimumWage", self.minimum_wage),
            ("overtimeMultiplier", self.overtime_multiplier),
            ("weekendMultiplier", self.weekend_multiplier),
            ("holidayMultiplier", self.holiday_multiplier),
        ];
        for (name, v) in non_negative {
            if v < Decimal::ZERO {
                return Err(PayrollError::config(format!(
                    "{} must not be negative (got {})",
                    name, v
                )));
            }
        }
        if self.sgk_rate + self.unemployment_rate > Decimal::ONE {
            return Err(PayrollError::config(
                "sgkRate + unemploymentRate must not exceed 1",
            ));
        }
        if self.daily_work_hours <= Decimal::ZERO {
            return Err(PayrollError::config(format!(
                "dailyWorkHours must be positive (got {})",
                self.daily_work_hours
            )));
        }
        validate_brackets(&self.tax_brackets)
    }
}
