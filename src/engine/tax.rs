// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::checked;
use super::settings::validate_brackets;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{Settings, TaxBracket};

/// The part of one month's base that fell into a single bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSlice {
    /// Cumulative yearly income where this slice starts.
    pub from: Decimal,
    pub to: Decimal,
    pub rate: Decimal,
    pub tax: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxWalk {
    pub tax: Decimal,
    pub slices: Vec<BracketSlice>,
}

/// Walk the brackets from `previous_cumulative` upward, taxing `base`.
///
/// A month whose income crosses a limit is split across the brackets on
/// either side of it; brackets already filled by earlier months are skipped.
pub fn progressive_tax_walk(
    base: Decimal,
    previous_cumulative: Decimal,
    brackets: &[TaxBracket],
) -> PayrollResult<TaxWalk> {
    if base < Decimal::ZERO {
        return Err(PayrollError::invalid(format!(
            "income tax base must not be negative (got {})",
            base
        )));
    }
    if previous_cumulative < Decimal::ZERO {
        return Err(PayrollError::invalid(format!(
            "previous cumulative income must not be negative (got {})",
            previous_cumulative
        )));
    }
    validate_brackets(brackets)?;

    let mut walk = TaxWalk::default();
    let mut remaining = base;
    let mut cumulative = previous_cumulative;

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }
        let taxable = match bracket.limit {
            Some(limit) => remaining.min((limit - cumulative).max(Decimal::ZERO)),
            None => remaining,
        };
        if taxable <= Decimal::ZERO {
            continue;
        }
        let tax = checked(taxable.checked_mul(bracket.rate), "bracket tax")?;
        let to = checked(cumulative.checked_add(taxable), "cumulative income")?;
        walk.slices.push(BracketSlice {
            from: cumulative,
            to,
            rate: bracket.rate,
            tax,
        });
        walk.tax = checked(walk.tax.checked_add(tax), "income tax")?;
        remaining -= taxable;
        cumulative = to;
    }

    debug!(
        %base,
        %previous_cumulative,
        tax = %walk.tax,
        slices = walk.slices.len(),
        "bracket walk"
    );
    Ok(walk)
}

pub fn progressive_tax(
    base: Decimal,
    previous_cumulative: Decimal,
    brackets: &[TaxBracket],
) -> PayrollResult<Decimal> {
    Ok(progressive_tax_walk(base, previous_cumulative, brackets)?.tax)
}

/// Taxes a minimum-wage earner would owe in a month, which every employee
/// is exempted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exemptions {
    pub minimum_wage_income_tax_base: Decimal,
    pub income_tax: Decimal,
    pub stamp_tax: Decimal,
}

/// The income-tax exemption is always walked from a cumulative of zero, so
/// it is the same amount every month of the year.
pub fn minimum_wage_exemptions(settings: &Settings) -> PayrollResult<Exemptions> {
    let mw = settings.minimum_wage;
    let share = |rate: Decimal| checked(mw.checked_mul(rate), "minimum wage deduction");
    let base = mw - share(settings.sgk_rate)? - share(settings.unemployment_rate)?;
    let income_tax = progressive_tax(base, Decimal::ZERO, &settings.tax_brackets)?;
    Ok(Exemptions {
        minimum_wage_income_tax_base: base,
        income_tax,
        stamp_tax: share(settings.stamp_tax_rate)?,
    })
}

pub fn apply_exemption(calculated: Decimal, exemption: Decimal) -> Decimal {
    (calculated - exemption).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn three_brackets() -> Vec<TaxBracket> {
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
                limit: None,
                rate: dec!(0.40),
            },
        ]
    }

    #[test]
    fn splits_month_across_bracket_boundary() {
        let walk =
            progressive_tax_walk(dec!(20000), dec!(100000), &three_brackets()).unwrap();
        assert_eq!(walk.tax, dec!(3500));
        assert_eq!(walk.slices.len(), 2);
        assert_eq!(walk.slices[0].from, dec!(100000));
        assert_eq!(walk.slices[0].to, dec!(110000));
        assert_eq!(walk.slices[1].tax, dec!(2000));
    }

    #[test]
    fn zero_base_is_zero_tax() {
        let walk =
            progressive_tax_walk(Decimal::ZERO, dec!(50000), &three_brackets()).unwrap();
        assert_eq!(walk.tax, Decimal::ZERO);
        assert!(walk.slices.is_empty());
    }

    #[test]
    fn skips_brackets_already_filled() {
        let tax = progressive_tax(dec!(1000), dec!(500000), &three_brackets()).unwrap();
        assert_eq!(tax, dec!(400));
    }

    #[test]
    fn base_reaching_top_bracket_from_zero() {
        // 110000*0.15 + 120000*0.20 + 70000*0.40
        let tax = progressive_tax(dec!(300000), Decimal::ZERO, &three_brackets()).unwrap();
        assert_eq!(tax, dec!(16500) + dec!(24000) + dec!(28000));
    }

    #[test]
    fn monotone_in_base_and_cumulative() {
        let brackets = three_brackets();
        let steps: Vec<Decimal> = (0..=30).map(|i| Decimal::from(i * 10_000)).collect();
        for &cum in &steps {
            let mut last = Decimal::ZERO;
            for &base in &steps {
                let t = progressive_tax(base, cum, &brackets).unwrap();
                assert!(t >= last, "base {} cum {}", base, cum);
                last = t;
            }
        }
        for &base in &steps {
            let mut last = Decimal::ZERO;
            for &cum in &steps {
                let t = progressive_tax(base, cum, &brackets).unwrap();
                assert!(t >= last, "base {} cum {}", base, cum);
                last = t;
            }
        }
    }

    #[test]
    fn rejects_negative_inputs_and_bad_brackets() {
        assert!(matches!(
            progressive_tax(dec!(-1), Decimal::ZERO, &three_brackets()),
            Err(PayrollError::InvalidInput(_))
        ));
        assert!(matches!(
            progressive_tax(dec!(1), dec!(-1), &three_brackets()),
            Err(PayrollError::InvalidInput(_))
        ));
        assert!(matches!(
            progressive_tax(dec!(1), Decimal::ZERO, &[]),
            Err(PayrollError::Configuration(_))
        ));
    }

    #[test]
    fn exemption_uses_zero_cumulative() {
        let settings = Settings::default();
        let ex = minimum_wage_exemptions(&settings).unwrap();
        // 20002.50 * (1 - 0.14 - 0.01) = 17002.125, all in the 15% bracket
        assert_eq!(ex.minimum_wage_income_tax_base, dec!(17002.125));
        assert_eq!(ex.income_tax, dec!(2550.31875));
        assert_eq!(ex.stamp_tax, dec!(151.8189750));
    }

    #[test]
    fn tax_out_of_range_is_an_error() {
        let brackets = vec![TaxBracket {
            limit: None,
            rate: dec!(2),
        }];
        let err = progressive_tax(Decimal::MAX, Decimal::ZERO, &brackets).unwrap_err();
        assert!(matches!(err, PayrollError::InvalidInput(_)));
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn exemption_never_drives_tax_negative() {
        assert_eq!(apply_exemption(dec!(100), dec!(250)), Decimal::ZERO);
        assert_eq!(apply_exemption(dec!(300), dec!(250)), dec!(50));
    }
}
