// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::checked;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{DayEntry, DayStatus};

/// Which multiplier an overtime hour is paid at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvertimeKind {
    Weekday,
    Weekend,
    Holiday,
}

/// One timesheet cell after normalization. Overtime details only survive on
/// overtime days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedDay {
    Plain(DayStatus),
    Overtime { hours: Decimal, kind: OvertimeKind },
}

impl NormalizedDay {
    pub fn from_entry(day: u32, entry: &DayEntry) -> PayrollResult<Self> {
        match *entry {
            DayEntry::Simple(DayStatus::Overtime) => Ok(NormalizedDay::Overtime {
                hours: Decimal::ZERO,
                kind: OvertimeKind::Weekday,
            }),
            DayEntry::Simple(status) => Ok(NormalizedDay::Plain(status)),
            DayEntry::Detailed {
                status: DayStatus::Overtime,
                hours,
                is_weekend,
                is_holiday,
            } => {
                let hours = hours.unwrap_or(Decimal::ZERO);
                if hours < Decimal::ZERO {
                    return Err(PayrollError::invalid(format!(
                        "day {}: overtime hours must not be negative (got {})",
                        day, hours
                    )));
                }
                // holiday > weekend > weekday
                let kind = if is_holiday {
                    OvertimeKind::Holiday
                } else if is_weekend {
                    OvertimeKind::Weekend
                } else {
                    OvertimeKind::Weekday
                };
                Ok(NormalizedDay::Overtime { hours, kind })
            }
            DayEntry::Detailed { status, .. } => Ok(NormalizedDay::Plain(status)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCounts {
    pub worked: u32,
    pub overtime_days: u32,
    pub paid_leave: u32,
    pub unpaid_leave: u32,
    pub sick_leave: u32,
    pub weekend: u32,
    pub public_holiday: u32,
    pub not_worked: u32,
    pub weekday_overtime_hours: Decimal,
    pub weekend_overtime_hours: Decimal,
    pub holiday_overtime_hours: Decimal,
}

impl DayCounts {
    /// Days paid at the regular daily rate.
    pub fn paid_days(&self) -> u32 {
        self.worked + self.paid_leave + self.weekend + self.public_holiday
    }

    pub fn unpaid_days(&self) -> u32 {
        self.unpaid_leave + self.sick_leave + self.not_worked
    }

    fn add(&mut self, day: NormalizedDay) -> PayrollResult<()> {
        match day {
            NormalizedDay::Overtime { hours, kind } => {
                self.worked += 1;
                self.overtime_days += 1;
                let bucket = match kind {
                    OvertimeKind::Holiday => &mut self.holiday_overtime_hours,
                    OvertimeKind::Weekend => &mut self.weekend_overtime_hours,
                    OvertimeKind::Weekday => &mut self.weekday_overtime_hours,
                };
                *bucket = checked(bucket.checked_add(hours), "overtime hours")?;
            }
            NormalizedDay::Plain(status) => match status {
                DayStatus::Worked => self.worked += 1,
                DayStatus::NotWorked => self.not_worked += 1,
                DayStatus::PaidLeave => self.paid_leave += 1,
                DayStatus::UnpaidLeave => self.unpaid_leave += 1,
                DayStatus::SickLeave => self.sick_leave += 1,
                DayStatus::Weekend => self.weekend += 1,
                DayStatus::PublicHoliday => self.public_holiday += 1,
                DayStatus::Overtime => {
                    self.worked += 1;
                    self.overtime_days += 1;
                }
            },
        }
        Ok(())
    }
}

/// Reduce a month of day entries to counts. Days missing from the map count
/// toward nothing; keys outside `1..=days_in_month` are rejected.
pub fn aggregate(
    days: &BTreeMap<u32, DayEntry>,
    days_in_month: u32,
) -> PayrollResult<DayCounts> {
    let mut counts = DayCounts::default();
    for (&day, entry) in days {
        if day == 0 || day > days_in_month {
            return Err(PayrollError::invalid(format!(
                "day {} is outside the month (1..={})",
                day, days_in_month
            )));
        }
        counts.add(NormalizedDay::from_entry(day, entry)?)?;
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn days(entries: Vec<(u32, DayEntry)>) -> BTreeMap<u32, DayEntry> {
        entries.into_iter().collect()
    }

    #[test]
    fn empty_map_counts_nothing() {
        let c = aggregate(&BTreeMap::new(), 30).unwrap();
        assert_eq!(c, DayCounts::default());
        assert_eq!(c.paid_days(), 0);
    }

    #[test]
    fn weekend_overtime_goes_to_weekend_bucket_only() {
        let c = aggregate(
            &days(vec![(6, DayEntry::overtime(dec!(3), true, false))]),
            31,
        )
        .unwrap();
        assert_eq!(c.worked, 1);
        assert_eq!(c.overtime_days, 1);
        assert_eq!(c.weekend_overtime_hours, dec!(3));
        assert_eq!(c.weekday_overtime_hours, Decimal::ZERO);
        assert_eq!(c.holiday_overtime_hours, Decimal::ZERO);
    }

    #[test]
    fn holiday_wins_over_weekend() {
        let c = aggregate(
            &days(vec![(1, DayEntry::overtime(dec!(4), true, true))]),
            31,
        )
        .unwrap();
        assert_eq!(c.holiday_overtime_hours, dec!(4));
        assert_eq!(c.weekend_overtime_hours, Decimal::ZERO);
    }

    #[test]
    fn paid_and_unpaid_split() {
        let c = aggregate(
            &days(vec![
                (1, DayEntry::Simple(DayStatus::Worked)),
                (2, DayEntry::Simple(DayStatus::PaidLeave)),
                (3, DayEntry::Simple(DayStatus::Weekend)),
                (4, DayEntry::Simple(DayStatus::PublicHoliday)),
                (5, DayEntry::Simple(DayStatus::UnpaidLeave)),
                (6, DayEntry::Simple(DayStatus::SickLeave)),
                (7, DayEntry::Simple(DayStatus::NotWorked)),
                (8, DayEntry::Simple(DayStatus::Overtime)),
            ]),
            30,
        )
        .unwrap();
        assert_eq!(c.paid_days(), 5);
        assert_eq!(c.unpaid_days(), 3);
        assert_eq!(c.overtime_days, 1);
        assert_eq!(c.weekday_overtime_hours, Decimal::ZERO);
    }

    #[test]
    fn extra_fields_on_regular_day_are_ignored() {
        let entry = DayEntry::Detailed {
            status: DayStatus::Worked,
            hours: Some(dec!(5)),
            is_weekend: true,
            is_holiday: false,
        };
        let c = aggregate(&days(vec![(2, entry)]), 28).unwrap();
        assert_eq!(c.worked, 1);
        assert_eq!(c.overtime_days, 0);
        assert_eq!(c.weekend_overtime_hours, Decimal::ZERO);
    }

    #[test]
    fn rejects_day_outside_month() {
        let err = aggregate(&days(vec![(30, DayEntry::Simple(DayStatus::Worked))]), 28)
            .unwrap_err();
        assert!(matches!(err, PayrollError::InvalidInput(_)));
        let err = aggregate(&days(vec![(0, DayEntry::Simple(DayStatus::Worked))]), 28)
            .unwrap_err();
        assert!(matches!(err, PayrollError::InvalidInput(_)));
    }

    #[test]
    fn rejects_negative_hours() {
        let err = aggregate(
            &days(vec![(3, DayEntry::overtime(dec!(-1), false, false))]),
            31,
        )
        .unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn hour_sum_out_of_range_is_an_error() {
        let huge = DayEntry::overtime(Decimal::MAX, true, false);
        let err = aggregate(&days(vec![(1, huge.clone()), (2, huge)]), 31).unwrap_err();
        assert!(matches!(err, PayrollError::InvalidInput(_)));
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn parses_mixed_wire_forms() {
        let raw = r#"{"1":"worked","2":{"status":"overtime","hours":2.5,"isHoliday":true},"3":"sickLeave"}"#;
        let parsed: BTreeMap<u32, DayEntry> = serde_json::from_str(raw).unwrap();
        let c = aggregate(&parsed, 31).unwrap();
        assert_eq!(c.worked, 2);
        assert_eq!(c.sick_leave, 1);
        assert_eq!(c.holiday_overtime_hours, dec!(2.5));
    }
}
