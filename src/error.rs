// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by the payroll engine. The engine never retries or
/// auto-corrects; callers turn these into user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayrollError {
    /// Missing or out-of-range input: absent employee/settings, non-positive
    /// salary, negative hours, a day outside the month.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Settings that cannot be used as-is, e.g. malformed tax brackets.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PayrollError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PayrollError::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        PayrollError::Configuration(msg.into())
    }
}

pub type PayrollResult<T> = std::result::Result<T, PayrollError>;

/// Turns an absent input into `InvalidInput` instead of a silent zero payroll.
pub fn require<T>(value: Option<T>, what: &str) -> PayrollResult<T> {
    value.ok_or_else(|| PayrollError::invalid(format!("{} is missing", what)))
}
