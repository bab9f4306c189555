//! Loan model and related types

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{LoanStatus, ReturnCondition};

/// Loan from database: one allocated item lent against one request line
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub request_id: i64,
    pub request_item_id: i64,
    pub book_item_id: i64,
    pub approved_from: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_at: Option<NaiveDate>,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
}

/// Loan with catalog context for display
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub request_id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub barcode: String,
    pub approved_from: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_at: Option<NaiveDate>,
    pub status: LoanStatus,
}

/// Return a loan payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnLoan {
    /// Defaults to the current date when omitted
    pub returned_on: Option<NaiveDate>,
    #[serde(default)]
    pub condition: ReturnCondition,
}

/// Due date is a fixed configured offset from the approval date.
pub fn due_date(approved_from: NaiveDate, loan_period_days: i64) -> NaiveDate {
    approved_from + Duration::days(loan_period_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_offsets_from_approval() {
        let from: NaiveDate = "2026-08-29".parse().unwrap();
        assert_eq!(due_date(from, 14), "2026-09-12".parse().unwrap());
        assert_eq!(due_date(from, 0), from);
    }

    #[test]
    fn due_date_crosses_month_boundary() {
        let from: NaiveDate = "2026-12-24".parse().unwrap();
        assert_eq!(due_date(from, 14), "2027-01-07".parse().unwrap());
    }
}
