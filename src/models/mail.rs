//! Outbound mail queue model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{MailStatus, MailType};

/// Entity a queued mail refers back to. Stored as
/// `(reference_type, reference_id)` columns at the repository boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MailReference {
    BorrowRequest(i64),
    Loan(i64),
}

impl MailReference {
    pub fn columns(&self) -> (&'static str, i64) {
        match self {
            MailReference::BorrowRequest(id) => ("borrow_request", *id),
            MailReference::Loan(id) => ("loan", *id),
        }
    }

    pub fn from_columns(reference_type: &str, reference_id: i64) -> Option<Self> {
        match reference_type {
            "borrow_request" => Some(MailReference::BorrowRequest(reference_id)),
            "loan" => Some(MailReference::Loan(reference_id)),
            _ => None,
        }
    }
}

/// Queued outbound notification from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MailQueueEntry {
    pub id: i64,
    pub mail_type: MailType,
    pub to_user_id: Option<i64>,
    pub to_email: Option<String>,
    pub subject: String,
    pub body: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    pub scheduled_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub status: MailStatus,
    pub error: Option<String>,
}

/// A notification to enqueue
#[derive(Debug, Clone)]
pub struct NewMail {
    pub mail_type: MailType,
    pub to_user_id: Option<i64>,
    pub to_email: Option<String>,
    pub subject: String,
    pub body: String,
    pub reference: Option<MailReference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_column_mapping_round_trips() {
        for r in [MailReference::BorrowRequest(42), MailReference::Loan(7)] {
            let (ty, id) = r.columns();
            assert_eq!(MailReference::from_columns(ty, id), Some(r));
        }
    }

    #[test]
    fn unknown_reference_type_maps_to_none() {
        assert_eq!(MailReference::from_columns("invoice", 1), None);
    }
}
