//! Shared domain enums
//!
//! Every status/role column is a closed enum stored as text. Decoding an
//! unknown value is a hard error rather than a silent fallback.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements Display/FromStr and sqlx text codecs for a unit enum.
macro_rules! pg_text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        concat!("Invalid ", stringify!($name), " value: {}"),
                        other
                    )),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Borrow request status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Expired,
}

pg_text_enum!(RequestStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Cancelled => "CANCELLED",
    Expired => "EXPIRED",
});

impl RequestStatus {
    /// An admin decision (approve/reject) is valid only from PENDING.
    pub fn is_decidable(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }

    /// The requester may cancel only while PENDING.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }
}

// ---------------------------------------------------------------------------
// Physical item status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Available,
    Reserved,
    Loaned,
    Lost,
    Damaged,
}

pg_text_enum!(ItemStatus {
    Available => "AVAILABLE",
    Reserved => "RESERVED",
    Loaned => "LOANED",
    Lost => "LOST",
    Damaged => "DAMAGED",
});

// ---------------------------------------------------------------------------
// Loan status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Borrowed,
    Returned,
    Overdue,
}

pg_text_enum!(LoanStatus {
    Borrowed => "BORROWED",
    Returned => "RETURNED",
    Overdue => "OVERDUE",
});

impl LoanStatus {
    /// A loan still out with the borrower (return is valid).
    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::Borrowed | LoanStatus::Overdue)
    }
}

// ---------------------------------------------------------------------------
// Item condition reported at return time
// ---------------------------------------------------------------------------

/// Condition reported when a loan is returned; decides the item's next status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReturnCondition {
    #[default]
    Good,
    Lost,
    Damaged,
}

impl ReturnCondition {
    /// Item status after the return is recorded.
    pub fn item_status(&self) -> ItemStatus {
        match self {
            ReturnCondition::Good => ItemStatus::Available,
            ReturnCondition::Lost => ItemStatus::Lost,
            ReturnCondition::Damaged => ItemStatus::Damaged,
        }
    }
}

// ---------------------------------------------------------------------------
// Member role / profile status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

pg_text_enum!(Role {
    User => "USER",
    Admin => "ADMIN",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileStatus {
    Pending,
    Active,
    Inactive,
}

pg_text_enum!(ProfileStatus {
    Pending => "PENDING",
    Active => "ACTIVE",
    Inactive => "INACTIVE",
});

// ---------------------------------------------------------------------------
// Mail queue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MailType {
    BorrowAccepted,
    BorrowRejected,
    AccountActivation,
    ReturnReminderAdmin,
}

pg_text_enum!(MailType {
    BorrowAccepted => "BORROW_ACCEPTED",
    BorrowRejected => "BORROW_REJECTED",
    AccountActivation => "ACCOUNT_ACTIVATION",
    ReturnReminderAdmin => "RETURN_REMINDER_ADMIN",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MailStatus {
    Queued,
    Sent,
    Failed,
    Cancelled,
}

pg_text_enum!(MailStatus {
    Queued => "QUEUED",
    Sent => "SENT",
    Failed => "FAILED",
    Cancelled => "CANCELLED",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_status_round_trip() {
        for s in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
            RequestStatus::Expired,
        ] {
            assert_eq!(s.as_str().parse::<RequestStatus>(), Ok(s));
        }
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!("pending".parse::<RequestStatus>().is_err());
        assert!("BROKEN".parse::<ItemStatus>().is_err());
        assert!("".parse::<LoanStatus>().is_err());
        assert!("SUPERUSER".parse::<Role>().is_err());
    }

    #[test]
    fn only_pending_requests_are_decidable_or_cancellable() {
        assert!(RequestStatus::Pending.is_decidable());
        assert!(RequestStatus::Pending.is_cancellable());
        for s in [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
            RequestStatus::Expired,
        ] {
            assert!(!s.is_decidable());
            assert!(!s.is_cancellable());
        }
    }

    #[test]
    fn open_loans() {
        assert!(LoanStatus::Borrowed.is_open());
        assert!(LoanStatus::Overdue.is_open());
        assert!(!LoanStatus::Returned.is_open());
    }

    #[test]
    fn return_condition_maps_item_status() {
        assert_eq!(ReturnCondition::Good.item_status(), ItemStatus::Available);
        assert_eq!(ReturnCondition::Lost.item_status(), ItemStatus::Lost);
        assert_eq!(ReturnCondition::Damaged.item_status(), ItemStatus::Damaged);
    }
}
