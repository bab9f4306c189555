//! Borrow request model and related types

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

use super::enums::RequestStatus;

/// Borrow request from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: i64,
    pub user_id: i64,
    pub requested_from: NaiveDate,
    pub requested_to: NaiveDate,
    pub status: RequestStatus,
    pub admin_id: Option<i64>,
    pub decision_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One requested line: a book and a quantity, no physical copy bound yet
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequestItem {
    pub id: i64,
    pub request_id: i64,
    pub book_id: i64,
    pub quantity: i16,
}

/// Request with its lines for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowRequestDetails {
    #[serde(flatten)]
    pub request: BorrowRequest,
    pub items: Vec<BorrowRequestItem>,
}

/// Requested line in a submission
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RequestLine {
    pub book_id: i64,
    pub quantity: i16,
}

/// Submit borrow request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitRequest {
    pub requested_from: NaiveDate,
    pub requested_to: NaiveDate,
    pub lines: Vec<RequestLine>,
}

impl SubmitRequest {
    /// Validates the submission against `today`: non-empty range not entirely
    /// in the past, at least one line, every quantity >= 1.
    pub fn validate_against(&self, today: NaiveDate) -> AppResult<()> {
        if self.requested_from > self.requested_to {
            return Err(AppError::Validation(
                "requested_from must not be after requested_to".to_string(),
            ));
        }
        if self.requested_to < today {
            return Err(AppError::Validation(
                "Requested date range is entirely in the past".to_string(),
            ));
        }
        if self.lines.is_empty() {
            return Err(AppError::Validation(
                "At least one requested book is required".to_string(),
            ));
        }
        if let Some(line) = self.lines.iter().find(|l| l.quantity < 1) {
            return Err(AppError::Validation(format!(
                "Quantity for book {} must be at least 1",
                line.book_id
            )));
        }
        Ok(())
    }
}

/// Explicit admin rejection payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: String,
}

/// Request query parameters (admin listing)
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
    pub user_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Outcome of an approval attempt
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ApprovalOutcome {
    /// Every line was fully allocated
    Approved { loan_ids: Vec<i64> },
    /// At least one line could not be satisfied; the request was rejected
    Rejected { reason: String },
}

/// Per-line availability shortfall found during allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub book_title: String,
    pub requested: i64,
    pub available: i64,
}

/// A request line joined with its book title, as read at approval time
#[derive(Debug, Clone, FromRow)]
pub struct AllocationLine {
    pub id: i64,
    pub book_id: i64,
    pub quantity: i16,
    pub title: String,
}

/// Distribute available copy ids over the request lines, in line order.
/// Lines referencing the same book draw from one shared pool, so a copy is
/// never assigned to two lines. Returns the per-line allocations, or the
/// shortfalls for every line that cannot be fully served.
pub fn plan_allocation(
    lines: &[AllocationLine],
    mut available: HashMap<i64, Vec<i64>>,
) -> Result<Vec<(i64, Vec<i64>)>, Vec<Shortfall>> {
    let mut allocations = Vec::with_capacity(lines.len());
    let mut shortfalls = Vec::new();

    for line in lines {
        let pool = available.entry(line.book_id).or_default();
        let wanted = line.quantity as usize;
        if pool.len() < wanted {
            shortfalls.push(Shortfall {
                book_title: line.title.clone(),
                requested: line.quantity as i64,
                available: pool.len() as i64,
            });
            // The short line claims what is left; later lines for the same
            // book see an empty pool.
            pool.clear();
        } else {
            allocations.push((line.id, pool.drain(..wanted).collect()));
        }
    }

    if shortfalls.is_empty() {
        Ok(allocations)
    } else {
        Err(shortfalls)
    }
}

/// Human-readable rejection reason for an allocation shortage.
pub fn shortage_reason(shortfalls: &[Shortfall]) -> String {
    let lines: Vec<String> = shortfalls
        .iter()
        .map(|s| {
            format!(
                "\"{}\": {} requested, {} available",
                s.book_title, s.requested, s.available
            )
        })
        .collect();
    format!("Insufficient available copies: {}", lines.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn submission(from: &str, to: &str, lines: Vec<RequestLine>) -> SubmitRequest {
        SubmitRequest {
            requested_from: d(from),
            requested_to: d(to),
            lines,
        }
    }

    #[test]
    fn valid_submission_passes() {
        let s = submission(
            "2026-09-01",
            "2026-09-15",
            vec![RequestLine {
                book_id: 1,
                quantity: 2,
            }],
        );
        assert!(s.validate_against(d("2026-08-29")).is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let s = submission(
            "2026-09-15",
            "2026-09-01",
            vec![RequestLine {
                book_id: 1,
                quantity: 1,
            }],
        );
        assert!(s.validate_against(d("2026-08-29")).is_err());
    }

    #[test]
    fn past_range_is_rejected() {
        let s = submission(
            "2026-08-01",
            "2026-08-10",
            vec![RequestLine {
                book_id: 1,
                quantity: 1,
            }],
        );
        assert!(s.validate_against(d("2026-08-29")).is_err());
    }

    #[test]
    fn range_ending_today_is_accepted() {
        let s = submission(
            "2026-08-20",
            "2026-08-29",
            vec![RequestLine {
                book_id: 1,
                quantity: 1,
            }],
        );
        assert!(s.validate_against(d("2026-08-29")).is_ok());
    }

    #[test]
    fn empty_lines_are_rejected() {
        let s = submission("2026-09-01", "2026-09-15", vec![]);
        assert!(s.validate_against(d("2026-08-29")).is_err());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let s = submission(
            "2026-09-01",
            "2026-09-15",
            vec![
                RequestLine {
                    book_id: 1,
                    quantity: 1,
                },
                RequestLine {
                    book_id: 2,
                    quantity: 0,
                },
            ],
        );
        assert!(s.validate_against(d("2026-08-29")).is_err());
    }

    fn line(id: i64, book_id: i64, quantity: i16, title: &str) -> AllocationLine {
        AllocationLine {
            id,
            book_id,
            quantity,
            title: title.to_string(),
        }
    }

    #[test]
    fn plan_serves_distinct_books() {
        let lines = vec![line(1, 10, 2, "Dune"), line(2, 20, 1, "Solaris")];
        let available = HashMap::from([(10, vec![100, 101]), (20, vec![200])]);

        let allocations = plan_allocation(&lines, available).unwrap();
        assert_eq!(allocations, vec![(1, vec![100, 101]), (2, vec![200])]);
    }

    #[test]
    fn duplicate_book_lines_draw_from_a_shared_pool() {
        // Two lines for the same book must receive disjoint copies.
        let lines = vec![line(1, 10, 1, "Dune"), line(2, 10, 1, "Dune")];
        let available = HashMap::from([(10, vec![100, 101])]);

        let allocations = plan_allocation(&lines, available).unwrap();
        assert_eq!(allocations, vec![(1, vec![100]), (2, vec![101])]);
    }

    #[test]
    fn duplicate_book_lines_shortage_is_reported_per_line() {
        let lines = vec![line(1, 10, 1, "Dune"), line(2, 10, 1, "Dune")];
        let available = HashMap::from([(10, vec![100])]);

        let shortfalls = plan_allocation(&lines, available).unwrap_err();
        assert_eq!(
            shortfalls,
            vec![Shortfall {
                book_title: "Dune".to_string(),
                requested: 1,
                available: 0,
            }]
        );
    }

    #[test]
    fn plan_collects_every_short_line() {
        let lines = vec![line(1, 10, 2, "Dune"), line(2, 20, 3, "Solaris")];
        let available = HashMap::from([(10, vec![100]), (20, vec![])]);

        let shortfalls = plan_allocation(&lines, available).unwrap_err();
        assert_eq!(shortfalls.len(), 2);
        assert_eq!(shortfalls[0].available, 1);
        assert_eq!(shortfalls[1].available, 0);
    }

    #[test]
    fn plan_shorts_books_with_no_availability_entry() {
        let lines = vec![line(1, 10, 1, "Dune")];

        let shortfalls = plan_allocation(&lines, HashMap::new()).unwrap_err();
        assert_eq!(shortfalls[0].available, 0);
    }

    #[test]
    fn shortage_reason_lists_every_line() {
        let reason = shortage_reason(&[
            Shortfall {
                book_title: "Dune".to_string(),
                requested: 2,
                available: 1,
            },
            Shortfall {
                book_title: "Solaris".to_string(),
                requested: 1,
                available: 0,
            },
        ]);
        assert!(reason.contains("\"Dune\": 2 requested, 1 available"));
        assert!(reason.contains("\"Solaris\": 1 requested, 0 available"));
    }
}
