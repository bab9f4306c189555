//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{ItemStatus, ReturnCondition},
        loan::{Loan, LoanDetails},
        mail::NewMail,
    },
};

use super::mail::MailRepository;

/// Loan flipped to OVERDUE by the sweep, with context for the reminder mail
#[derive(Debug, Clone)]
pub struct OverdueLoan {
    pub loan_id: i64,
    pub request_id: i64,
    pub due_date: NaiveDate,
    pub book_title: String,
    pub barcode: String,
    pub borrower: String,
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Loans of a request
    pub async fn list_for_request(&self, request_id: i64) -> AppResult<Vec<LoanDetails>> {
        Ok(sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.id, l.request_id, b.id AS book_id, b.title AS book_title,
                   bi.barcode, l.approved_from, l.due_date, l.returned_at, l.status
            FROM loans l
            JOIN book_items bi ON bi.id = l.book_item_id
            JOIN books b ON b.id = bi.book_id
            WHERE l.request_id = $1
            ORDER BY l.id
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Loans of a user, open loans first
    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<LoanDetails>> {
        Ok(sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.id, l.request_id, b.id AS book_id, b.title AS book_title,
                   bi.barcode, l.approved_from, l.due_date, l.returned_at, l.status
            FROM loans l
            JOIN borrow_requests r ON r.id = l.request_id
            JOIN book_items bi ON bi.id = l.book_item_id
            JOIN books b ON b.id = bi.book_id
            WHERE r.user_id = $1
            ORDER BY (l.status = 'RETURNED'), l.due_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Record a return: loan becomes RETURNED and the item reverts to
    /// AVAILABLE, or takes LOST/DAMAGED if the return reports it. One
    /// transaction; the open-status guard rejects double returns.
    pub async fn return_loan(
        &self,
        loan_id: i64,
        returned_on: NaiveDate,
        condition: ReturnCondition,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET status = 'RETURNED', returned_at = $2
            WHERE id = $1 AND status IN ('BORROWED', 'OVERDUE')
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(returned_on)
        .fetch_optional(&mut *tx)
        .await?;

        let loan = match loan {
            Some(loan) => loan,
            None => {
                // Distinguish "gone" from "already returned" for the caller.
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE id = $1)")
                        .bind(loan_id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(if exists {
                    AppError::InvalidState("Loan is already returned".to_string())
                } else {
                    AppError::NotFound(format!("Loan with id {} not found", loan_id))
                });
            }
        };

        let item_status = condition.item_status();
        let flipped = sqlx::query(
            "UPDATE book_items SET status = $2 WHERE id = $1 AND status = 'LOANED'",
        )
        .bind(loan.book_item_id)
        .bind(item_status)
        .execute(&mut *tx)
        .await?;
        if flipped.rows_affected() != 1 {
            return Err(AppError::InvalidState(format!(
                "Item {} is not in LOANED state",
                loan.book_item_id
            )));
        }

        if item_status != ItemStatus::Available {
            tracing::warn!(
                loan_id,
                item_id = loan.book_item_id,
                status = %item_status,
                "item returned in degraded condition"
            );
        }

        tx.commit().await?;
        Ok(loan)
    }

    /// Overdue sweep: BORROWED loans past their due date flip to OVERDUE and
    /// one admin reminder is enqueued per flipped loan, in one transaction.
    /// The status flip is the dedupe signal, so re-running the sweep neither
    /// re-flips nor re-enqueues.
    pub async fn mark_overdue(
        &self,
        today: NaiveDate,
        build_mail: impl Fn(&OverdueLoan) -> NewMail,
    ) -> AppResult<Vec<OverdueLoan>> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            r#"
            WITH flipped AS (
                UPDATE loans
                SET status = 'OVERDUE'
                WHERE status = 'BORROWED' AND due_date < $1
                RETURNING id, request_id, book_item_id, due_date
            )
            SELECT f.id, f.request_id, f.due_date, b.title, bi.barcode, u.username
            FROM flipped f
            JOIN book_items bi ON bi.id = f.book_item_id
            JOIN books b ON b.id = bi.book_id
            JOIN borrow_requests r ON r.id = f.request_id
            JOIN users u ON u.id = r.user_id
            ORDER BY f.id
            "#,
        )
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        let mut overdue = Vec::with_capacity(rows.len());
        for row in rows {
            let entry = OverdueLoan {
                loan_id: row.get("id"),
                request_id: row.get("request_id"),
                due_date: row.get("due_date"),
                book_title: row.get("title"),
                barcode: row.get("barcode"),
                borrower: row.get("username"),
            };
            MailRepository::enqueue_tx(&mut tx, &build_mail(&entry)).await?;
            overdue.push(entry);
        }

        tx.commit().await?;
        Ok(overdue)
    }
}
