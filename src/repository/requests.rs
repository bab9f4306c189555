//! Borrow request repository
//!
//! Holds the transactional allocation SQL: approving a request flips item
//! statuses, creates loans, updates the request and enqueues the decision
//! mail as one atomic unit. The AVAILABLE -> LOANED flip is the serialization
//! point against concurrent approvals.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::due_date,
        mail::NewMail,
        request::{
            plan_allocation, AllocationLine, BorrowRequest, BorrowRequestItem, RequestQuery,
            Shortfall, SubmitRequest,
        },
    },
};

use super::mail::MailRepository;

/// Result of the allocation transaction
pub enum AllocationResult {
    /// Committed: ids of the created loans
    Allocated(Vec<i64>),
    /// Rolled back: per-line availability shortfalls
    Shortage(Vec<Shortfall>),
}

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request {} not found", id)))
    }

    /// Get the lines of a request
    pub async fn get_items(&self, request_id: i64) -> AppResult<Vec<BorrowRequestItem>> {
        Ok(sqlx::query_as::<_, BorrowRequestItem>(
            "SELECT * FROM borrow_request_items WHERE request_id = $1 ORDER BY id",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// List requests with optional filters, newest first
    pub async fn list(&self, query: &RequestQuery) -> AppResult<(Vec<BorrowRequest>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

        let requests = sqlx::query_as::<_, BorrowRequest>(
            r#"
            SELECT * FROM borrow_requests
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::bigint IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.user_id)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrow_requests
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::bigint IS NULL OR user_id = $2)
            "#,
        )
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((requests, total))
    }

    /// Create a PENDING request with its lines. No item is touched here;
    /// allocation is deferred to approval time.
    pub async fn create(&self, user_id: i64, submit: &SubmitRequest) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (user_id, requested_from, requested_to)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(submit.requested_from)
        .bind(submit.requested_to)
        .fetch_one(&mut *tx)
        .await?;

        for line in &submit.lines {
            let book_exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(line.book_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !book_exists {
                return Err(AppError::NotFound(format!(
                    "Book with id {} not found",
                    line.book_id
                )));
            }

            sqlx::query(
                "INSERT INTO borrow_request_items (request_id, book_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(request.id)
            .bind(line.book_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(request)
    }

    /// Attempt the all-or-nothing allocation for a PENDING request.
    ///
    /// For every line, the AVAILABLE copies of the book are locked in barcode
    /// order and the first `quantity` are flipped to LOANED via a conditional
    /// update; a loan row is created per flipped copy. If any line cannot be
    /// fully satisfied the whole transaction is dropped and the shortfalls
    /// are reported; nothing is committed. On success the request flips to
    /// APPROVED and the acceptance mail is enqueued in the same transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn allocate_and_approve(
        &self,
        request_id: i64,
        admin_id: i64,
        now: DateTime<Utc>,
        today: NaiveDate,
        loan_period_days: i64,
        accepted_mail: &NewMail,
    ) -> AppResult<AllocationResult> {
        let mut tx = self.pool.begin().await?;

        // Lock the request row itself so two admins cannot decide it at once.
        let status: String = sqlx::query_scalar(
            "SELECT status FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow request {} not found", request_id)))?;
        if status != "PENDING" {
            return Err(AppError::InvalidState(format!(
                "Request is {}, only PENDING requests can be decided",
                status
            )));
        }

        let lines = sqlx::query_as::<_, AllocationLine>(
            r#"
            SELECT ri.id, ri.book_id, ri.quantity, b.title
            FROM borrow_request_items ri
            JOIN books b ON b.id = ri.book_id
            WHERE ri.request_id = $1
            ORDER BY ri.id
            "#,
        )
        .bind(request_id)
        .fetch_all(&mut *tx)
        .await?;

        // One locking select per distinct book, sized to the book's total
        // demand across lines; duplicate lines then draw from the shared
        // pool instead of re-selecting (and re-finding) the same copies.
        // Ascending book_id keeps concurrent approvals locking in the same
        // order.
        let mut demand: BTreeMap<i64, i64> = BTreeMap::new();
        for line in &lines {
            *demand.entry(line.book_id).or_insert(0) += line.quantity as i64;
        }

        let mut available: HashMap<i64, Vec<i64>> = HashMap::with_capacity(demand.len());
        for (book_id, total) in &demand {
            // Stable tie-break: lowest barcode first.
            let item_ids: Vec<i64> = sqlx::query_scalar(
                r#"
                SELECT id FROM book_items
                WHERE book_id = $1 AND status = 'AVAILABLE'
                ORDER BY barcode
                LIMIT $2
                FOR UPDATE
                "#,
            )
            .bind(book_id)
            .bind(total)
            .fetch_all(&mut *tx)
            .await?;
            available.insert(*book_id, item_ids);
        }

        let allocations = match plan_allocation(&lines, available) {
            Ok(allocations) => allocations,
            Err(shortfalls) => {
                // Dropping the transaction rolls back the row locks; no
                // partial allocation is ever visible.
                drop(tx);
                return Ok(AllocationResult::Shortage(shortfalls));
            }
        };

        let due = due_date(today, loan_period_days);
        let mut loan_ids = Vec::new();

        for (request_item_id, item_ids) in &allocations {
            for item_id in item_ids {
                let flipped = sqlx::query(
                    "UPDATE book_items SET status = 'LOANED' WHERE id = $1 AND status = 'AVAILABLE'",
                )
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
                if flipped.rows_affected() != 1 {
                    // Item was taken between selection and update; abort the
                    // whole approval rather than allocate partially.
                    return Err(AppError::Conflict(
                        "Item availability changed during approval".to_string(),
                    ));
                }

                let loan_id = sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO loans (request_id, request_item_id, book_item_id,
                                       approved_from, due_date, status)
                    VALUES ($1, $2, $3, $4, $5, 'BORROWED')
                    RETURNING id
                    "#,
                )
                .bind(request_id)
                .bind(request_item_id)
                .bind(item_id)
                .bind(today)
                .bind(due)
                .fetch_one(&mut *tx)
                .await?;
                loan_ids.push(loan_id);
            }
        }

        sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = 'APPROVED', admin_id = $2, decision_at = $3, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .bind(admin_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        MailRepository::enqueue_tx(&mut tx, accepted_mail).await?;

        tx.commit().await?;
        Ok(AllocationResult::Allocated(loan_ids))
    }

    /// Reject a PENDING request and enqueue the rejection mail atomically.
    pub async fn mark_rejected(
        &self,
        request_id: i64,
        admin_id: i64,
        reason: &str,
        now: DateTime<Utc>,
        rejected_mail: &NewMail,
    ) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'REJECTED', admin_id = $2, decision_at = $3,
                rejection_reason = $4, updated_at = $3
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(admin_id)
        .bind(now)
        .bind(reason)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::InvalidState("Only PENDING requests can be rejected".to_string())
        })?;

        MailRepository::enqueue_tx(&mut tx, rejected_mail).await?;

        tx.commit().await?;
        Ok(request)
    }

    /// Cancel a PENDING request (user action). The status guard in the WHERE
    /// clause makes the transition race-free.
    pub async fn mark_cancelled(
        &self,
        request_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'CANCELLED', cancelled_at = $2, updated_at = $2
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::InvalidState("Only PENDING requests can be cancelled".to_string())
        })
    }

    /// Expiration sweep: PENDING requests whose window has closed without a
    /// decision become EXPIRED. Idempotent; already-EXPIRED rows never match.
    pub async fn expire_pending(&self, today: NaiveDate, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = 'EXPIRED', updated_at = $2
            WHERE status = 'PENDING' AND requested_to < $1
            "#,
        )
        .bind(today)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
