//! Borrow/loan lifecycle service
//!
//! Orchestrates the request -> approval -> loan -> return workflow over the
//! repositories and composes the notification mails enqueued at decision
//! points. All operations take the current time from the caller.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        enums::MailType,
        loan::{Loan, LoanDetails, ReturnLoan},
        mail::{MailReference, NewMail},
        request::{
            shortage_reason, ApprovalOutcome, BorrowRequest, BorrowRequestDetails, RequestQuery,
            SubmitRequest,
        },
        user::User,
    },
    repository::{requests::AllocationResult, loans::OverdueLoan, Repository},
};

#[derive(Clone)]
pub struct BorrowingService {
    repository: Repository,
    config: LendingConfig,
    admin_address: String,
}

impl BorrowingService {
    pub fn new(repository: Repository, config: LendingConfig, admin_address: String) -> Self {
        Self {
            repository,
            config,
            admin_address,
        }
    }

    /// Submit a new borrow request. Items are not touched; allocation happens
    /// at approval time since availability may change before the decision.
    pub async fn submit_request(
        &self,
        user_id: i64,
        submit: SubmitRequest,
        today: NaiveDate,
    ) -> AppResult<BorrowRequestDetails> {
        submit.validate_against(today)?;

        let request = self.repository.requests.create(user_id, &submit).await?;
        let items = self.repository.requests.get_items(request.id).await?;

        tracing::info!(request_id = request.id, user_id, "borrow request submitted");
        Ok(BorrowRequestDetails { request, items })
    }

    /// Get a request with its lines
    pub async fn get_request(&self, id: i64) -> AppResult<BorrowRequestDetails> {
        let request = self.repository.requests.get_by_id(id).await?;
        let items = self.repository.requests.get_items(id).await?;
        Ok(BorrowRequestDetails { request, items })
    }

    /// List requests (admin view or per-user)
    pub async fn list_requests(
        &self,
        query: &RequestQuery,
    ) -> AppResult<(Vec<BorrowRequest>, i64)> {
        self.repository.requests.list(query).await
    }

    /// Approve a PENDING request: allocate concrete items to every line, or
    /// reject with a shortage reason when any line cannot be satisfied.
    pub async fn approve_request(
        &self,
        request_id: i64,
        admin_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<ApprovalOutcome> {
        let request = self.repository.requests.get_by_id(request_id).await?;
        if !request.status.is_decidable() {
            return Err(AppError::InvalidState(format!(
                "Request is {}, only PENDING requests can be decided",
                request.status
            )));
        }
        let requester = self.repository.users.get_by_id(request.user_id).await?;
        let today = now.date_naive();

        let accepted_mail = self.accepted_mail(&request, &requester, today);
        let result = self
            .repository
            .requests
            .allocate_and_approve(
                request_id,
                admin_id,
                now,
                today,
                self.config.loan_period_days,
                &accepted_mail,
            )
            .await?;

        match result {
            AllocationResult::Allocated(loan_ids) => {
                tracing::info!(
                    request_id,
                    admin_id,
                    loans = loan_ids.len(),
                    "borrow request approved"
                );
                Ok(ApprovalOutcome::Approved { loan_ids })
            }
            AllocationResult::Shortage(shortfalls) => {
                let reason = shortage_reason(&shortfalls);
                let rejected_mail = self.rejected_mail(&request, &requester, &reason);
                self.repository
                    .requests
                    .mark_rejected(request_id, admin_id, &reason, now, &rejected_mail)
                    .await?;
                tracing::info!(request_id, admin_id, %reason, "borrow request rejected on shortage");
                Ok(ApprovalOutcome::Rejected { reason })
            }
        }
    }

    /// Explicit admin rejection with a free-form reason
    pub async fn reject_request(
        &self,
        request_id: i64,
        admin_id: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<BorrowRequest> {
        let request = self.repository.requests.get_by_id(request_id).await?;
        if !request.status.is_decidable() {
            return Err(AppError::InvalidState(format!(
                "Request is {}, only PENDING requests can be decided",
                request.status
            )));
        }
        let requester = self.repository.users.get_by_id(request.user_id).await?;
        let rejected_mail = self.rejected_mail(&request, &requester, reason);

        let request = self
            .repository
            .requests
            .mark_rejected(request_id, admin_id, reason, now, &rejected_mail)
            .await?;
        tracing::info!(request_id, admin_id, "borrow request rejected");
        Ok(request)
    }

    /// Cancel a PENDING request; only the requester may cancel.
    pub async fn cancel_request(
        &self,
        request_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<BorrowRequest> {
        let request = self.repository.requests.get_by_id(request_id).await?;
        if request.user_id != user_id {
            return Err(AppError::Authorization(
                "Only the requester may cancel a request".to_string(),
            ));
        }
        if !request.status.is_cancellable() {
            return Err(AppError::InvalidState(format!(
                "Request is {}, only PENDING requests can be cancelled",
                request.status
            )));
        }

        let request = self.repository.requests.mark_cancelled(request_id, now).await?;
        tracing::info!(request_id, user_id, "borrow request cancelled");
        Ok(request)
    }

    /// Expiration sweep. Safe to run concurrently with itself and with
    /// user-facing operations; returns the number of requests expired.
    pub async fn expire_pending(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let expired = self
            .repository
            .requests
            .expire_pending(now.date_naive(), now)
            .await?;
        if expired > 0 {
            tracing::info!(expired, "expired pending borrow requests");
        }
        Ok(expired)
    }

    /// Record a return. The reported condition decides the item's next
    /// status: AVAILABLE, or LOST/DAMAGED as a terminal state.
    pub async fn return_loan(
        &self,
        loan_id: i64,
        input: ReturnLoan,
        today: NaiveDate,
    ) -> AppResult<Loan> {
        let returned_on = input.returned_on.unwrap_or(today);
        let loan = self
            .repository
            .loans
            .return_loan(loan_id, returned_on, input.condition)
            .await?;
        tracing::info!(loan_id, condition = ?input.condition, "loan returned");
        Ok(loan)
    }

    /// Overdue sweep. One admin reminder per loan per BORROWED -> OVERDUE
    /// transition; repeated sweeps are no-ops for already-flipped loans.
    pub async fn mark_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let admin_address = self.admin_address.clone();
        let overdue = self
            .repository
            .loans
            .mark_overdue(now.date_naive(), |loan| {
                overdue_reminder_mail(&admin_address, loan)
            })
            .await?;
        if !overdue.is_empty() {
            tracing::info!(count = overdue.len(), "loans flipped to overdue");
        }
        Ok(overdue.len() as u64)
    }

    /// Loans created for a request
    pub async fn request_loans(&self, request_id: i64) -> AppResult<Vec<LoanDetails>> {
        self.repository.requests.get_by_id(request_id).await?;
        self.repository.loans.list_for_request(request_id).await
    }

    /// Loans of a user
    pub async fn user_loans(&self, user_id: i64) -> AppResult<Vec<LoanDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.list_for_user(user_id).await
    }

    // =========================================================================
    // Mail composition
    // =========================================================================

    fn accepted_mail(&self, request: &BorrowRequest, requester: &User, today: NaiveDate) -> NewMail {
        let due = crate::models::loan::due_date(today, self.config.loan_period_days);
        NewMail {
            mail_type: MailType::BorrowAccepted,
            to_user_id: Some(requester.id),
            to_email: None,
            subject: format!("Your borrow request #{} has been approved", request.id),
            body: format!(
                "Hello {},\n\n\
                 Your borrow request #{} has been approved. The copies are ready\n\
                 for pickup and are due back on {}.\n\n\
                 Happy reading,\nThe library team\n",
                requester.username, request.id, due
            ),
            reference: Some(MailReference::BorrowRequest(request.id)),
        }
    }

    fn rejected_mail(&self, request: &BorrowRequest, requester: &User, reason: &str) -> NewMail {
        NewMail {
            mail_type: MailType::BorrowRejected,
            to_user_id: Some(requester.id),
            to_email: None,
            subject: format!("Your borrow request #{} has been rejected", request.id),
            body: format!(
                "Hello {},\n\n\
                 Unfortunately your borrow request #{} could not be fulfilled.\n\
                 Reason: {}\n\n\
                 You are welcome to submit a new request.\nThe library team\n",
                requester.username, request.id, reason
            ),
            reference: Some(MailReference::BorrowRequest(request.id)),
        }
    }
}

fn overdue_reminder_mail(admin_address: &str, loan: &OverdueLoan) -> NewMail {
    NewMail {
        mail_type: MailType::ReturnReminderAdmin,
        to_user_id: None,
        to_email: Some(admin_address.to_string()),
        subject: format!("Loan #{} is overdue", loan.loan_id),
        body: format!(
            "Loan #{} (\"{}\", copy {}) borrowed by {} was due on {} and has\n\
             not been returned.\n",
            loan.loan_id, loan.book_title, loan.barcode, loan.borrower, loan.due_date
        ),
        reference: Some(MailReference::Loan(loan.loan_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdue_reminder_targets_admin_and_references_loan() {
        let mail = overdue_reminder_mail(
            "admin@example.org",
            &OverdueLoan {
                loan_id: 12,
                request_id: 3,
                due_date: "2026-08-01".parse().unwrap(),
                book_title: "Dune".to_string(),
                barcode: "BC-0001".to_string(),
                borrower: "alice".to_string(),
            },
        );
        assert_eq!(mail.mail_type, MailType::ReturnReminderAdmin);
        assert_eq!(mail.to_email.as_deref(), Some("admin@example.org"));
        assert_eq!(mail.reference, Some(MailReference::Loan(12)));
        assert!(mail.body.contains("Dune"));
        assert!(mail.body.contains("alice"));
    }
}
