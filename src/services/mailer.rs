//! Mail queue dispatcher
//!
//! Consumes QUEUED rows and attempts delivery. A failed send marks the row
//! FAILED with its error text and never propagates: mail delivery is
//! decoupled from the business operations that enqueue notifications.

use chrono::Utc;

use crate::{
    error::AppResult,
    models::mail::{MailQueueEntry, MailReference},
    repository::Repository,
};

use super::email::EmailService;

#[derive(Clone)]
pub struct MailerService {
    repository: Repository,
    email: EmailService,
}

impl MailerService {
    pub fn new(repository: Repository, email: EmailService) -> Self {
        Self { repository, email }
    }

    /// Process up to `limit` queued mails. Returns (sent, failed) counts.
    pub async fn dispatch_queued(&self, limit: i64) -> AppResult<(u64, u64)> {
        let batch = self.repository.mail.fetch_queued(limit).await?;
        let mut sent = 0u64;
        let mut failed = 0u64;

        for outbound in batch {
            let id = outbound.entry.id;
            let Some(recipient) = outbound.recipient() else {
                self.repository
                    .mail
                    .mark_failed(id, "No recipient address")
                    .await?;
                failed += 1;
                continue;
            };

            match self
                .email
                .send(recipient, &outbound.entry.subject, &outbound.entry.body)
            {
                Ok(()) => {
                    self.repository.mail.mark_sent(id, Utc::now()).await?;
                    sent += 1;
                }
                Err(e) => {
                    tracing::warn!(mail_id = id, error = %e, "mail delivery failed");
                    self.repository.mail.mark_failed(id, &e.to_string()).await?;
                    failed += 1;
                }
            }
        }

        if sent + failed > 0 {
            tracing::info!(sent, failed, "mail queue dispatched");
        }
        Ok((sent, failed))
    }

    /// Queue entries enqueued for a triggering entity
    pub async fn mails_for(&self, reference: MailReference) -> AppResult<Vec<MailQueueEntry>> {
        let (reference_type, reference_id) = reference.columns();
        self.repository
            .mail
            .list_for_reference(reference_type, reference_id)
            .await
    }
}
