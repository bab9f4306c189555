//! Mail queue repository
//!
//! The lifecycle core only inserts rows; the dispatcher consumes them and
//! flips QUEUED -> SENT/FAILED. Enqueueing inside a caller's transaction is
//! supported so business effects and their notification commit together.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::AppResult,
    models::mail::{MailQueueEntry, NewMail},
};

/// Queued entry joined with the recipient's account email
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutboundMail {
    #[sqlx(flatten)]
    pub entry: MailQueueEntry,
    pub user_email: Option<String>,
}

impl OutboundMail {
    /// Explicit address wins over the linked account's address.
    pub fn recipient(&self) -> Option<&str> {
        self.entry
            .to_email
            .as_deref()
            .or(self.user_email.as_deref())
    }
}

#[derive(Clone)]
pub struct MailRepository {
    pool: Pool<Postgres>,
}

impl MailRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a queue row as part of an open transaction.
    pub async fn enqueue_tx(
        tx: &mut Transaction<'_, Postgres>,
        mail: &NewMail,
    ) -> AppResult<i64> {
        let (reference_type, reference_id) = match &mail.reference {
            Some(r) => {
                let (ty, id) = r.columns();
                (Some(ty), Some(id))
            }
            None => (None, None),
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO mail_queue (mail_type, to_user_id, to_email, subject, body,
                                    reference_type, reference_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(mail.mail_type)
        .bind(mail.to_user_id)
        .bind(&mail.to_email)
        .bind(&mail.subject)
        .bind(&mail.body)
        .bind(reference_type)
        .bind(reference_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// Insert a queue row in its own transaction.
    pub async fn enqueue(&self, mail: &NewMail) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;
        let id = Self::enqueue_tx(&mut tx, mail).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Fetch a batch of QUEUED rows oldest-first.
    pub async fn fetch_queued(&self, limit: i64) -> AppResult<Vec<OutboundMail>> {
        Ok(sqlx::query_as::<_, OutboundMail>(
            r#"
            SELECT m.*, u.email AS user_email
            FROM mail_queue m
            LEFT JOIN users u ON u.id = m.to_user_id
            WHERE m.status = 'QUEUED'
            ORDER BY m.scheduled_at
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE mail_queue SET status = 'SENT', sent_at = $2, error = NULL WHERE id = $1")
            .bind(id)
            .bind(sent_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn mark_failed(&self, id: i64, error: &str) -> AppResult<()> {
        sqlx::query("UPDATE mail_queue SET status = 'FAILED', error = $2 WHERE id = $1")
            .bind(id)
            .bind(error)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List queue entries for a triggering entity (diagnostics endpoint)
    pub async fn list_for_reference(
        &self,
        reference_type: &str,
        reference_id: i64,
    ) -> AppResult<Vec<MailQueueEntry>> {
        Ok(sqlx::query_as::<_, MailQueueEntry>(
            r#"
            SELECT * FROM mail_queue
            WHERE reference_type = $1 AND reference_id = $2
            ORDER BY scheduled_at
            "#,
        )
        .bind(reference_type)
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
