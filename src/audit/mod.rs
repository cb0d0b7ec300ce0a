//! Audit trail collaborator.
//!
//! Policy-relevant events are pushed onto an explicit queue and drained by a
//! background writer task. `record` is synchronous and never fails the
//! caller: a closed channel or a failed insert is logged and dropped, per
//! the fire-and-forget contract. Retry, if any, belongs downstream.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::database::{self, DatabaseError};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Kinds of audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UnauthorizedSensitiveToggle,
    SensitiveDataViewed,
    JobCreated,
    JobStatusChanged,
    CustomerCreated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UnauthorizedSensitiveToggle => "Unauthorized Sensitive Toggle Attempt",
            AuditAction::SensitiveDataViewed => "Sensitive Data Viewed",
            AuditAction::JobCreated => "Job Created",
            AuditAction::JobStatusChanged => "Job Status Changed",
            AuditAction::CustomerCreated => "Customer Created",
        }
    }
}

/// One audit record, built where the action happens and written later.
#[derive(Debug)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub changed_by: Uuid,
    pub details: Value,
    pub job_number: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(action: AuditAction, changed_by: Uuid, details: Value) -> Self {
        Self {
            action,
            changed_by,
            details,
            job_number: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn for_job(mut self, job_number: impl Into<String>) -> Self {
        self.job_number = Some(job_number.into());
        self
    }
}

/// Cloneable handle for recording audit events.
#[derive(Clone)]
pub struct AuditLog {
    tx: UnboundedSender<AuditEvent>,
}

impl AuditLog {
    /// Create a recorder and the receiver its writer task drains.
    pub fn channel() -> (Self, UnboundedReceiver<AuditEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue an event. Non-blocking; a closed channel is logged, never
    /// surfaced to the caller.
    pub fn record(&self, event: AuditEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!("audit channel closed, event dropped: {}", e.0.action.as_str());
        }
    }
}

/// Background task draining the audit queue into the database.
pub async fn run_writer(mut rx: UnboundedReceiver<AuditEvent>) {
    while let Some(event) = rx.recv().await {
        let action = event.action.as_str();
        if let Err(e) = insert(event).await {
            tracing::warn!("failed to write audit record '{}': {}", action, e);
        }
    }
    tracing::info!("audit writer stopped");
}

async fn insert(event: AuditEvent) -> Result<(), AuditError> {
    let pool = database::pool().await?;
    sqlx::query(
        "INSERT INTO audit_log (action_type, changed_by, details, job_number, recorded_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(event.action.as_str())
    .bind(event.changed_by)
    .bind(event.details)
    .bind(event.job_number)
    .bind(event.recorded_at)
    .execute(&pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_on_a_closed_channel_does_not_panic() {
        let (log, rx) = AuditLog::channel();
        drop(rx);
        log.record(AuditEvent::new(
            AuditAction::SensitiveDataViewed,
            Uuid::new_v4(),
            json!({}),
        ));
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (log, mut rx) = AuditLog::channel();
        let user = Uuid::new_v4();
        log.record(
            AuditEvent::new(AuditAction::JobCreated, user, json!({})).for_job("J-1"),
        );
        log.record(AuditEvent::new(AuditAction::JobStatusChanged, user, json!({})));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.action, AuditAction::JobCreated);
        assert_eq!(first.job_number.as_deref(), Some("J-1"));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.action, AuditAction::JobStatusChanged);
    }
}
