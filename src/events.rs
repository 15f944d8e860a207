// src/events.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::attempt::Attempt;

/// Kind of admin-side write that produced a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// Every notable write produces an event for dashboards to pick up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuizEvent {
    /// A graded attempt was persisted. Carries no per-question detail.
    AttemptCreated {
        id: i64,
        user_id: i64,
        category_id: i64,
        score: i32,
        total: i32,
        percentage: i32,
        created_at: DateTime<Utc>,
    },
    CategoryChanged {
        id: i64,
        action: ChangeAction,
    },
    QuestionChanged {
        id: i64,
        action: ChangeAction,
    },
    CareerChanged {
        id: i64,
        action: ChangeAction,
    },
    UserChanged {
        id: i64,
        action: ChangeAction,
    },
}

impl QuizEvent {
    pub fn attempt_created(attempt: &Attempt) -> Self {
        QuizEvent::AttemptCreated {
            id: attempt.id,
            user_id: attempt.user_id,
            category_id: attempt.category_id,
            score: attempt.score,
            total: attempt.total,
            percentage: attempt.percentage,
            created_at: attempt.created_at,
        }
    }
}

#[derive(Debug)]
pub struct EmitError(pub String);

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event emission failed: {}", self.0)
    }
}

impl std::error::Error for EmitError {}

/// Destination for change notifications.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: QuizEvent) -> Result<(), EmitError>;
}

/// Emits an event and logs a failure instead of returning it.
/// The write that produced the event has already been committed.
pub fn emit_best_effort(sink: &dyn EventSink, event: QuizEvent) {
    if let Err(e) = sink.emit(event) {
        tracing::warn!("Dropping change notification: {}", e);
    }
}

/// In-process pub/sub channel backed by `tokio::sync::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<QuizEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QuizEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: QuizEvent) -> Result<(), EmitError> {
        // No subscribers is the normal idle state, not a failure.
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!("Event delivered to {} subscriber(s)", receivers);
            }
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!("No subscribers for {:?}", event);
            }
        }
        Ok(())
    }
}
