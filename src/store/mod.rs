// src/store/mod.rs

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::models::{
    attempt::{Attempt, AttemptSummary, NewAttempt},
    career::CareerRecommendation,
    category::Category,
    question::Question,
    user::PublicUser,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgQuizStore;

#[derive(Debug)]
pub enum StoreError {
    Database(String),
    Conflict(String),
    NotFound(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            StoreError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Data access needed by the quiz flow.
///
/// Admin CRUD writes go straight to Postgres; this trait only covers what
/// selection, grading, matching and the leaderboard read or write.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_category(&self, id: i64) -> Result<Option<Category>, StoreError>;

    async fn active_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Uniform random sample of up to `limit` questions of the category.
    async fn sample_questions(&self, category_id: i64, limit: i64)
    -> Result<Vec<Question>, StoreError>;

    /// Correct option index per question id, for the ids that exist in the category.
    async fn answer_keys(
        &self,
        category_id: i64,
        question_ids: &[i64],
    ) -> Result<HashMap<i64, i32>, StoreError>;

    /// Fails with `NotFound("User")` or `NotFound("Category")` when the
    /// referenced row is gone.
    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<Attempt, StoreError>;

    /// A user's attempts, newest first.
    async fn attempts_for_user(&self, user_id: i64) -> Result<Vec<Attempt>, StoreError>;

    /// Attempts of a category without their per-question detail.
    ///
    /// Must contain every user's most recent attempt and one of their
    /// best-scoring attempts. Other rows may be left out.
    async fn attempt_summaries(&self, category_id: i64)
    -> Result<Vec<AttemptSummary>, StoreError>;

    /// Careers of a category joined with the category's name and description.
    async fn careers_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<CareerRecommendation>, StoreError>;

    async fn public_users(&self, ids: &[i64]) -> Result<Vec<PublicUser>, StoreError>;
}
