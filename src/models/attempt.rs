// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::models::{career::CareerRecommendation, user::PublicUser};

/// One graded answer inside an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub question_id: i64,
    pub selected_index: i32,
    pub correct: bool,
}

/// Represents the 'attempts' table in the database.
/// Rows are only ever inserted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub detail: Json<Vec<AnswerDetail>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// An attempt without its per-question breakdown.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Attempt> for AttemptSummary {
    fn from(a: &Attempt) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            category_id: a.category_id,
            score: a.score,
            total: a.total,
            percentage: a.percentage,
            created_at: a.created_at,
        }
    }
}

/// Values for a new attempt row; id and timestamp come from the store.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i64,
    pub category_id: i64,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub detail: Vec<AnswerDetail>,
}

/// A single `(question_id, selected_index)` pair from the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_index: i32,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(length(min = 1, max = 200, message = "Between 1 and 200 answers must be submitted."))]
    pub answers: Vec<SubmittedAnswer>,
}

/// Outcome of grading a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeResult {
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub detail: Vec<AnswerDetail>,
}

/// Response body for a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitAttemptResponse {
    pub attempt: AttemptSummary,
    pub detail: Vec<AnswerDetail>,
    pub passed: bool,
    pub message: String,
    pub recommendation: Option<CareerRecommendation>,
}

/// One ranked row of a category leaderboard.
/// Only aggregate standing is exposed, never another user's answers.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub best_score: i32,
    pub latest_attempt: AttemptSummary,
    pub user: PublicUser,
}

/// Query parameters for leaderboard requests.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}
