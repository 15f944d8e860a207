// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::error::AppError;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 5;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub category_id: i64,

    /// The text content of the question.
    pub text: String,

    /// Ordered answer options, stored as a JSON array.
    pub options: Json<Vec<String>>,

    /// 0-based index into `options` of the correct answer.
    pub correct_index: i32,

    /// 'easy', 'medium' or 'hard'.
    pub difficulty: String,

    /// Shown after grading only.
    pub explanation: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for sending a question to a quiz taker.
///
/// Carries no answer key fields at all, so a serialized paper can never
/// reveal `correct_index` or `explanation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub options: Vec<String>,
    pub difficulty: String,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            text: q.text,
            options: q.options.0,
            difficulty: q.difficulty,
        }
    }
}

/// Answer key row used when grading.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct AnswerKey {
    pub id: i64,
    pub correct_index: i32,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(range(min = 1))]
    pub category_id: i64,
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(range(min = 0))]
    pub correct_index: i32,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: Option<String>,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(range(min = 1))]
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 1000))]
    pub text: Option<String>,
    #[validate(custom(function = validate_options))]
    pub options: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub correct_index: Option<i32>,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: Option<String>,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
}

impl UpdateQuestionRequest {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.text.is_none()
            && self.options.is_none()
            && self.correct_index.is_none()
            && self.difficulty.is_none()
            && self.explanation.is_none()
    }
}

/// Query parameters for the admin question listing.
#[derive(Debug, Deserialize)]
pub struct QuestionListParams {
    pub category_id: Option<i64>,
}

/// Rejects an answer key that does not point into the option list.
pub fn ensure_answer_index(options_len: usize, correct_index: i32) -> Result<(), AppError> {
    match usize::try_from(correct_index) {
        Ok(idx) if idx < options_len => Ok(()),
        _ => Err(AppError::BadRequest(format!(
            "correct_index {} is out of range for {} options",
            correct_index, options_len
        ))),
    }
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
        return Err(validator::ValidationError::new("options_count_out_of_range"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

fn validate_difficulty(difficulty: &str) -> Result<(), validator::ValidationError> {
    match difficulty {
        "easy" | "medium" | "hard" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_difficulty")),
    }
}
