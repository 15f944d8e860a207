// src/services/quiz.rs

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::{MAX_SUBMITTED_ANSWERS, PASSING_PERCENTAGE},
    error::AppError,
    events::{EventSink, QuizEvent, emit_best_effort},
    models::{
        attempt::{
            Attempt, AttemptSummary, GradeResult, LeaderboardEntry, NewAttempt,
            SubmitAttemptResponse, SubmittedAnswer,
        },
        career::CareerRecommendation,
        category::Category,
        question::PublicQuestion,
        user::PublicUser,
    },
    scoring::{grading, leaderboard, matching},
    store::{QuizStore, StoreError},
};

/// Quiz selection, grading, career matching and leaderboards.
///
/// Holds no mutable state of its own; every call reads or writes the store
/// and returns.
#[derive(Clone)]
pub struct QuizService {
    store: Arc<dyn QuizStore>,
    events: Arc<dyn EventSink>,
}

fn ensure_id(id: i64, what: &str) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::BadRequest(format!("Invalid {} id: {}", what, id)));
    }
    Ok(())
}

impl QuizService {
    pub fn new(store: Arc<dyn QuizStore>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    pub async fn active_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.store.active_categories().await?)
    }

    /// Looks up a category that quiz takers may see.
    pub async fn category(&self, category_id: i64) -> Result<Category, AppError> {
        ensure_id(category_id, "category")?;

        self.store
            .find_category(category_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or(AppError::NotFound("Category not found".to_string()))
    }

    /// Draws a random paper for the category with the answer keys stripped.
    pub async fn select_questions(
        &self,
        category_id: i64,
        count: i64,
    ) -> Result<Vec<PublicQuestion>, AppError> {
        if count < 1 {
            return Err(AppError::BadRequest(format!(
                "Question count must be at least 1, got {}",
                count
            )));
        }
        self.category(category_id).await?;

        let questions = self.store.sample_questions(category_id, count).await?;

        Ok(questions.into_iter().map(PublicQuestion::from).collect())
    }

    /// Grades a submission. Unresolvable questions count as incorrect.
    pub async fn grade(
        &self,
        category_id: i64,
        answers: &[SubmittedAnswer],
    ) -> Result<GradeResult, AppError> {
        let ids: Vec<i64> = answers.iter().map(|a| a.question_id).collect();
        let keys: HashMap<i64, i32> = self.store.answer_keys(category_id, &ids).await?;

        Ok(grading::grade(answers, &keys))
    }

    /// Persists a graded attempt, then announces it.
    ///
    /// A storage failure is returned as `AppError::Persistence`, except a user
    /// deleted since their token was issued, which is an `AuthError`. The
    /// `attempt-created` event is best-effort and never affects the result.
    pub async fn record_attempt(
        &self,
        user_id: i64,
        category_id: i64,
        result: GradeResult,
    ) -> Result<Attempt, AppError> {
        let attempt = self
            .store
            .insert_attempt(NewAttempt {
                user_id,
                category_id,
                score: result.score,
                total: result.total,
                percentage: result.percentage,
                detail: result.detail,
            })
            .await
            .map_err(|e| match e {
                StoreError::NotFound("User") => {
                    AppError::AuthError("User no longer exists".to_string())
                }
                StoreError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
                other => AppError::Persistence(other.to_string()),
            })?;

        tracing::info!(
            "Recorded attempt {} for user {} in category {}: {}%",
            attempt.id,
            user_id,
            category_id,
            attempt.percentage
        );

        emit_best_effort(self.events.as_ref(), QuizEvent::attempt_created(&attempt));

        Ok(attempt)
    }

    /// The career with the highest `min_score` at or below `percentage`, if any.
    pub async fn recommend_career(
        &self,
        category_id: i64,
        percentage: i32,
    ) -> Result<Option<CareerRecommendation>, AppError> {
        ensure_id(category_id, "category")?;
        if !(0..=100).contains(&percentage) {
            return Err(AppError::BadRequest(format!(
                "Percentage must be between 0 and 100, got {}",
                percentage
            )));
        }

        let candidates = self.store.careers_for_category(category_id).await?;

        Ok(matching::match_career(candidates, percentage))
    }

    /// Full submission flow: validate, grade, persist, notify, match.
    pub async fn submit(
        &self,
        user_id: i64,
        category_id: i64,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmitAttemptResponse, AppError> {
        ensure_id(user_id, "user")?;
        if answers.is_empty() {
            return Err(AppError::BadRequest("No answers submitted".to_string()));
        }
        if answers.len() > MAX_SUBMITTED_ANSWERS {
            return Err(AppError::BadRequest(format!(
                "At most {} answers may be submitted",
                MAX_SUBMITTED_ANSWERS
            )));
        }
        self.category(category_id).await?;

        let result = self.grade(category_id, answers).await?;
        let attempt = self.record_attempt(user_id, category_id, result).await?;

        // The attempt is already stored; a failed lookup only loses the suggestion.
        let recommendation = match self.recommend_career(category_id, attempt.percentage).await {
            Ok(recommendation) => recommendation,
            Err(e) => {
                tracing::warn!(
                    "Career lookup failed after recording attempt {}: {:?}",
                    attempt.id,
                    e
                );
                None
            }
        };
        let passed = attempt.percentage >= PASSING_PERCENTAGE;

        Ok(SubmitAttemptResponse {
            attempt: AttemptSummary::from(&attempt),
            detail: attempt.detail.0.clone(),
            passed,
            message: if passed {
                "Quiz passed!".to_string()
            } else {
                "Score below the passing mark. Try again.".to_string()
            },
            recommendation,
        })
    }

    /// Top `limit` users of the category by personal best.
    pub async fn leaderboard(
        &self,
        category_id: i64,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        ensure_id(category_id, "category")?;

        let attempts = self.store.attempt_summaries(category_id).await?;
        let standings = leaderboard::rank(attempts, usize::try_from(limit).unwrap_or(0));

        let user_ids: Vec<i64> = standings.iter().map(|s| s.user_id).collect();
        let users: HashMap<i64, PublicUser> = self
            .store
            .public_users(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(leaderboard::join_users(standings, &users))
    }

    /// The caller's own attempts, newest first, including their answers.
    pub async fn my_attempts(&self, user_id: i64) -> Result<Vec<Attempt>, AppError> {
        Ok(self.store.attempts_for_user(user_id).await?)
    }
}
