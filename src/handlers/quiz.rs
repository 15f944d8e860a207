// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    config::{Config, clamp_limit},
    error::AppError,
    models::{
        attempt::{LeaderboardParams, SubmitAttemptRequest},
        career::RecommendationParams,
    },
    services::QuizService,
    utils::jwt::Claims,
};

/// Query parameters for drawing a paper.
#[derive(Debug, Deserialize)]
pub struct PaperParams {
    pub limit: Option<i64>,
}

/// Draws a random quiz paper for a category.
///
/// Returns up to `limit` (default `QUIZ_QUESTION_COUNT`) questions with the
/// answer key and explanation removed.
pub async fn generate_paper(
    State(quiz): State<QuizService>,
    State(config): State<Config>,
    Path(category_id): Path<i64>,
    Query(params): Query<PaperParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = clamp_limit(params.limit, config.quiz_question_count);
    let paper = quiz.select_questions(category_id, limit).await?;

    Ok(Json(paper))
}

/// Submits a user's answers for a category.
///
/// * Grades every pair against the stored answer keys.
/// * Saves a new attempt (retakes never overwrite earlier ones).
/// * Returns the score, `passed` flag and any career recommendation.
pub async fn submit_paper(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    Path(category_id): Path<i64>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user_id = claims.user_id()?;
    let response = quiz.submit(user_id, category_id, &req.answers).await?;

    Ok(Json(response))
}

/// Retrieves the category leaderboard ranked by personal best.
pub async fn get_leaderboard(
    State(quiz): State<QuizService>,
    State(config): State<Config>,
    Path(category_id): Path<i64>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = clamp_limit(params.limit, config.leaderboard_limit);
    let leaderboard = quiz.leaderboard(category_id, limit).await?;

    Ok(Json(leaderboard))
}

/// Looks up the career recommendation for a percentage.
/// Responds with `null` when nothing qualifies.
pub async fn get_recommendation(
    State(quiz): State<QuizService>,
    Path(category_id): Path<i64>,
    Query(params): Query<RecommendationParams>,
) -> Result<impl IntoResponse, AppError> {
    let recommendation = quiz
        .recommend_career(category_id, params.percentage)
        .await?;

    Ok(Json(recommendation))
}

/// Lists the current user's own attempts, newest first.
pub async fn list_my_attempts(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = quiz.my_attempts(claims.user_id()?).await?;

    Ok(Json(attempts))
}
