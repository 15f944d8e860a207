// src/handlers/category.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{error::AppError, services::QuizService};

/// Lists the categories quiz takers can choose from.
pub async fn list_categories(
    State(quiz): State<QuizService>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(quiz.active_categories().await?))
}

/// Retrieves a single active category by ID.
pub async fn get_category(
    State(quiz): State<QuizService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(quiz.category(id).await?))
}
