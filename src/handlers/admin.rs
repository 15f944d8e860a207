// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json as SqlJson};
use validator::Validate;

use crate::{
    config::DEFAULT_MIN_SCORE,
    error::{AppError, conflict_or_internal},
    events::{ChangeAction, EventBus, QuizEvent, emit_best_effort},
    models::{
        career::{Career, CreateCareerRequest, UpdateCareerRequest},
        category::{Category, CreateCategoryRequest, UpdateCategoryRequest},
        question::{
            CreateQuestionRequest, Question, QuestionListParams, UpdateQuestionRequest,
            ensure_answer_index,
        },
        user::{AdminCreateUserRequest, AdminUpdateUserRequest, User},
    },
    utils::{hash::hash_password, html::clean_html, jwt::Claims},
};

const DEFAULT_DIFFICULTY: &str = "medium";

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role, avatar_url, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// Creates a new user with specific role.
/// Admin only.
pub async fn create_user(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    let hashed_password = hash_password(&payload.password)?;

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, password, role, avatar_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(payload.name.trim())
    .bind(&email)
    .bind(hashed_password)
    .bind(&payload.role)
    .bind(&payload.avatar_url)
    .fetch_one(&pool)
    .await
    .map_err(|e| conflict_or_internal(e, format!("Email '{}' is already registered", email)))?;

    emit_best_effort(
        &events,
        QuizEvent::UserChanged {
            id,
            action: ChangeAction::Created,
        },
    );

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates user information.
/// Admin only.
pub async fn update_user(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.name.is_none()
        && payload.email.is_none()
        && payload.role.is_none()
        && payload.password.is_none()
        && payload.avatar_url.is_none()
    {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name.trim().to_string());
    }

    if let Some(email) = payload.email {
        separated.push("email = ");
        separated.push_bind_unseparated(email.trim().to_lowercase());
    }

    if let Some(role) = payload.role {
        separated.push("role = ");
        separated.push_bind_unseparated(role);
    }

    if let Some(password) = payload.password {
        separated.push("password = ");
        separated.push_bind_unseparated(hash_password(&password)?);
    }

    if let Some(avatar_url) = payload.avatar_url {
        separated.push("avatar_url = ");
        separated.push_bind_unseparated(avatar_url);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder
        .build()
        .execute(&pool)
        .await
        .map_err(|e| conflict_or_internal(e, "Email is already registered".to_string()))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    emit_best_effort(
        &events,
        QuizEvent::UserChanged {
            id,
            action: ChangeAction::Updated,
        },
    );

    Ok(StatusCode::OK)
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self.
pub async fn delete_user(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if id == claims.user_id()? {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    emit_best_effort(
        &events,
        QuizEvent::UserChanged {
            id,
            action: ChangeAction::Deleted,
        },
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Lists all categories, including inactive ones.
/// Admin only.
pub async fn list_categories(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, is_active, created_at FROM categories ORDER BY name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(categories))
}

/// Creates a new quiz category.
/// Admin only.
pub async fn create_category(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = payload.name.trim().to_string();

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO categories (name, description, is_active)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&name)
    .bind(clean_html(payload.description.as_deref().unwrap_or("")))
    .bind(payload.is_active.unwrap_or(true))
    .fetch_one(&pool)
    .await
    .map_err(|e| conflict_or_internal(e, format!("Category '{}' already exists", name)))?;

    emit_best_effort(
        &events,
        QuizEvent::CategoryChanged {
            id,
            action: ChangeAction::Created,
        },
    );

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a category by ID.
/// Admin only.
pub async fn update_category(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.is_empty() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE categories SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name.trim().to_string());
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(clean_html(&description));
    }

    if let Some(is_active) = payload.is_active {
        separated.push("is_active = ");
        separated.push_bind_unseparated(is_active);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder
        .build()
        .execute(&pool)
        .await
        .map_err(|e| conflict_or_internal(e, "Category name already exists".to_string()))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    emit_best_effort(
        &events,
        QuizEvent::CategoryChanged {
            id,
            action: ChangeAction::Updated,
        },
    );

    Ok(StatusCode::OK)
}

/// Deletes a category with its questions, careers and attempts.
/// Admin only.
pub async fn delete_category(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete category: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    emit_best_effort(
        &events,
        QuizEvent::CategoryChanged {
            id,
            action: ChangeAction::Deleted,
        },
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Lists questions with their answer keys, optionally for one category.
/// Admin only.
pub async fn list_questions(
    State(pool): State<PgPool>,
    Query(params): Query<QuestionListParams>,
) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, category_id, text, options, correct_index, difficulty, explanation, created_at
        FROM questions
        WHERE ($1::BIGINT IS NULL OR category_id = $1)
        ORDER BY id DESC
        "#,
    )
    .bind(params.category_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}

/// Creates a new quiz question.
/// Admin only.
pub async fn create_question(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure_answer_index(payload.options.len(), payload.correct_index)?;

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO questions
        (category_id, text, options, correct_index, difficulty, explanation)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(payload.category_id)
    .bind(clean_html(&payload.text))
    .bind(SqlJson(payload.options))
    .bind(payload.correct_index)
    .bind(payload.difficulty.as_deref().unwrap_or(DEFAULT_DIFFICULTY))
    .bind(payload.explanation.as_deref().map(clean_html))
    .fetch_one(&pool)
    .await
    .map_err(|e| conflict_or_internal(e, "Question already exists".to_string()))?;

    emit_best_effort(
        &events,
        QuizEvent::QuestionChanged {
            id,
            action: ChangeAction::Created,
        },
    );

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a question by ID.
/// Admin only. The answer key must stay inside the (possibly new) option list.
pub async fn update_question(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.is_empty() {
        return Ok(StatusCode::OK);
    }

    let mut tx = pool.begin().await?;

    if payload.options.is_some() || payload.correct_index.is_some() {
        // Row lock keeps a concurrent edit from invalidating the check below.
        let (options, correct_index): (SqlJson<Vec<String>>, i32) = sqlx::query_as(
            "SELECT options, correct_index FROM questions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

        let options_len = payload.options.as_ref().map_or(options.0.len(), Vec::len);
        ensure_answer_index(options_len, payload.correct_index.unwrap_or(correct_index))?;
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE questions SET ");
    let mut separated = builder.separated(", ");

    if let Some(category_id) = payload.category_id {
        separated.push("category_id = ");
        separated.push_bind_unseparated(category_id);
    }

    if let Some(text) = payload.text {
        separated.push("text = ");
        separated.push_bind_unseparated(clean_html(&text));
    }

    if let Some(options) = payload.options {
        separated.push("options = ");
        separated.push_bind_unseparated(SqlJson(options));
    }

    if let Some(correct_index) = payload.correct_index {
        separated.push("correct_index = ");
        separated.push_bind_unseparated(correct_index);
    }

    if let Some(difficulty) = payload.difficulty {
        separated.push("difficulty = ");
        separated.push_bind_unseparated(difficulty);
    }

    if let Some(explanation) = payload.explanation {
        separated.push("explanation = ");
        separated.push_bind_unseparated(clean_html(&explanation));
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder
        .build()
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or_internal(e, "Question already exists".to_string()))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tx.commit().await?;

    emit_best_effort(
        &events,
        QuizEvent::QuestionChanged {
            id,
            action: ChangeAction::Updated,
        },
    );

    Ok(StatusCode::OK)
}

/// Deletes a quiz question by ID.
/// Admin only. Past attempts keep their detail; the id simply stops resolving.
pub async fn delete_question(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    emit_best_effort(
        &events,
        QuizEvent::QuestionChanged {
            id,
            action: ChangeAction::Deleted,
        },
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Careers
// ---------------------------------------------------------------------------

/// Lists every career entry.
/// Admin only.
pub async fn list_careers(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let careers = sqlx::query_as::<_, Career>(
        r#"
        SELECT id, category_id, title, description, skills, learning_path,
               video_urls, book_urls, course_urls, min_score, created_at
        FROM careers
        ORDER BY category_id
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(careers))
}

/// Creates a career entry for a category.
/// Admin only. A category holds at most one career.
pub async fn create_career(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Json(payload): Json<CreateCareerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO careers
        (category_id, title, description, skills, learning_path,
         video_urls, book_urls, course_urls, min_score)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(payload.category_id)
    .bind(payload.title.trim())
    .bind(clean_html(payload.description.as_deref().unwrap_or("")))
    .bind(SqlJson(payload.skills))
    .bind(SqlJson(payload.learning_path))
    .bind(SqlJson(payload.video_urls))
    .bind(SqlJson(payload.book_urls))
    .bind(SqlJson(payload.course_urls))
    .bind(payload.min_score.unwrap_or(DEFAULT_MIN_SCORE))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        conflict_or_internal(
            e,
            format!("Category {} already has a career", payload.category_id),
        )
    })?;

    emit_best_effort(
        &events,
        QuizEvent::CareerChanged {
            id,
            action: ChangeAction::Created,
        },
    );

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a career entry by ID.
/// Admin only.
pub async fn update_career(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCareerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.is_empty() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE careers SET ");
    let mut separated = builder.separated(", ");

    if let Some(category_id) = payload.category_id {
        separated.push("category_id = ");
        separated.push_bind_unseparated(category_id);
    }

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title.trim().to_string());
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(clean_html(&description));
    }

    let lists = [
        ("skills = ", payload.skills),
        ("learning_path = ", payload.learning_path),
        ("video_urls = ", payload.video_urls),
        ("book_urls = ", payload.book_urls),
        ("course_urls = ", payload.course_urls),
    ];
    for (column, value) in lists {
        if let Some(items) = value {
            separated.push(column);
            separated.push_bind_unseparated(SqlJson(items));
        }
    }

    if let Some(min_score) = payload.min_score {
        separated.push("min_score = ");
        separated.push_bind_unseparated(min_score);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder
        .build()
        .execute(&pool)
        .await
        .map_err(|e| conflict_or_internal(e, "That category already has a career".to_string()))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Career not found".to_string()));
    }

    emit_best_effort(
        &events,
        QuizEvent::CareerChanged {
            id,
            action: ChangeAction::Updated,
        },
    );

    Ok(StatusCode::OK)
}

/// Deletes a career entry by ID.
/// Admin only.
pub async fn delete_career(
    State(pool): State<PgPool>,
    State(events): State<EventBus>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM careers WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete career: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Career not found".to_string()));
    }

    emit_best_effort(
        &events,
        QuizEvent::CareerChanged {
            id,
            action: ChangeAction::Deleted,
        },
    );

    Ok(StatusCode::NO_CONTENT)
}
