// src/store/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use super::{QuizStore, StoreError};
use crate::models::{
    attempt::{Attempt, AttemptSummary, NewAttempt},
    career::CareerRecommendation,
    category::Category,
    question::{AnswerKey, Question},
    user::PublicUser,
};

/// `QuizStore` over the application's Postgres pool.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn find_category(&self, id: i64) -> Result<Option<Category>, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, is_active, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn active_categories(&self) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, is_active, created_at
            FROM categories
            WHERE is_active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn sample_questions(
        &self,
        category_id: i64,
        limit: i64,
    ) -> Result<Vec<Question>, StoreError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, category_id, text, options, correct_index, difficulty, explanation, created_at
            FROM questions
            WHERE category_id = $1
            ORDER BY RANDOM()
            LIMIT $2
            "#,
        )
        .bind(category_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to sample questions: {:?}", e);
            StoreError::from(e)
        })?;

        Ok(questions)
    }

    async fn answer_keys(
        &self,
        category_id: i64,
        question_ids: &[i64],
    ) -> Result<HashMap<i64, i32>, StoreError> {
        if question_ids.is_empty() {
            return Ok(HashMap::new());
        }

        // One round trip for the whole submission.
        let keys = sqlx::query_as::<_, AnswerKey>(
            "SELECT id, correct_index FROM questions WHERE category_id = $1 AND id = ANY($2)",
        )
        .bind(category_id)
        .bind(question_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys.into_iter().map(|k| (k.id, k.correct_index)).collect())
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<Attempt, StoreError> {
        let saved = sqlx::query_as::<_, Attempt>(
            r#"
            INSERT INTO attempts (user_id, category_id, score, total, percentage, detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, category_id, score, total, percentage, detail, created_at
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.category_id)
        .bind(attempt.score)
        .bind(attempt.total)
        .bind(attempt.percentage)
        .bind(Json(attempt.detail))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let violated = e
                .as_database_error()
                .filter(|db| db.code().as_deref() == Some("23503"))
                .map(|db| db.constraint() == Some("attempts_user_id_fkey"));

            match violated {
                Some(true) => StoreError::NotFound("User"),
                Some(false) => StoreError::NotFound("Category"),
                None => {
                    tracing::error!("Failed to insert attempt: {:?}", e);
                    StoreError::from(e)
                }
            }
        })?;

        Ok(saved)
    }

    async fn attempts_for_user(&self, user_id: i64) -> Result<Vec<Attempt>, StoreError> {
        let attempts = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT id, user_id, category_id, score, total, percentage, detail, created_at
            FROM attempts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    async fn attempt_summaries(
        &self,
        category_id: i64,
    ) -> Result<Vec<AttemptSummary>, StoreError> {
        // At most two rows per user: the latest attempt and the best one.
        let summaries = sqlx::query_as::<_, AttemptSummary>(
            r#"
            SELECT id, user_id, category_id, score, total, percentage, created_at
            FROM (
                SELECT
                    id, user_id, category_id, score, total, percentage, created_at,
                    ROW_NUMBER() OVER (
                        PARTITION BY user_id ORDER BY created_at DESC, id DESC
                    ) AS recency_rank,
                    ROW_NUMBER() OVER (
                        PARTITION BY user_id ORDER BY percentage DESC, created_at DESC, id DESC
                    ) AS score_rank
                FROM attempts
                WHERE category_id = $1
            ) ranked
            WHERE recency_rank = 1 OR score_rank = 1
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    async fn careers_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<CareerRecommendation>, StoreError> {
        let careers = sqlx::query_as::<_, CareerRecommendation>(
            r#"
            SELECT
                c.id, c.category_id, c.title, c.description, c.skills, c.learning_path,
                c.video_urls, c.book_urls, c.course_urls, c.min_score, c.created_at,
                cat.name AS category_name,
                cat.description AS category_description
            FROM careers c
            JOIN categories cat ON c.category_id = cat.id
            WHERE c.category_id = $1
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(careers)
    }

    async fn public_users(&self, ids: &[i64]) -> Result<Vec<PublicUser>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, PublicUser>(
            "SELECT id, name, avatar_url FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
