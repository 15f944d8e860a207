// src/store/memory.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::Mutex;

use super::{QuizStore, StoreError};
use crate::models::{
    attempt::{Attempt, AttemptSummary, NewAttempt},
    career::{Career, CareerRecommendation},
    category::Category,
    question::Question,
    user::{PublicUser, User},
};
use crate::scoring::sampling::sample_without_replacement;

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    categories: HashMap<i64, Category>,
    questions: HashMap<i64, Question>,
    careers: HashMap<i64, Career>,
    attempts: Vec<Attempt>,
    next_attempt_id: i64,
}

/// `QuizStore` kept entirely in memory. Used by tests and local demos.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent attempt insert fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn add_user(&self, user: User) {
        self.tables.lock().await.users.insert(user.id, user);
    }

    pub async fn add_category(&self, category: Category) {
        self.tables.lock().await.categories.insert(category.id, category);
    }

    pub async fn add_question(&self, question: Question) {
        self.tables.lock().await.questions.insert(question.id, question);
    }

    pub async fn remove_question(&self, id: i64) {
        self.tables.lock().await.questions.remove(&id);
    }

    pub async fn add_career(&self, career: Career) {
        self.tables.lock().await.careers.insert(career.id, career);
    }

    /// Inserts a fully-formed attempt, keeping its id and timestamp.
    pub async fn add_attempt(&self, attempt: Attempt) {
        let mut tables = self.tables.lock().await;
        tables.next_attempt_id = tables.next_attempt_id.max(attempt.id);
        tables.attempts.push(attempt);
    }

    pub async fn attempt_count(&self) -> usize {
        self.tables.lock().await.attempts.len()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn find_category(&self, id: i64) -> Result<Option<Category>, StoreError> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn active_categories(&self) -> Result<Vec<Category>, StoreError> {
        let tables = self.tables.lock().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn sample_questions(
        &self,
        category_id: i64,
        limit: i64,
    ) -> Result<Vec<Question>, StoreError> {
        let tables = self.tables.lock().await;
        let pool: Vec<Question> = tables
            .questions
            .values()
            .filter(|q| q.category_id == category_id)
            .cloned()
            .collect();
        let count = usize::try_from(limit).unwrap_or(0);
        Ok(sample_without_replacement(&pool, count, &mut rand::thread_rng()))
    }

    async fn answer_keys(
        &self,
        category_id: i64,
        question_ids: &[i64],
    ) -> Result<HashMap<i64, i32>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(question_ids
            .iter()
            .filter_map(|id| tables.questions.get(id))
            .filter(|q| q.category_id == category_id)
            .map(|q| (q.id, q.correct_index))
            .collect())
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<Attempt, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection reset".to_string()));
        }

        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&attempt.user_id) {
            return Err(StoreError::NotFound("User"));
        }
        if !tables.categories.contains_key(&attempt.category_id) {
            return Err(StoreError::NotFound("Category"));
        }
        tables.next_attempt_id += 1;
        let saved = Attempt {
            id: tables.next_attempt_id,
            user_id: attempt.user_id,
            category_id: attempt.category_id,
            score: attempt.score,
            total: attempt.total,
            percentage: attempt.percentage,
            detail: Json(attempt.detail),
            created_at: Utc::now(),
        };
        tables.attempts.push(saved.clone());
        Ok(saved)
    }

    async fn attempts_for_user(&self, user_id: i64) -> Result<Vec<Attempt>, StoreError> {
        let tables = self.tables.lock().await;
        let mut attempts: Vec<Attempt> = tables
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        attempts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(attempts)
    }

    async fn attempt_summaries(
        &self,
        category_id: i64,
    ) -> Result<Vec<AttemptSummary>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attempts
            .iter()
            .filter(|a| a.category_id == category_id)
            .map(AttemptSummary::from)
            .collect())
    }

    async fn careers_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<CareerRecommendation>, StoreError> {
        let tables = self.tables.lock().await;
        let Some(category) = tables.categories.get(&category_id) else {
            return Ok(Vec::new());
        };
        Ok(tables
            .careers
            .values()
            .filter(|c| c.category_id == category_id)
            .map(|c| CareerRecommendation {
                career: c.clone(),
                category_name: category.name.clone(),
                category_description: category.description.clone(),
            })
            .collect())
    }

    async fn public_users(&self, ids: &[i64]) -> Result<Vec<PublicUser>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .map(PublicUser::from)
            .collect())
    }
}
