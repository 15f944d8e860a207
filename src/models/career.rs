// src/models/career.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use url::Url;
use validator::Validate;

/// Represents the 'careers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Career {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub skills: Json<Vec<String>>,

    /// Ordered learning steps.
    pub learning_path: Json<Vec<String>>,

    pub video_urls: Json<Vec<String>>,
    pub book_urls: Json<Vec<String>>,
    pub course_urls: Json<Vec<String>>,

    /// Percentage a user must reach for this career to be recommended.
    pub min_score: i32,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A career joined with its category, as returned to quiz takers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CareerRecommendation {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub career: Career,
    pub category_name: String,
    pub category_description: String,
}

/// DTO for creating a career entry.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCareerRequest {
    #[validate(range(min = 1))]
    pub category_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    #[validate(custom(function = validate_string_list))]
    #[serde(default)]
    pub skills: Vec<String>,
    #[validate(custom(function = validate_string_list))]
    #[serde(default)]
    pub learning_path: Vec<String>,
    #[validate(custom(function = validate_urls))]
    #[serde(default)]
    pub video_urls: Vec<String>,
    #[validate(custom(function = validate_urls))]
    #[serde(default)]
    pub book_urls: Vec<String>,
    #[validate(custom(function = validate_urls))]
    #[serde(default)]
    pub course_urls: Vec<String>,
    #[validate(range(min = 0, max = 100))]
    pub min_score: Option<i32>,
}

/// DTO for updating a career entry. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCareerRequest {
    #[validate(range(min = 1))]
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    #[validate(custom(function = validate_string_list))]
    pub skills: Option<Vec<String>>,
    #[validate(custom(function = validate_string_list))]
    pub learning_path: Option<Vec<String>>,
    #[validate(custom(function = validate_urls))]
    pub video_urls: Option<Vec<String>>,
    #[validate(custom(function = validate_urls))]
    pub book_urls: Option<Vec<String>>,
    #[validate(custom(function = validate_urls))]
    pub course_urls: Option<Vec<String>>,
    #[validate(range(min = 0, max = 100))]
    pub min_score: Option<i32>,
}

impl UpdateCareerRequest {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.skills.is_none()
            && self.learning_path.is_none()
            && self.video_urls.is_none()
            && self.book_urls.is_none()
            && self.course_urls.is_none()
            && self.min_score.is_none()
    }
}

/// Query parameters for a recommendation lookup.
#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub percentage: i32,
}

fn validate_string_list(items: &[String]) -> Result<(), validator::ValidationError> {
    if items.len() > 50 {
        return Err(validator::ValidationError::new("too_many_items"));
    }
    for item in items {
        if item.trim().is_empty() {
            return Err(validator::ValidationError::new("item_cannot_be_empty"));
        }
        if item.len() > 500 {
            return Err(validator::ValidationError::new("item_too_long"));
        }
    }
    Ok(())
}

/// Validates a collection of resource links, ensuring each is a well-formed http(s) URL.
fn validate_urls(urls: &[String]) -> Result<(), validator::ValidationError> {
    if urls.len() > 50 {
        return Err(validator::ValidationError::new("too_many_urls"));
    }
    for url in urls {
        if url.len() > 500 {
            return Err(validator::ValidationError::new("url_too_long"));
        }
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return Err(validator::ValidationError::new("invalid_url")),
        }
    }
    Ok(())
}
