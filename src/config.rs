// src/config.rs

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use dotenvy::dotenv;

/// Percentage at which an attempt is reported as passed.
/// Independent of any career's `min_score`.
pub const PASSING_PERCENTAGE: i32 = 70;

/// `min_score` given to careers created without one.
pub const DEFAULT_MIN_SCORE: i32 = 70;

/// Upper bound on answers accepted in one submission.
pub const MAX_SUBMITTED_ANSWERS: usize = 200;

/// Upper bound for any caller-supplied `limit`.
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub quiz_question_count: i64,
    pub leaderboard_limit: i64,
    pub event_channel_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration: parse_or("JWT_EXPIRATION", 86_400),
            rust_log,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            quiz_question_count: parse_or("QUIZ_QUESTION_COUNT", 20),
            leaderboard_limit: parse_or("LEADERBOARD_LIMIT", 10),
            event_channel_capacity: parse_or("EVENT_CHANNEL_CAPACITY", 256),
        }
    }
}

/// Reads an optional numeric variable, panicking on a malformed value
/// so a typo never silently falls back to the default.
fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("Invalid {} value '{}': {}", key, raw, e)),
        Err(_) => default,
    }
}

/// Clamps a caller-supplied limit into `1..=MAX_PAGE_LIMIT`.
pub fn clamp_limit(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, MAX_PAGE_LIMIT)
}
