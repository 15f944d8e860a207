// tests/quiz_service_tests.rs

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use career_quiz::{
    error::AppError,
    events::QuizEvent,
    models::attempt::SubmittedAnswer,
    services::QuizService,
};
use common::{
    FailingSink, InstrumentedStore, attempt, career, seeded_store, service_with_bus,
};

fn correct(question_id: i64) -> SubmittedAnswer {
    SubmittedAnswer {
        question_id,
        selected_index: (question_id % 4) as i32,
    }
}

fn wrong(question_id: i64) -> SubmittedAnswer {
    SubmittedAnswer {
        question_id,
        selected_index: ((question_id + 1) % 4) as i32,
    }
}

#[tokio::test]
async fn selection_is_sampled_without_replacement() {
    let (quiz, _bus) = service_with_bus(seeded_store().await);

    let paper = quiz.select_questions(1, 20).await.unwrap();

    assert_eq!(paper.len(), 20);
    let ids: HashSet<i64> = paper.iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), 20);
    assert!(ids.iter().all(|id| (1..=30).contains(id)));
}

#[tokio::test]
async fn small_category_returns_every_question() {
    let (quiz, _bus) = service_with_bus(seeded_store().await);

    let paper = quiz.select_questions(2, 20).await.unwrap();

    let mut ids: Vec<i64> = paper.iter().map(|q| q.id).collect();
    ids.sort();
    assert_eq!(ids, vec![101, 102, 103, 104, 105]);
}

#[tokio::test]
async fn selection_never_exposes_answer_key() {
    let (quiz, _bus) = service_with_bus(seeded_store().await);

    for category_id in [1, 2] {
        let paper = quiz.select_questions(category_id, 100).await.unwrap();
        let json = serde_json::to_value(&paper).unwrap();

        for q in json.as_array().unwrap() {
            let obj = q.as_object().unwrap();
            assert!(!obj.contains_key("correct_index"));
            assert!(!obj.contains_key("explanation"));
            assert!(obj.contains_key("options"));
        }
    }
}

#[tokio::test]
async fn selection_rejects_unknown_inactive_and_malformed_categories() {
    let (quiz, _bus) = service_with_bus(seeded_store().await);

    assert!(matches!(quiz.select_questions(99, 20).await, Err(AppError::NotFound(_))));
    assert!(matches!(quiz.select_questions(3, 20).await, Err(AppError::NotFound(_))));
    assert!(matches!(quiz.select_questions(0, 20).await, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn selection_rejects_non_positive_count() {
    let (quiz, _bus) = service_with_bus(seeded_store().await);

    assert!(matches!(quiz.select_questions(1, 0).await, Err(AppError::BadRequest(_))));
    assert!(matches!(quiz.select_questions(1, -5).await, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn all_correct_submission_scores_full_marks() {
    let store = seeded_store().await;
    let (quiz, _bus) = service_with_bus(store.clone());
    let answers: Vec<SubmittedAnswer> = (1..=20).map(correct).collect();

    let response = quiz.submit(1, 1, &answers).await.unwrap();

    assert_eq!(response.attempt.score, 20);
    assert_eq!(response.attempt.total, 20);
    assert_eq!(response.attempt.percentage, 100);
    assert!(response.passed);
    assert_eq!(response.detail.len(), 20);
    assert_eq!(store.attempt_count().await, 1);
}

#[tokio::test]
async fn percentages_round_to_nearest() {
    let (quiz, _bus) = service_with_bus(seeded_store().await);

    let one = quiz.grade(1, &[correct(1)]).await.unwrap();
    let half = quiz.grade(1, &[correct(1), wrong(2)]).await.unwrap();
    let third = quiz.grade(1, &[correct(1), wrong(2), wrong(3)]).await.unwrap();

    assert_eq!(one.percentage, 100);
    assert_eq!(half.percentage, 50);
    assert_eq!(third.percentage, 33);
}

#[tokio::test]
async fn unknown_and_foreign_questions_are_graded_incorrect() {
    let (quiz, _bus) = service_with_bus(seeded_store().await);

    // 999 does not exist, 101 belongs to another category.
    let answers = [correct(1), correct(999), SubmittedAnswer { question_id: 101, selected_index: 0 }];
    let response = quiz.submit(2, 1, &answers).await.unwrap();

    assert_eq!(response.attempt.score, 1);
    assert_eq!(response.attempt.total, 3);
    assert_eq!(response.attempt.percentage, 33);
    assert!(!response.passed);
    let flags: Vec<bool> = response.detail.iter().map(|d| d.correct).collect();
    assert_eq!(flags, vec![true, false, false]);
}

#[tokio::test]
async fn answer_keys_are_fetched_once_per_submission() {
    let store = Arc::new(InstrumentedStore::new(seeded_store().await));
    let quiz = QuizService::new(store.clone(), Arc::new(FailingSink));
    let answers: Vec<SubmittedAnswer> = (1..=12).map(correct).collect();

    let response = quiz.submit(1, 1, &answers).await.unwrap();

    assert_eq!(response.attempt.total, 12);
    assert_eq!(store.answer_key_calls(), 1);
}

#[tokio::test]
async fn deleted_question_no_longer_scores() {
    let store = seeded_store().await;
    let (quiz, _bus) = service_with_bus(store.clone());

    store.remove_question(5).await;
    let result = quiz.grade(1, &[correct(5), correct(6)]).await.unwrap();

    assert_eq!(result.score, 1);
    assert_eq!(result.total, 2);
}

#[tokio::test]
async fn empty_submission_is_a_validation_error() {
    let store = seeded_store().await;
    let (quiz, _bus) = service_with_bus(store.clone());

    let err = quiz.submit(1, 1, &[]).await.unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(store.attempt_count().await, 0);
}

#[tokio::test]
async fn submission_to_inactive_category_is_rejected() {
    let store = seeded_store().await;
    let (quiz, _bus) = service_with_bus(store.clone());

    let err = quiz.submit(1, 3, &[correct(1)]).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(store.attempt_count().await, 0);
}

#[tokio::test]
async fn persisted_attempt_is_announced() {
    let (quiz, bus) = service_with_bus(seeded_store().await);
    let mut rx = bus.subscribe();

    let response = quiz.submit(4, 1, &[correct(1), wrong(2)]).await.unwrap();

    match rx.recv().await.unwrap() {
        QuizEvent::AttemptCreated {
            id,
            user_id,
            category_id,
            score,
            total,
            percentage,
            created_at,
        } => {
            assert_eq!(id, response.attempt.id);
            assert_eq!(user_id, 4);
            assert_eq!(category_id, 1);
            assert_eq!((score, total, percentage), (1, 2, 50));
            assert_eq!(created_at, response.attempt.created_at);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn notification_failure_does_not_undo_the_attempt() {
    let store = seeded_store().await;
    let quiz = QuizService::new(store.clone(), Arc::new(FailingSink));

    let response = quiz.submit(1, 1, &[correct(1)]).await;

    assert!(response.is_ok());
    assert_eq!(store.attempt_count().await, 1);
    let mine = quiz.my_attempts(1).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].percentage, 100);
}

#[tokio::test]
async fn career_lookup_failure_keeps_the_recorded_attempt() {
    let memory = seeded_store().await;
    memory.add_career(career(1, 1, 0)).await;
    let store = Arc::new(InstrumentedStore::new(memory.clone()));
    store.fail_career_reads(true);
    let quiz = QuizService::new(store, Arc::new(FailingSink));

    let response = quiz.submit(1, 1, &[correct(1)]).await.unwrap();

    assert_eq!(response.attempt.percentage, 100);
    assert!(response.recommendation.is_none());
    assert_eq!(memory.attempt_count().await, 1);
}

#[tokio::test]
async fn submission_by_deleted_user_is_an_auth_error() {
    let store = seeded_store().await;
    let (quiz, _bus) = service_with_bus(store.clone());

    // A valid token for a user that no longer exists.
    let err = quiz.submit(77, 1, &[correct(1)]).await.unwrap_err();

    assert!(matches!(err, AppError::AuthError(_)));
    assert_eq!(store.attempt_count().await, 0);
}

#[tokio::test]
async fn persistence_failure_is_reported_not_swallowed() {
    let store = seeded_store().await;
    let (quiz, bus) = service_with_bus(store.clone());
    let mut rx = bus.subscribe();
    store.fail_writes(true);

    let err = quiz.submit(1, 1, &[correct(1)]).await.unwrap_err();

    assert!(matches!(err, AppError::Persistence(_)));
    assert_eq!(store.attempt_count().await, 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn career_threshold_picks_highest_qualifying_tier() {
    let store = seeded_store().await;
    store.add_career(career(1, 1, 50)).await;
    store.add_career(career(2, 1, 80)).await;
    let (quiz, _bus) = service_with_bus(store);

    let at_79 = quiz.recommend_career(1, 79).await.unwrap().unwrap();
    let at_80 = quiz.recommend_career(1, 80).await.unwrap().unwrap();
    let at_45 = quiz.recommend_career(1, 45).await.unwrap();

    assert_eq!(at_79.career.min_score, 50);
    assert_eq!(at_80.career.min_score, 80);
    assert!(at_45.is_none());
    assert_eq!(at_80.category_name, "Software");
}

#[tokio::test]
async fn category_without_career_yields_no_recommendation() {
    let (quiz, _bus) = service_with_bus(seeded_store().await);

    assert!(quiz.recommend_career(2, 100).await.unwrap().is_none());
}

#[tokio::test]
async fn recommendation_rejects_out_of_range_percentage() {
    let (quiz, _bus) = service_with_bus(seeded_store().await);

    assert!(matches!(quiz.recommend_career(1, 101).await, Err(AppError::BadRequest(_))));
    assert!(matches!(quiz.recommend_career(1, -1).await, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn submission_uses_stored_percentage_for_recommendation() {
    let store = seeded_store().await;
    store.add_career(career(1, 1, 0)).await;
    let (quiz, _bus) = service_with_bus(store);

    // 0% still clears a zero threshold, while `passed` stays false.
    let response = quiz.submit(3, 1, &[wrong(1)]).await.unwrap();

    assert_eq!(response.attempt.percentage, 0);
    assert!(!response.passed);
    assert_eq!(response.recommendation.unwrap().career.id, 1);
}

#[tokio::test]
async fn leaderboard_ranks_best_score_then_recency() {
    let store = seeded_store().await;
    store.add_attempt(attempt(1, 1, 1, 60, 10)).await;
    store.add_attempt(attempt(2, 1, 1, 90, 20)).await;
    store.add_attempt(attempt(3, 2, 1, 90, 0)).await;
    store.add_attempt(attempt(4, 3, 2, 100, 0)).await;
    let (quiz, _bus) = service_with_bus(store);

    let board = quiz.leaderboard(1, 10).await.unwrap();

    assert_eq!(board.len(), 2);
    assert_eq!(board[0].user_id, 1);
    assert_eq!(board[0].best_score, 90);
    assert_eq!(board[0].user.name, "Ada");
    assert_eq!(board[1].user_id, 2);
    assert_eq!(board[1].best_score, 90);

    let json = serde_json::to_value(&board).unwrap();
    for row in json.as_array().unwrap() {
        assert!(row["latest_attempt"].get("detail").is_none());
        assert!(row["user"].get("password").is_none());
        assert!(row["user"].get("email").is_none());
    }
}

#[tokio::test]
async fn leaderboard_truncates_to_limit() {
    let store = seeded_store().await;
    for user_id in 1..=5 {
        store
            .add_attempt(attempt(user_id, user_id, 1, 40 + 10 * user_id as i32, 0))
            .await;
    }
    let (quiz, _bus) = service_with_bus(store);

    let board = quiz.leaderboard(1, 1).await.unwrap();

    assert_eq!(board.len(), 1);
    assert_eq!(board[0].user_id, 5);
    assert_eq!(board[0].best_score, 90);
}

#[tokio::test]
async fn own_attempts_are_newest_first() {
    let store = seeded_store().await;
    store.add_attempt(attempt(1, 1, 1, 40, 0)).await;
    store.add_attempt(attempt(2, 1, 2, 80, 30)).await;
    store.add_attempt(attempt(3, 2, 1, 70, 60)).await;
    let (quiz, _bus) = service_with_bus(store);

    let mine = quiz.my_attempts(1).await.unwrap();

    let ids: Vec<i64> = mine.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![2, 1]);
}
