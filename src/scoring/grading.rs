// src/scoring/grading.rs

use std::collections::HashMap;

use crate::models::attempt::{AnswerDetail, GradeResult, SubmittedAnswer};

/// Rounded percentage of `score` out of `total`, half rounding up.
///
/// Integer-only so threshold comparisons downstream never see a float
/// artifact (33.33 -> 33, 66.67 -> 67, 12.5 -> 13). Zero when `total` is zero.
pub fn percentage(score: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    let score = i64::from(score.clamp(0, total));
    let total = i64::from(total);
    ((200 * score + total) / (2 * total)) as i32
}

/// Grades a submission against the answer keys of the resolved questions.
///
/// `answer_keys` maps question id to correct option index. A pair whose
/// question is missing from the map, or whose selected index differs, is
/// incorrect. `total` is the number of submitted pairs, and `detail` keeps
/// the submission order.
pub fn grade(answers: &[SubmittedAnswer], answer_keys: &HashMap<i64, i32>) -> GradeResult {
    let mut score = 0;

    let detail: Vec<AnswerDetail> = answers
        .iter()
        .map(|a| {
            let correct = answer_keys
                .get(&a.question_id)
                .is_some_and(|&key| key == a.selected_index);
            if correct {
                score += 1;
            }
            AnswerDetail {
                question_id: a.question_id,
                selected_index: a.selected_index,
                correct,
            }
        })
        .collect();

    let total = detail.len() as i32;

    GradeResult {
        score,
        total,
        percentage: percentage(score, total),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(question_id: i64, selected_index: i32) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected_index,
        }
    }

    fn keys(pairs: &[(i64, i32)]) -> HashMap<i64, i32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_grade_perfect() {
        let key = keys(&[(1, 0), (2, 3), (3, 1)]);
        let result = grade(&[answer(1, 0), answer(2, 3), answer(3, 1)], &key);

        assert_eq!(result.score, 3);
        assert_eq!(result.total, 3);
        assert_eq!(result.percentage, 100);
        assert!(result.detail.iter().all(|d| d.correct));
    }

    #[test]
    fn test_grade_rounding() {
        let key = keys(&[(1, 0), (2, 0), (3, 0)]);

        assert_eq!(grade(&[answer(1, 0)], &key).percentage, 100);
        assert_eq!(grade(&[answer(1, 0), answer(2, 1)], &key).percentage, 50);
        assert_eq!(
            grade(&[answer(1, 0), answer(2, 1), answer(3, 1)], &key).percentage,
            33
        );
        assert_eq!(
            grade(&[answer(1, 0), answer(2, 0), answer(3, 1)], &key).percentage,
            67
        );
    }

    #[test]
    fn test_percentage_half_rounds_up() {
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(7, 10), 70);
        assert_eq!(percentage(139, 200), 70);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_grade_unknown_question_is_incorrect() {
        let key = keys(&[(1, 2)]);
        let result = grade(&[answer(1, 2), answer(999, 0)], &key);

        assert_eq!(result.score, 1);
        assert_eq!(result.total, 2);
        assert_eq!(result.percentage, 50);
        assert!(!result.detail[1].correct);
    }

    #[test]
    fn test_grade_out_of_range_and_duplicates() {
        let key = keys(&[(1, 2)]);
        let result = grade(&[answer(1, -1), answer(1, 42), answer(1, 2), answer(1, 2)], &key);

        assert_eq!(result.score, 2);
        assert_eq!(result.total, 4);
        assert_eq!(result.percentage, 50);
    }

    #[test]
    fn test_grade_preserves_submission_order() {
        let key = keys(&[(5, 1), (2, 0)]);
        let result = grade(&[answer(5, 0), answer(2, 0)], &key);

        let ids: Vec<i64> = result.detail.iter().map(|d| d.question_id).collect();
        assert_eq!(ids, vec![5, 2]);
        assert_eq!(
            result.detail[0],
            AnswerDetail {
                question_id: 5,
                selected_index: 0,
                correct: false
            }
        );
    }

    #[test]
    fn test_grade_empty_submission() {
        let result = grade(&[], &HashMap::new());
        assert_eq!(result.total, 0);
        assert_eq!(result.percentage, 0);
    }
}
