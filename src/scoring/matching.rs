// src/scoring/matching.rs

use crate::models::career::CareerRecommendation;

/// Picks the career with the highest `min_score` the user still clears.
///
/// Returns `None` when no candidate qualifies. Equal thresholds resolve to
/// the lowest id so the choice does not depend on storage order.
pub fn match_career(
    candidates: Vec<CareerRecommendation>,
    percentage: i32,
) -> Option<CareerRecommendation> {
    candidates
        .into_iter()
        .filter(|c| c.career.min_score <= percentage)
        .max_by(|a, b| {
            a.career
                .min_score
                .cmp(&b.career.min_score)
                .then_with(|| b.career.id.cmp(&a.career.id))
        })
}
