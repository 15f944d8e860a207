// src/scoring/sampling.rs

use rand::Rng;

/// Uniform random sample of up to `count` items, without replacement.
/// Returns every item (in random order) when fewer than `count` exist.
pub fn sample_without_replacement<T: Clone, R: Rng + ?Sized>(
    items: &[T],
    count: usize,
    rng: &mut R,
) -> Vec<T> {
    let amount = count.min(items.len());
    rand::seq::index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}
