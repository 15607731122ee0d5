//! Store ranking by predicted sales

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::models::RankedEntry;

/// Rank shops by score, highest first
///
/// The sort is stable: shops with exactly equal scores keep their input
/// order, so the same input always produces the same ranking.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if the slices differ in length
pub fn rank<S: AsRef<str>>(shop_ids: &[S], scores: &[f64]) -> Result<Vec<RankedEntry>> {
    if shop_ids.len() != scores.len() {
        return Err(Error::InvalidInput(format!(
            "Cannot rank {} shops with {} scores",
            shop_ids.len(),
            scores.len()
        )));
    }

    let mut ranked: Vec<RankedEntry> = shop_ids
        .iter()
        .zip(scores)
        .map(|(shop_id, &score)| RankedEntry::new(shop_id.as_ref(), score))
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(ranked)
}

/// Reduce per-row scores to one score per shop
///
/// A shop keeps the position of its first row and the score of its last row.
#[must_use]
pub fn collapse_per_shop<S: AsRef<str>>(shop_ids: &[S], scores: &[f64]) -> (Vec<String>, Vec<f64>) {
    let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
    let mut shops = Vec::new();
    let mut collapsed = Vec::new();

    for (shop_id, &score) in shop_ids.iter().zip(scores) {
        let shop_id = shop_id.as_ref();
        if let Some(&position) = positions.get(shop_id) {
            collapsed[position] = score;
        } else {
            positions.insert(shop_id, shops.len());
            shops.push(shop_id.to_string());
            collapsed.push(score);
        }
    }

    (shops, collapsed)
}
