//! Console output utilities
//!
//! Plain-text reports printed by the binary at the end of a run.

use arrow::record_batch::RecordBatch;

use crate::models::RankedEntry;

/// Print the ranking, best shop first
pub fn print_ranking(ranking: &[RankedEntry]) {
    if ranking.is_empty() {
        println!("Store ranking: unavailable");
        return;
    }
    println!("Store ranking based on predicted sales:");
    for (position, entry) in ranking.iter().enumerate() {
        println!("  {}. {entry}", position + 1);
    }
}

/// Print summary information about record batches
pub fn print_batch_summary(label: &str, batches: &[RecordBatch]) {
    println!(
        "{label}: {} rows in {} batches",
        batches.iter().map(RecordBatch::num_rows).sum::<usize>(),
        batches.len()
    );
}
