//! Recall@K over predicted and relevant URL sets.

use std::collections::HashSet;

/// Number of relevant URLs that appear in the predicted list.
///
/// Membership is set-based: repeated predictions of the same URL count
/// once, matching how ground truth treats URLs as identity keys.
pub fn intersection_count(predicted: &[String], relevant: &[String]) -> usize {
    let predicted_set: HashSet<&str> = predicted.iter().map(String::as_str).collect();
    relevant
        .iter()
        .filter(|url| predicted_set.contains(url.as_str()))
        .count()
}

/// Recall@K: the fraction of relevant URLs found in the predicted list.
///
/// The predicted list should already be truncated to K. An empty relevant
/// set scores 0.0 rather than dividing by zero.
pub fn recall_at_k(predicted: &[String], relevant: &[String]) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    intersection_count(predicted, relevant) as f64 / relevant.len() as f64
}
