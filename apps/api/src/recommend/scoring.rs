//! Topic affinity scoring.
//!
//! A candidate earns points for every topic it shares with the user's liked books
//! (exact match) and fewer points for topics that merely contain one another
//! ("machine learning" vs "learning"). The topic score is then doubled and the
//! candidate's average rating added, so topic overlap dominates and the rating
//! breaks near-ties.

use std::collections::BTreeSet;

pub const EXACT_MATCH_WEIGHT: f64 = 3.0;
pub const PARTIAL_MATCH_WEIGHT: f64 = 1.0;
pub const TOPIC_SCORE_MULTIPLIER: f64 = 2.0;

/// Lower-cased, trimmed, de-duplicated topic labels.
pub type TopicSet = BTreeSet<String>;

pub fn topic_set<I, S>(topics: I) -> TopicSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    topics
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicOverlap {
    pub exact: usize,
    pub partial: usize,
}

/// Counts exact matches, then substring matches between distinct labels.
/// A pair that matched exactly is not counted a second time as partial.
pub fn topic_overlap(candidate: &TopicSet, liked: &TopicSet) -> TopicOverlap {
    let exact = candidate.intersection(liked).count();
    let partial = candidate
        .iter()
        .flat_map(|c| liked.iter().map(move |l| (c, l)))
        .filter(|(c, l)| c != l && (c.contains(l.as_str()) || l.contains(c.as_str())))
        .count();
    TopicOverlap { exact, partial }
}

pub fn topic_score(overlap: TopicOverlap) -> f64 {
    overlap.exact as f64 * EXACT_MATCH_WEIGHT + overlap.partial as f64 * PARTIAL_MATCH_WEIGHT
}

/// finalScore = (exact × 3 + partial × 1) × 2 + average_rating
pub fn score(candidate: &TopicSet, liked: &TopicSet, average_rating: f64) -> f64 {
    topic_score(topic_overlap(candidate, liked)) * TOPIC_SCORE_MULTIPLIER + average_rating
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_set_normalizes_case_and_whitespace() {
        let set = topic_set(["Python", " python ", "ML", ""]);
        assert_eq!(set, topic_set(["python", "ml"]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_exact_match_scores_three_doubled() {
        let score = score(&topic_set(["Python"]), &topic_set(["python", "ml"]), 0.0);
        assert!((score - 6.0).abs() < f64::EPSILON, "score was {score}");
    }

    #[test]
    fn test_partial_match_counts_substrings_both_ways() {
        let liked = topic_set(["machine learning", "rust"]);
        let candidate = topic_set(["learning", "rust programming"]);
        let overlap = topic_overlap(&candidate, &liked);
        assert_eq!(overlap, TopicOverlap { exact: 0, partial: 2 });
        assert!((score(&candidate, &liked, 0.0) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exact_pairs_are_not_double_counted_as_partial() {
        let overlap = topic_overlap(&topic_set(["python"]), &topic_set(["python"]));
        assert_eq!(overlap, TopicOverlap { exact: 1, partial: 0 });
    }

    #[test]
    fn test_average_rating_is_added_after_multiplier() {
        // (1 × 3 + 1 × 1) × 2 + 4.5
        let liked = topic_set(["data", "databases"]);
        let candidate = topic_set(["data"]);
        let s = score(&candidate, &liked, 4.5);
        assert!((s - 12.5).abs() < f64::EPSILON, "score was {s}");
    }

    #[test]
    fn test_no_overlap_scores_rating_only() {
        let s = score(&topic_set(["cooking"]), &topic_set(["python", "ml"]), 3.2);
        assert!((s - 3.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_is_independent_of_input_order() {
        let a = score(
            &topic_set(["Deep Learning", "Python", "Data"]),
            &topic_set(["python", "learning", "databases"]),
            4.0,
        );
        let b = score(
            &topic_set(["Data", "Python", "Deep Learning"]),
            &topic_set(["databases", "learning", "python"]),
            4.0,
        );
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_empty_liked_topics_scores_rating_only() {
        let s = score(&topic_set(["python"]), &TopicSet::new(), 2.0);
        assert!((s - 2.0).abs() < f64::EPSILON);
    }
}
