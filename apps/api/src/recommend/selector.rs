use std::collections::{HashMap, HashSet};

use crate::models::Book;
use crate::recommend::scoring::{score, topic_set, TopicSet};
use crate::recommend::RecommendationSource;

pub const DEFAULT_NUM_RECOMMENDATIONS: usize = 5;
/// Ratings at or above this mark a book as liked.
pub const LIKED_RATING_THRESHOLD: i64 = 4;

#[derive(Debug, Clone)]
pub struct Selection {
    pub recommendations: Vec<Book>,
    /// Rated books the user liked, in retrieval order. Empty means rating order was used.
    pub liked: Vec<Book>,
    pub strategy: RecommendationSource,
}

/// Books the user rated at or above the liked threshold, in retrieval order.
pub fn liked_books(candidates: &[Book], ratings: &HashMap<String, i64>) -> Vec<Book> {
    candidates
        .iter()
        .filter(|b| {
            ratings
                .get(&b.id)
                .is_some_and(|&r| r >= LIKED_RATING_THRESHOLD)
        })
        .cloned()
        .collect()
}

/// Candidates that are neither rated nor dismissed, in retrieval order.
pub fn eligible_books<'a>(
    candidates: &'a [Book],
    ratings: &HashMap<String, i64>,
    dismissed: &HashSet<String>,
) -> Vec<&'a Book> {
    candidates
        .iter()
        .filter(|b| !ratings.contains_key(&b.id) && !dismissed.contains(&b.id))
        .collect()
}

/// Union of the liked books' topics, lower-cased.
pub fn liked_topics(liked: &[Book]) -> TopicSet {
    topic_set(liked.iter().flat_map(|b| b.topics.iter()))
}

/// Picks up to `limit` books for the user.
///
/// With liked books, eligible books are ranked by topic affinity; otherwise by
/// average rating. Both sorts are stable, so ties keep retrieval order.
pub fn select_recommendations(
    candidates: &[Book],
    ratings: &HashMap<String, i64>,
    dismissed: &HashSet<String>,
    limit: usize,
) -> Selection {
    let liked = liked_books(candidates, ratings);
    let strategy = if liked.is_empty() {
        RecommendationSource::Popularity
    } else {
        RecommendationSource::Topics
    };

    let eligible = eligible_books(candidates, ratings, dismissed);
    if eligible.is_empty() {
        return Selection {
            recommendations: Vec::new(),
            liked,
            strategy,
        };
    }

    let recommendations = if liked.is_empty() {
        rank_by_rating(eligible, limit)
    } else {
        rank_by_topics(eligible, &liked_topics(&liked), limit)
    };

    Selection {
        recommendations,
        liked,
        strategy,
    }
}

pub fn rank_by_rating(mut eligible: Vec<&Book>, limit: usize) -> Vec<Book> {
    eligible.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    eligible.into_iter().take(limit).cloned().collect()
}

pub fn rank_by_topics(eligible: Vec<&Book>, liked_topics: &TopicSet, limit: usize) -> Vec<Book> {
    let mut scored: Vec<(f64, &Book)> = eligible
        .into_iter()
        .map(|b| (score(&topic_set(&b.topics), liked_topics, b.average_rating), b))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, b)| b.clone())
        .collect()
}
