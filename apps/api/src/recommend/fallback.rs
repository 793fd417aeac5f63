use rand::seq::IndexedRandom;

use crate::recommend::oracle::RecommendationCandidate;

struct PoolBook {
    title: &'static str,
    author: &'static str,
    explanation: &'static str,
    technical_level: &'static str,
    topics: &'static [&'static str],
}

/// Well-known technical books served when no model answer is available.
const FALLBACK_POOL: &[PoolBook] = &[
    PoolBook {
        title: "Clean Code: A Handbook of Agile Software Craftsmanship",
        author: "Robert C. Martin",
        explanation: "A widely read guide to writing readable, maintainable code.",
        technical_level: "Intermediate",
        topics: &["Programming", "Software Engineering", "Best Practices"],
    },
    PoolBook {
        title: "The Pragmatic Programmer",
        author: "David Thomas, Andrew Hunt",
        explanation: "Practical habits and techniques for working programmers.",
        technical_level: "Intermediate",
        topics: &["Programming", "Software Engineering", "Career"],
    },
    PoolBook {
        title: "Designing Data-Intensive Applications",
        author: "Martin Kleppmann",
        explanation: "The reference on storage, replication and distributed data systems.",
        technical_level: "Advanced",
        topics: &["Databases", "Distributed Systems", "System Design"],
    },
    PoolBook {
        title: "Structure and Interpretation of Computer Programs",
        author: "Harold Abelson, Gerald Jay Sussman",
        explanation: "Foundational ideas of abstraction and computation.",
        technical_level: "Advanced",
        topics: &["Programming", "Computer Science", "Functional Programming"],
    },
    PoolBook {
        title: "Refactoring: Improving the Design of Existing Code",
        author: "Martin Fowler",
        explanation: "A catalog of safe, incremental code improvements.",
        technical_level: "Intermediate",
        topics: &["Programming", "Software Engineering", "Refactoring"],
    },
    PoolBook {
        title: "Design Patterns: Elements of Reusable Object-Oriented Software",
        author: "Erich Gamma, Richard Helm, Ralph Johnson, John Vlissides",
        explanation: "The original catalog of object-oriented design patterns.",
        technical_level: "Intermediate",
        topics: &["Software Design", "Object-Oriented Programming"],
    },
    PoolBook {
        title: "Introduction to Algorithms",
        author: "Thomas H. Cormen, Charles E. Leiserson, Ronald L. Rivest, Clifford Stein",
        explanation: "Comprehensive coverage of algorithms and their analysis.",
        technical_level: "Advanced",
        topics: &["Algorithms", "Data Structures", "Computer Science"],
    },
    PoolBook {
        title: "Code Complete",
        author: "Steve McConnell",
        explanation: "Construction practices for building high-quality software.",
        technical_level: "Intermediate",
        topics: &["Programming", "Software Engineering"],
    },
    PoolBook {
        title: "The Mythical Man-Month",
        author: "Frederick P. Brooks Jr.",
        explanation: "Classic essays on managing software projects.",
        technical_level: "Beginner",
        topics: &["Project Management", "Software Engineering"],
    },
    PoolBook {
        title: "Effective Java",
        author: "Joshua Bloch",
        explanation: "Idiomatic guidance for writing robust Java.",
        technical_level: "Intermediate",
        topics: &["Java", "Programming", "Best Practices"],
    },
];

#[cfg(test)]
pub fn pool_size() -> usize {
    FALLBACK_POOL.len()
}

/// Random sample of `min(n, pool size)` distinct books from the fallback pool.
pub fn fallback_candidates(n: usize) -> Vec<RecommendationCandidate> {
    let mut rng = rand::rng();
    FALLBACK_POOL
        .choose_multiple(&mut rng, n.min(FALLBACK_POOL.len()))
        .map(|b| {
            RecommendationCandidate::new(
                b.title,
                b.author,
                b.explanation,
                Some(b.technical_level.to_string()),
                b.topics.iter().map(|t| t.to_string()).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::models::derive_book_id;

    #[test]
    fn test_sample_size_is_capped_by_pool() {
        assert_eq!(fallback_candidates(5).len(), 5);
        assert_eq!(fallback_candidates(0).len(), 0);
        assert_eq!(fallback_candidates(100).len(), pool_size());
    }

    #[test]
    fn test_sample_has_no_duplicates() {
        let ids: HashSet<String> = fallback_candidates(pool_size())
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids.len(), pool_size());
    }

    #[test]
    fn test_candidate_ids_are_derived_from_title_and_author() {
        for c in fallback_candidates(3) {
            assert_eq!(c.id, derive_book_id(&c.title, &c.author));
            assert!(!c.topics.is_empty());
        }
    }
}
