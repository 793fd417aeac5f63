use crate::errors::AppError;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Ratings live on a closed 1–5 scale; anything else is rejected before it reaches the database.
pub fn validate_rating(rating: i64) -> Result<(), AppError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )))
    }
}

/// Returns the trimmed value, or a validation error naming the field.
pub fn require_non_blank(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trims topic labels, drops blanks and removes case-insensitive duplicates.
/// The first spelling of a topic wins.
pub fn normalize_topics(topics: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    topics
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds_are_inclusive() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
    }

    #[test]
    fn test_rating_out_of_range_is_validation_error() {
        for bad in [0, 6, -1, 100] {
            match validate_rating(bad) {
                Err(AppError::Validation(msg)) => assert!(msg.contains(&bad.to_string())),
                other => panic!("expected validation error for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_require_non_blank_trims() {
        assert_eq!(require_non_blank("title", "  SICP ").unwrap(), "SICP");
        assert!(matches!(
            require_non_blank("author", "   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_topics_dedupes_case_insensitively() {
        let topics = normalize_topics(vec![
            "Python".to_string(),
            " python ".to_string(),
            "".to_string(),
            "Machine Learning".to_string(),
        ]);
        assert_eq!(topics, vec!["Python", "Machine Learning"]);
    }
}
