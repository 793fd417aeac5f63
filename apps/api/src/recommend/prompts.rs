// Prompt text for model-backed recommendations.
// Reuses the JSON-only system fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::recommend::oracle::LikedBook;

pub const RECOMMENDATION_SYSTEM: &str = JSON_ONLY_SYSTEM;

/// Recommendation prompt template. Replace `{num_recommendations}`, `{liked_books}`
/// and `{recently_viewed}` before sending.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"Based on the user's book ratings and preferences below, recommend {num_recommendations} technical books.
Focus on books that match their interests and technical level.
Do NOT recommend any book listed below.

For each recommendation, provide:
1. Title
2. Author
3. Brief explanation of why it matches their interests
4. Technical level (Beginner/Intermediate/Advanced)
5. Main topics covered

Books rated by the user:

{liked_books}
{recently_viewed}
Return a JSON array with this EXACT schema:
[
  {
    "title": "Book Title",
    "author": "Author Name",
    "explanation": "Why this book matches their interests",
    "technical_level": "Beginner/Intermediate/Advanced",
    "topics": ["Topic1", "Topic2"]
  }
]"#;

/// One block per liked book: title, author, rating and topics.
pub fn format_liked_books(liked: &[LikedBook]) -> String {
    liked
        .iter()
        .map(|b| {
            format!(
                "Title: {}\nAuthor: {}\nRating: {}/5\nTopics: {}\n",
                b.title,
                b.author,
                b.rating,
                b.topics.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_recently_viewed(titles: &[String]) -> String {
    if titles.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = titles.iter().map(|t| format!("- {t}")).collect();
    format!("\nRecently viewed:\n{}\n", lines.join("\n"))
}

pub fn build_recommendation_prompt(liked: &[LikedBook], recently_viewed: &[String], n: usize) -> String {
    RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{num_recommendations}", &n.to_string())
        .replace("{liked_books}", &format_liked_books(liked))
        .replace("{recently_viewed}", &format_recently_viewed(recently_viewed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn liked() -> Vec<LikedBook> {
        vec![LikedBook {
            title: "Fluent Python".to_string(),
            author: "Luciano Ramalho".to_string(),
            rating: 5,
            topics: vec!["Python".to_string(), "Programming".to_string()],
        }]
    }

    #[test]
    fn test_prompt_embeds_liked_book_details() {
        let prompt = build_recommendation_prompt(&liked(), &[], 3);
        assert!(prompt.contains("recommend 3 technical books"));
        assert!(prompt.contains("Title: Fluent Python"));
        assert!(prompt.contains("Author: Luciano Ramalho"));
        assert!(prompt.contains("Rating: 5/5"));
        assert!(prompt.contains("Topics: Python, Programming"));
        assert!(!prompt.contains("Recently viewed"));
    }

    #[test]
    fn test_prompt_lists_recently_viewed_titles() {
        let prompt = build_recommendation_prompt(&liked(), &["SICP".to_string()], 5);
        assert!(prompt.contains("Recently viewed:\n- SICP"));
    }

    #[test]
    fn test_no_placeholders_survive() {
        let prompt = build_recommendation_prompt(&liked(), &["SICP".to_string()], 5);
        for placeholder in ["{num_recommendations}", "{liked_books}", "{recently_viewed}"] {
            assert!(!prompt.contains(placeholder), "{placeholder} left in prompt");
        }
    }
}
