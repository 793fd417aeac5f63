use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::BookSummary;
use crate::recommend::RecommendationSource;

#[derive(Debug, Clone)]
pub struct LoggedLikedBook {
    pub title: String,
    pub author: String,
    pub rating: i64,
}

/// Everything recorded about one recommendation call.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub ratings: HashMap<String, i64>,
    pub liked: Vec<LoggedLikedBook>,
    pub recommendations: Vec<BookSummary>,
    pub source: RecommendationSource,
}

/// Append-only text log of served recommendations. Never read back by the service.
#[derive(Debug, Clone)]
pub struct RecommendationLog {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl RecommendationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one entry. The entry is rendered before the lock is taken and
    /// written with a single `write_all`, so concurrent entries never interleave.
    pub async fn append(&self, entry: &LogEntry) -> Result<()> {
        let rendered = render_entry(entry);

        let _guard = self.lock.lock().await;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating log directory {}", dir.display()))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening {}", self.path.display()))?;
        file.write_all(rendered.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

pub fn render_entry(entry: &LogEntry) -> String {
    let mut out = String::new();
    // writeln! into a String cannot fail
    let _ = writeln!(out, "\n{}", "=".repeat(80));
    let _ = writeln!(
        out,
        "Recommendation Log - {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Source: {}", entry.source);
    let _ = writeln!(out, "{}\n", "=".repeat(50));

    let _ = writeln!(out, "User Rating Summary:");
    let _ = writeln!(out, "Total books rated: {}", entry.ratings.len());
    let mut histogram: BTreeMap<i64, usize> = BTreeMap::new();
    for rating in entry.ratings.values() {
        *histogram.entry(*rating).or_default() += 1;
    }
    for (rating, count) in &histogram {
        let _ = writeln!(out, "Rating {rating} stars: {count} books");
    }
    out.push('\n');

    if entry.liked.is_empty() {
        let _ = writeln!(out, "No highly rated books found. Using default recommendations.\n");
    } else {
        let _ = writeln!(out, "Based on these highly rated books (4+ stars):");
        for book in &entry.liked {
            let _ = writeln!(
                out,
                "- {} by {} (Rating: {})",
                book.title, book.author, book.rating
            );
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Recommended Books:");
    if entry.recommendations.is_empty() {
        let _ = writeln!(out, "(none)\n");
    }
    for (i, book) in entry.recommendations.iter().enumerate() {
        let year = book
            .publication_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let _ = writeln!(out, "{}. {} by {}", i + 1, book.title, book.author);
        let _ = writeln!(out, "   Published: {year}");
        let _ = writeln!(out, "   Average Rating: {:.1}", book.average_rating);
        let _ = writeln!(out, "   Topics: {}", book.topics.join(", "));
        let _ = writeln!(out, "   Description: {}\n", book.description);
    }

    let _ = writeln!(out, "{}\n", "-".repeat(80));
    out
}
