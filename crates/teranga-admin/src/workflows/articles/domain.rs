use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::catalog::{CatalogEntry, Collection};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub String);

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ArticleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    PendingReview,
    Published,
    Archived,
}

impl ArticleStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Published,
            Self::PendingReview,
            Self::Draft,
            Self::Archived,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Estimated reading time, e.g. "5 min".
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub featured: bool,
    /// Queue the article for editorial review instead of leaving a draft.
    #[serde(default)]
    pub submit_for_review: bool,
}

impl ArticleDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.author.trim().is_empty() {
            return Err("author must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub author: String,
    pub category: String,
    pub excerpt: String,
    pub body: String,
    pub tags: Vec<String>,
    pub read_time: Option<String>,
    pub featured: bool,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn from_draft(id: ArticleId, draft: ArticleDraft, now: DateTime<Utc>) -> Self {
        let status = if draft.submit_for_review {
            ArticleStatus::PendingReview
        } else {
            ArticleStatus::Draft
        };
        Self {
            id,
            title: draft.title,
            author: draft.author,
            category: draft.category,
            excerpt: draft.excerpt,
            body: draft.body,
            tags: draft.tags,
            read_time: draft.read_time,
            featured: draft.featured,
            status,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Editing never changes the editorial status.
    pub fn apply_draft(&mut self, draft: ArticleDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.author = draft.author;
        self.category = draft.category;
        self.excerpt = draft.excerpt;
        self.body = draft.body;
        self.tags = draft.tags;
        self.read_time = draft.read_time;
        self.featured = draft.featured;
        self.updated_at = now;
    }
}

impl CatalogEntry for Article {
    type Id = ArticleId;

    const COLLECTION: Collection = Collection::Articles;

    fn id(&self) -> &ArticleId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}
