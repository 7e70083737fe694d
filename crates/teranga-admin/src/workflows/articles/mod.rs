//! Editorial content: cultural and travel articles.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Article, ArticleDraft, ArticleId, ArticleStatus};
pub use router::article_router;
pub use service::{ArticleQuery, ArticleService, ArticleStats};
