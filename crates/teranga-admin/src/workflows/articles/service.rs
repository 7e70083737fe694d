use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Article, ArticleDraft, ArticleId, ArticleStatus};
use crate::workflows::actor::Actor;
use crate::workflows::catalog::{
    apply_update, fetch_active, insert_next, require_admin, CatalogActionError, CatalogStore,
    TrashBin,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArticleQuery {
    pub status: Option<ArticleStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ArticleQuery {
    fn matches(&self, article: &Article) -> bool {
        if self.status.is_some_and(|status| status != article.status) {
            return false;
        }
        if let Some(category) = self.category.as_deref() {
            if !article.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                article.title.to_lowercase().contains(&term)
                    || article.author.to_lowercase().contains(&term)
                    || article.excerpt.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

/// Per-status counters for the editorial dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub featured: usize,
}

pub struct ArticleService<S> {
    store: Arc<S>,
    trash: TrashBin<S, Article>,
    sequence: AtomicU64,
}

impl<S> ArticleService<S>
where
    S: CatalogStore<Article> + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        let trash = TrashBin::new(Arc::clone(&store));
        Self {
            store,
            trash,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn trash_bin(&self) -> TrashBin<S, Article> {
        self.trash.clone()
    }

    pub fn create(
        &self,
        actor: &Actor,
        draft: ArticleDraft,
        now: DateTime<Utc>,
    ) -> Result<Article, CatalogActionError> {
        require_admin(actor, "create articles")?;
        draft.validate().map_err(CatalogActionError::Validation)?;
        let stored = insert_next(self.store.as_ref(), &self.sequence, |seq| {
            Article::from_draft(ArticleId(format!("art-{seq:06}")), draft.clone(), now)
        })?;
        info!(id = %stored.id, status = %stored.status, "article created");
        Ok(stored)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: &ArticleId,
        draft: ArticleDraft,
        now: DateTime<Utc>,
    ) -> Result<Article, CatalogActionError> {
        require_admin(actor, "update articles")?;
        draft.validate().map_err(CatalogActionError::Validation)?;
        apply_update(self.store.as_ref(), id, |article: &mut Article| {
            article.apply_draft(draft, now);
            Ok(())
        })
    }

    pub fn get(&self, id: &ArticleId) -> Result<Article, CatalogActionError> {
        fetch_active(self.store.as_ref(), id)
    }

    /// Matching articles, most recently updated first.
    pub fn list(&self, query: &ArticleQuery) -> Result<Vec<Article>, CatalogActionError> {
        let mut articles: Vec<Article> = self
            .store
            .list()?
            .into_iter()
            .filter(|article| query.matches(article))
            .collect();
        articles.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(articles)
    }

    pub fn publish(
        &self,
        actor: &Actor,
        id: &ArticleId,
        now: DateTime<Utc>,
    ) -> Result<Article, CatalogActionError> {
        require_admin(actor, "publish")?;
        let article = apply_update(self.store.as_ref(), id, |article: &mut Article| {
            if article.status == ArticleStatus::Published {
                return Err(CatalogActionError::invalid(article.status, "publish"));
            }
            article.status = ArticleStatus::Published;
            article.published_at = Some(now);
            article.updated_at = now;
            Ok(())
        })?;
        info!(%id, "article published");
        Ok(article)
    }

    pub fn archive(
        &self,
        actor: &Actor,
        id: &ArticleId,
        now: DateTime<Utc>,
    ) -> Result<Article, CatalogActionError> {
        require_admin(actor, "archive")?;
        let article = apply_update(self.store.as_ref(), id, |article: &mut Article| {
            if article.status == ArticleStatus::Archived {
                return Err(CatalogActionError::invalid(article.status, "archive"));
            }
            article.status = ArticleStatus::Archived;
            article.updated_at = now;
            Ok(())
        })?;
        info!(%id, "article archived");
        Ok(article)
    }

    pub fn stats(&self) -> Result<ArticleStats, CatalogActionError> {
        let articles = self.store.list()?;
        let mut by_status: BTreeMap<String, usize> = ArticleStatus::ordered()
            .into_iter()
            .map(|status| (status.label().to_string(), 0))
            .collect();
        for article in &articles {
            *by_status.entry(article.status.label().to_string()).or_default() += 1;
        }
        Ok(ArticleStats {
            total: articles.len(),
            featured: articles.iter().filter(|article| article.featured).count(),
            by_status,
        })
    }
}
