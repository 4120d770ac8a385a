use std::sync::Arc;
use log::{debug, error, info};
use crate::auth::Actor;
use crate::store::{DocumentStore, Order};
use super::error::BlogError;
use super::model::{Article, ArticleDraft, ArticlePatch, NewDocument, StoredArticle};
use super::normalizer::{normalize, normalize_all};

/// CRUD over the blog collection. Never retries, every store
/// failure goes straight back to the caller (after being logged).
pub struct ContentRepository {
  store: Arc<dyn DocumentStore>
}

// Logging here so the handlers and hooks don't all have to.
fn log_failure(operation: &str, error: BlogError) -> BlogError {
  error!("Error {} - {}", operation, error);
  error
}

impl ContentRepository {

  pub fn new(store: Arc<dyn DocumentStore>) -> Self {
    Self { store }
  }

  // Every record, newest first. That's asked from the store, a
  // store that can't order gives them back in whatever order.
  pub async fn list_all(&self) -> Result<Vec<StoredArticle>, BlogError> {
    self.store.fetch_all(Some(Order::Desc))
      .await
      .map_err(|e| log_failure("fetching blogs", e.into()))
  }

  // Filtering happens after the fetch on purpose: legacy records
  // don't have the field at all and a store-side predicate would
  // drop them. Only an explicit false hides a record.
  pub async fn list_published(&self) -> Result<Vec<StoredArticle>, BlogError> {
    let all = self.store.fetch_all(Some(Order::Desc))
      .await
      .map_err(|e| log_failure("fetching published blogs", e.into()))?;
    Ok(all.into_iter().filter(|b| b.published != Some(false)).collect())
  }

  pub async fn get_by_id(&self, id: &str) -> Result<Option<StoredArticle>, BlogError> {
    self.store.fetch_by_id(id)
      .await
      .map_err(|e| log_failure("fetching blog", e.into()))
  }

  pub async fn create(
    &self,
    actor: Option<&Actor>,
    draft: ArticleDraft
  ) -> Result<String, BlogError> {
    let actor = actor.ok_or_else(|| log_failure("creating blog", BlogError::AuthRequired))?;
    let document = NewDocument {
      title: draft.title,
      content: draft.content,
      date: draft.date,
      published: draft.published.unwrap_or(true),
      author_id: actor.uid.clone()
    };
    let id = self.store.insert(document)
      .await
      .map_err(|e| log_failure("creating blog", e.into()))?;
    info!("Blog {} created by {}", id, actor.uid);
    Ok(id)
  }

  // Missing ids are a NotFound error, for update and delete alike.
  pub async fn update(&self, id: &str, patch: ArticlePatch) -> Result<(), BlogError> {
    let found = self.store.update_fields(id, &patch)
      .await
      .map_err(|e| log_failure("updating blog", e.into()))?;
    if !found {
      return Err(log_failure("updating blog", BlogError::NotFound(id.to_string())));
    }
    debug!("Blog {} updated", id);
    Ok(())
  }

  pub async fn delete_by_id(&self, id: &str) -> Result<(), BlogError> {
    let found = self.store.delete(id)
      .await
      .map_err(|e| log_failure("deleting blog", e.into()))?;
    if !found {
      return Err(log_failure("deleting blog", BlogError::NotFound(id.to_string())));
    }
    info!("Blog {} deleted", id);
    Ok(())
  }

  pub async fn published_articles(&self) -> Result<Vec<Article>, BlogError> {
    self.list_published().await.map(normalize_all)
  }

  pub async fn all_articles(&self) -> Result<Vec<Article>, BlogError> {
    self.list_all().await.map(normalize_all)
  }

  pub async fn article_by_id(&self, id: &str) -> Result<Option<Article>, BlogError> {
    Ok(self.get_by_id(id).await?.map(normalize))
  }

}
