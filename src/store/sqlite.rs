use async_trait::async_trait;
use tokio::task;
use crate::auth::RoleLookup;
use crate::blog::model::{ArticlePatch, NewDocument, ProviderTimestamp, StoredArticle};
use crate::db::{self, Pool};
use super::{generate_document_id, DocumentStore, Order, StoreError};

// rusqlite is blocking, so every query goes to tokio's blocking
// thread pool and the request threads never wait on the disk.
pub struct SqliteStore {
  pool: Pool
}

impl SqliteStore {
  pub fn new(pool: Pool) -> Self {
    Self { pool }
  }

  #[cfg(test)]
  fn pool(&self) -> &Pool {
    &self.pool
  }

  async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
      T: Send + 'static,
      F: FnOnce(&Pool) -> Result<T, StoreError> + Send + 'static,
  {
    // Cloning the pool is just reference counting.
    let pool = self.pool.clone();
    task::spawn_blocking(move || f(&pool))
      .await
      .map_err(|e| StoreError::Connection(format!("Blocking task failed - {}", e)))?
  }
}

#[async_trait]
impl DocumentStore for SqliteStore {
  async fn fetch_all(&self, order: Option<Order>) -> Result<Vec<StoredArticle>, StoreError> {
    self.run(move |pool| db::all_blogs(pool, order)).await
  }

  async fn fetch_by_id(&self, id: &str) -> Result<Option<StoredArticle>, StoreError> {
    let id = id.to_string();
    self.run(move |pool| db::blog_by_id(pool, &id)).await
  }

  async fn insert(&self, document: NewDocument) -> Result<String, StoreError> {
    let stored = StoredArticle {
      id: generate_document_id(),
      title: document.title,
      content: document.content,
      date: document.date,
      created_at: Some(ProviderTimestamp::now()),
      published: Some(document.published),
      author_id: Some(document.author_id)
    };
    self.run(move |pool| {
      db::insert_blog(pool, &stored)?;
      Ok(stored.id)
    }).await
  }

  async fn update_fields(&self, id: &str, patch: &ArticlePatch) -> Result<bool, StoreError> {
    let id = id.to_string();
    let patch = patch.clone();
    self.run(move |pool| db::update_blog(pool, &id, &patch)).await
  }

  async fn delete(&self, id: &str) -> Result<bool, StoreError> {
    let id = id.to_string();
    self.run(move |pool| db::delete_blog(pool, &id)).await
  }
}

#[async_trait]
impl RoleLookup for SqliteStore {
  async fn role_of(&self, uid: &str) -> Result<Option<String>, StoreError> {
    let uid = uid.to_string();
    self.run(move |pool| db::user_role(pool, &uid)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> SqliteStore {
    SqliteStore::new(db::open_memory_pool().unwrap())
  }

  #[tokio::test]
  async fn insert_assigns_id_timestamp_and_author() {
    let sut = store();
    let id = sut.insert(NewDocument {
      title: "Hello".to_string(),
      content: "# Hello".to_string(),
      date: Some("2025-11-05".to_string()),
      published: true,
      author_id: "admin-uid".to_string()
    }).await.unwrap();
    let doc = sut.fetch_by_id(&id).await.unwrap().unwrap();
    assert_eq!(id, doc.id);
    assert!(doc.created_at.is_some());
    assert_eq!(Some(true), doc.published);
    assert_eq!(Some("admin-uid".to_string()), doc.author_id);
  }

  #[tokio::test]
  async fn missing_documents() {
    let sut = store();
    assert_eq!(None, sut.fetch_by_id("nope").await.unwrap());
    assert!(!sut.delete("nope").await.unwrap());
    assert!(sut.fetch_all(Some(Order::Desc)).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn role_lookup_reads_users_table() {
    let sut = store();
    db::set_user_role(sut.pool(), "boss", Some("admin")).unwrap();
    assert_eq!(Some("admin".to_string()), sut.role_of("boss").await.unwrap());
    assert_eq!(None, sut.role_of("nobody").await.unwrap());
  }
}
