use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use log::debug;
use crate::auth::RoleLookup;
use crate::blog::model::{ArticlePatch, NewDocument, ProviderTimestamp, StoredArticle};
use super::{generate_document_id, DocumentStore, Order, StoreError};

// In-memory document store. Used by the tests and for running the
// server without a database file (store_backend = "memory").
pub struct MemoryStore {
  documents: RwLock<Vec<StoredArticle>>,
  roles: RwLock<HashMap<String, String>>
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::with_documents(Vec::new())
  }

  pub fn with_documents(documents: Vec<StoredArticle>) -> Self {
    Self {
      documents: RwLock::new(documents),
      roles: RwLock::new(HashMap::new())
    }
  }

  pub fn set_role(&self, uid: &str, role: &str) {
    if let Ok(mut roles) = self.roles.write() {
      roles.insert(uid.to_string(), role.to_string());
    }
  }

  pub fn len(&self) -> usize {
    self.documents.read().map(|d| d.len()).unwrap_or(0)
  }
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

// A poisoned lock means some other request panicked while writing,
// which I report as a store failure rather than crash again.
fn poisoned<T>(_: T) -> StoreError {
  StoreError::Connection("Memory store lock is poisoned".to_string())
}

#[async_trait]
impl DocumentStore for MemoryStore {
  async fn fetch_all(&self, order: Option<Order>) -> Result<Vec<StoredArticle>, StoreError> {
    let mut documents = self.documents.read().map_err(poisoned)?.clone();
    if let Some(order) = order {
      // Documents without a timestamp compare as the smallest,
      // same as NULL in SQLite. Equal timestamps keep their order
      // in both directions.
      let key = |d: &StoredArticle| d.created_at.map(|ts| (ts.seconds, ts.nanoseconds));
      match order {
        Order::Asc => documents.sort_by(|a, b| key(a).cmp(&key(b))),
        Order::Desc => documents.sort_by(|a, b| key(b).cmp(&key(a)))
      }
    }
    Ok(documents)
  }

  async fn fetch_by_id(&self, id: &str) -> Result<Option<StoredArticle>, StoreError> {
    let documents = self.documents.read().map_err(poisoned)?;
    Ok(documents.iter().find(|d| d.id == id).cloned())
  }

  async fn insert(&self, document: NewDocument) -> Result<String, StoreError> {
    let id = generate_document_id();
    let stored = StoredArticle {
      id: id.clone(),
      title: document.title,
      content: document.content,
      date: document.date,
      created_at: Some(ProviderTimestamp::now()),
      published: Some(document.published),
      author_id: Some(document.author_id)
    };
    debug!("Memory store inserting document {}", id);
    self.documents.write().map_err(poisoned)?.push(stored);
    Ok(id)
  }

  async fn update_fields(&self, id: &str, patch: &ArticlePatch) -> Result<bool, StoreError> {
    let mut documents = self.documents.write().map_err(poisoned)?;
    match documents.iter_mut().find(|d| d.id == id) {
      Some(document) => {
        patch.apply_to(document);
        Ok(true)
      },
      None => Ok(false)
    }
  }

  async fn delete(&self, id: &str) -> Result<bool, StoreError> {
    let mut documents = self.documents.write().map_err(poisoned)?;
    let before = documents.len();
    documents.retain(|d| d.id != id);
    Ok(documents.len() != before)
  }
}

#[async_trait]
impl RoleLookup for MemoryStore {
  async fn role_of(&self, uid: &str) -> Result<Option<String>, StoreError> {
    let roles = self.roles.read().map_err(poisoned)?;
    Ok(roles.get(uid).cloned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stored(id: &str, seconds: Option<i64>) -> StoredArticle {
    StoredArticle {
      id: id.to_string(),
      title: id.to_uppercase(),
      content: String::new(),
      date: None,
      created_at: seconds.map(|s| ProviderTimestamp { seconds: s, nanoseconds: 0 }),
      published: None,
      author_id: None
    }
  }

  #[tokio::test]
  async fn fetch_all_orders_by_creation_desc() {
    let store = MemoryStore::with_documents(vec![
      stored("old", Some(100)),
      stored("none", None),
      stored("new", Some(300)),
      stored("mid", Some(200))
    ]);
    let ids: Vec<String> = store.fetch_all(Some(Order::Desc)).await.unwrap()
      .into_iter().map(|d| d.id).collect();
    assert_eq!(vec!["new", "mid", "old", "none"], ids);
  }

  #[tokio::test]
  async fn equal_timestamps_keep_insertion_order() {
    let store = MemoryStore::with_documents(vec![
      stored("first", Some(100)),
      stored("second", Some(100)),
      stored("newer", Some(200)),
      stored("third", Some(100))
    ]);
    let ids: Vec<String> = store.fetch_all(Some(Order::Desc)).await.unwrap()
      .into_iter().map(|d| d.id).collect();
    assert_eq!(vec!["newer", "first", "second", "third"], ids);
    let ids: Vec<String> = store.fetch_all(Some(Order::Asc)).await.unwrap()
      .into_iter().map(|d| d.id).collect();
    assert_eq!(vec!["first", "second", "third", "newer"], ids);
  }

  #[tokio::test]
  async fn insert_assigns_id_and_timestamp() {
    let store = MemoryStore::new();
    let id = store.insert(NewDocument {
      title: "T".to_string(),
      content: "C".to_string(),
      date: None,
      published: true,
      author_id: "uid".to_string()
    }).await.unwrap();
    assert!(!id.is_empty());
    let doc = store.fetch_by_id(&id).await.unwrap().unwrap();
    assert!(doc.created_at.is_some());
    assert_eq!(Some("uid".to_string()), doc.author_id);
  }

  #[tokio::test]
  async fn update_and_delete_report_missing_ids() {
    let store = MemoryStore::with_documents(vec![stored("a", Some(1))]);
    let patch = ArticlePatch { title: Some("x".to_string()), ..Default::default() };
    assert!(store.update_fields("a", &patch).await.unwrap());
    assert!(!store.update_fields("nope", &patch).await.unwrap());
    assert!(store.delete("a").await.unwrap());
    assert!(!store.delete("a").await.unwrap());
    assert_eq!(0, store.len());
  }

  #[tokio::test]
  async fn roles_are_looked_up_by_uid() {
    let store = MemoryStore::new();
    store.set_role("boss", "admin");
    assert_eq!(Some("admin".to_string()), store.role_of("boss").await.unwrap());
    assert_eq!(None, store.role_of("someone").await.unwrap());
  }
}
