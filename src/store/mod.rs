/*
 * The store module is the boundary with whatever holds the
 * blog documents. The repository only ever talks to the
 * DocumentStore trait.
 */

use async_trait::async_trait;
use derive_more::Display;
use crate::blog::model::{ArticlePatch, NewDocument, StoredArticle};
pub mod memory;
pub mod sqlite;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
  Asc,
  Desc
}

// Transport or permission failure from the store. I keep the
// provider error as a message because the different backends
// don't share an error type.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum StoreError {
  #[display(fmt = "Store connection failed: {}", _0)]
  Connection(String),
  #[display(fmt = "Store query failed: {}", _0)]
  Query(String),
  #[display(fmt = "Store denied access: {}", _0)]
  PermissionDenied(String)
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Fetches the whole collection. `order` asks for creation time
  /// ordering, None means whatever order the store likes.
  async fn fetch_all(&self, order: Option<Order>) -> Result<Vec<StoredArticle>, StoreError>;

  async fn fetch_by_id(&self, id: &str) -> Result<Option<StoredArticle>, StoreError>;

  /// Inserts a new document, the store assigns the identifier and
  /// the creation timestamp. Returns the new identifier.
  async fn insert(&self, document: NewDocument) -> Result<String, StoreError>;

  /// Returns false when no document has that id.
  async fn update_fields(&self, id: &str, patch: &ArticlePatch) -> Result<bool, StoreError>;

  /// Returns false when no document has that id.
  async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

// Store-assigned identifiers. Hosted stores use random
// alphanumerics, a simple UUID does the same job.
pub fn generate_document_id() -> String {
  uuid::Uuid::new_v4().simple().to_string()
}
