use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::utils::time_utils;

// Timestamp the way the document store hands it to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTimestamp {
  pub seconds: i64,
  pub nanoseconds: u32
}

impl ProviderTimestamp {
  pub fn now() -> Self {
    Self::from(Utc::now())
  }

  pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
    time_utils::datetime_from_parts(self.seconds, self.nanoseconds)
  }
}

impl From<DateTime<Utc>> for ProviderTimestamp {
  fn from(datetime: DateTime<Utc>) -> Self {
    Self {
      seconds: datetime.timestamp(),
      nanoseconds: datetime.timestamp_subsec_nanos()
    }
  }
}

// Raw record from the document store. Pretty much everything is
// optional in there because old records were written before some
// of the fields existed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
  pub id: String,
  pub title: String,
  pub content: String,
  pub date: Option<String>,
  pub created_at: Option<ProviderTimestamp>,
  pub published: Option<bool>,
  pub author_id: Option<String>
}

/// Canonical article shape everything past the repository works with.
/// Built by `normalizer::normalize` on every read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
  pub id: String,
  pub title: String,
  pub content: String,
  // Empty string means the date is unknown.
  pub effective_date: String,
  pub created_at_iso: Option<String>,
  pub permalink: String,
  pub published: bool
}

// Fields the admin create form sends.
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
  pub title: String,
  pub content: String,
  pub date: Option<String>,
  pub published: Option<bool>
}

// What the store needs to insert a document. The store assigns
// the id and the creation timestamp itself.
#[derive(Debug, Clone)]
pub struct NewDocument {
  pub title: String,
  pub content: String,
  pub date: Option<String>,
  pub published: bool,
  pub author_id: String
}

// Partial update, None fields are left alone. There's deliberately
// no way to touch id, created_at or author_id in here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticlePatch {
  pub title: Option<String>,
  pub content: Option<String>,
  pub date: Option<String>,
  pub published: Option<bool>
}

impl ArticlePatch {
  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.content.is_none()
      && self.date.is_none()
      && self.published.is_none()
  }

  // Merging into an in-memory record, used by the memory store.
  pub fn apply_to(&self, stored: &mut StoredArticle) {
    if let Some(title) = &self.title {
      stored.title = title.clone();
    }
    if let Some(content) = &self.content {
      stored.content = content.clone();
    }
    if let Some(date) = &self.date {
      stored.date = Some(date.clone());
    }
    if let Some(published) = self.published {
      stored.published = Some(published);
    }
  }
}

// Re-wrapping a normalized article as a stored record. Only useful
// to feed an Article back into the normalizer.
impl From<Article> for StoredArticle {
  fn from(article: Article) -> Self {
    let date = if article.effective_date.is_empty()
      { None } else { Some(article.effective_date) };
    Self {
      id: article.id,
      title: article.title,
      content: article.content,
      date,
      created_at: article.created_at_iso
        .as_deref()
        .and_then(time_utils::parse_iso_string)
        .map(ProviderTimestamp::from),
      published: Some(article.published),
      author_id: None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stored() -> StoredArticle {
    StoredArticle {
      id: "abc".to_string(),
      title: "Old title".to_string(),
      content: "Old content".to_string(),
      date: None,
      created_at: Some(ProviderTimestamp { seconds: 1762596000, nanoseconds: 0 }),
      published: None,
      author_id: Some("admin-uid".to_string())
    }
  }

  #[test]
  fn patch_only_touches_given_fields() {
    let mut sut = stored();
    let patch = ArticlePatch {
      title: Some("New title".to_string()),
      published: Some(false),
      ..Default::default()
    };
    patch.apply_to(&mut sut);
    assert_eq!("New title", sut.title);
    assert_eq!("Old content", sut.content);
    assert_eq!(Some(false), sut.published);
    assert_eq!(Some("admin-uid".to_string()), sut.author_id);
    assert_eq!("abc", sut.id);
  }

  #[test]
  fn empty_patch_is_empty() {
    assert!(ArticlePatch::default().is_empty());
    let patch = ArticlePatch { date: Some("2025-11-05".to_string()), ..Default::default() };
    assert!(!patch.is_empty());
  }

  #[test]
  fn provider_timestamp_from_datetime() {
    let d = time_utils::datetime_from_parts(1762596000, 42).unwrap();
    let ts = ProviderTimestamp::from(d);
    assert_eq!(1762596000, ts.seconds);
    assert_eq!(42, ts.nanoseconds);
    assert_eq!(Some(d), ts.to_datetime());
  }
}
