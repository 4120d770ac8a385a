use super::model::{Article, StoredArticle};
use crate::utils::{serde_utils, time_utils};

// Every article link is this prefix + the store identifier.
pub const PERMALINK_PREFIX: &'static str = "/blog/";

pub fn permalink_for(id: &str) -> String {
  format!("{}{}", PERMALINK_PREFIX, id)
}

/// Turns a stored record into the canonical `Article`.
///
/// Never fails: missing fields get their defaults. The effective date is
/// the explicit date, else the calendar date of the creation timestamp,
/// else an empty string. Records with no `published` field are published.
pub fn normalize(stored: StoredArticle) -> Article {
  let created_at = stored.created_at.and_then(|ts| ts.to_datetime());
  let effective_date = serde_utils::empty_string_to_none(stored.date)
    .or_else(|| created_at.as_ref().map(time_utils::iso_calendar_date))
    .unwrap_or_default();
  Article {
    permalink: permalink_for(&stored.id),
    id: stored.id,
    title: stored.title,
    content: stored.content,
    effective_date,
    created_at_iso: created_at.as_ref().map(time_utils::iso_string),
    published: stored.published.unwrap_or(true)
  }
}

pub fn normalize_all(stored: Vec<StoredArticle>) -> Vec<Article> {
  stored.into_iter().map(normalize).collect()
}
