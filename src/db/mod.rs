use rusqlite::{params, OptionalExtension, Row, ToSql, ErrorCode};
pub mod entities;
mod mappers;
mod helpers;
use r2d2_sqlite::SqliteConnectionManager;
use log::{debug, info};
use entities::*;
use mappers::{map_stored_article, map_user_role};
use helpers::generate_set_placeholders;
use crate::blog::model::{ArticlePatch, StoredArticle};
use crate::store::{Order, StoreError};
use crate::utils::option_bool_to_i32;

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<SqliteConnectionManager>;

/**
 * All the DB stuff is plain blocking rusqlite. The async
 * wrapping happens in store::sqlite.
 */

const BLOG_FIELDS: &'static str = "id, title, content, date, \
  created_at_seconds, created_at_nanos, published, author_id";

// No migrations, just create what's missing.
const SCHEMA: &'static str = "
  CREATE TABLE IF NOT EXISTS blogs (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT,
    content TEXT,
    date TEXT,
    created_at_seconds INTEGER,
    created_at_nanos INTEGER,
    published INTEGER,
    author_id TEXT
  );
  CREATE TABLE IF NOT EXISTS users (
    uid TEXT PRIMARY KEY NOT NULL,
    role TEXT
  );";

impl From<rusqlite::Error> for StoreError {
  fn from(error: rusqlite::Error) -> Self {
    match &error {
      rusqlite::Error::SqliteFailure(e, _) if matches!(
        e.code,
        ErrorCode::ReadOnly | ErrorCode::PermissionDenied |
          ErrorCode::AuthorizationForStatementDenied
      ) => StoreError::PermissionDenied(error.to_string()),
      rusqlite::Error::SqliteFailure(e, _) if matches!(
        e.code,
        ErrorCode::CannotOpen | ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
      ) => StoreError::Connection(error.to_string()),
      _ => StoreError::Query(error.to_string())
    }
  }
}

impl From<r2d2::Error> for StoreError {
  fn from(error: r2d2::Error) -> Self {
    StoreError::Connection(error.to_string())
  }
}

pub fn open_pool(db_path: &str) -> Result<Pool, StoreError> {
  let manager = SqliteConnectionManager::file(db_path);
  let pool = Pool::new(manager)?;
  init_schema(&pool)?;
  info!("Opened blog database at {}", db_path);
  Ok(pool)
}

// Every connection of an in-memory manager is its own database,
// so the pool has to stick to a single connection.
pub fn open_memory_pool() -> Result<Pool, StoreError> {
  let pool = Pool::builder()
    .max_size(1)
    .build(SqliteConnectionManager::memory())?;
  init_schema(&pool)?;
  Ok(pool)
}

pub fn init_schema(pool: &Pool) -> Result<(), StoreError> {
  let conn = pool.get()?;
  conn.execute_batch(SCHEMA)?;
  Ok(())
}

fn select_many<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Vec<T>, StoreError>
  where
    P: rusqlite::Params,
    F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let conn = pool.get()?;
  let mut stmt = conn.prepare(query)?;
  let rows = stmt.query_map(params, mapper)?
    .collect::<Result<Vec<T>, rusqlite::Error>>()?;
  Ok(rows)
}

pub fn all_blogs(
  pool: &Pool,
  order: Option<Order>
) -> Result<Vec<StoredArticle>, StoreError> {
  // NULL timestamps sort as the smallest value in SQLite,
  // which puts them last in DESC order.
  let order_clause = match order {
    Some(Order::Desc) => " ORDER BY created_at_seconds DESC, created_at_nanos DESC",
    Some(Order::Asc) => " ORDER BY created_at_seconds ASC, created_at_nanos ASC",
    None => ""
  };
  select_many(
    pool,
    &format!("SELECT {} FROM blogs{}", BLOG_FIELDS, order_clause),
    [],
    map_stored_article
  )
}

pub fn blog_by_id(
  pool: &Pool,
  id: &str
) -> Result<Option<StoredArticle>, StoreError> {
  let conn = pool.get()?;
  let mut stmt = conn.prepare(
    &format!("SELECT {} FROM blogs WHERE id = ?", BLOG_FIELDS)
  )?;
  let blog = stmt.query_row(params![id], map_stored_article)
    .optional()?;
  Ok(blog)
}

pub fn insert_blog(
  pool: &Pool,
  blog: &StoredArticle
) -> Result<(), StoreError> {
  let conn = pool.get()?;
  conn.execute(
    &format!(
      "INSERT INTO blogs ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
      BLOG_FIELDS
    ),
    params![
      blog.id,
      blog.title,
      blog.content,
      blog.date,
      blog.created_at.map(|ts| ts.seconds),
      blog.created_at.map(|ts| ts.nanoseconds),
      option_bool_to_i32(blog.published),
      blog.author_id
    ]
  )?;
  debug!("Inserted blog {}", blog.id);
  Ok(())
}

// Returns false if the blog doesn't exist.
pub fn update_blog(
  pool: &Pool,
  id: &str,
  patch: &ArticlePatch
) -> Result<bool, StoreError> {
  let mut names: Vec<&str> = Vec::new();
  let mut values: Vec<Box<dyn ToSql>> = Vec::new();
  if let Some(title) = &patch.title {
    names.push("title");
    values.push(Box::new(title.clone()));
  }
  if let Some(content) = &patch.content {
    names.push("content");
    values.push(Box::new(content.clone()));
  }
  if let Some(date) = &patch.date {
    names.push("date");
    values.push(Box::new(date.clone()));
  }
  if let Some(published) = option_bool_to_i32(patch.published) {
    names.push("published");
    values.push(Box::new(published));
  }
  // Nothing to update, but we still have to tell if the
  // blog is there.
  if names.is_empty() {
    return blog_exists(pool, id);
  }
  values.push(Box::new(id.to_string()));
  let conn = pool.get()?;
  let changed = conn.execute(
    &format!(
      "UPDATE blogs SET {} WHERE id = ?",
      generate_set_placeholders(&names)
    ),
    rusqlite::params_from_iter(values.iter())
  )?;
  Ok(changed > 0)
}

// Returns false if the blog doesn't exist.
pub fn delete_blog(
  pool: &Pool,
  id: &str
) -> Result<bool, StoreError> {
  let conn = pool.get()?;
  let changed = conn.execute("DELETE FROM blogs WHERE id = ?", params![id])?;
  Ok(changed > 0)
}

pub fn blog_exists(
  pool: &Pool,
  id: &str
) -> Result<bool, StoreError> {
  let conn = pool.get()?;
  let count: i64 = conn.query_row(
    "SELECT count(*) FROM blogs WHERE id = ?",
    params![id],
    |row| row.get(0)
  )?;
  Ok(count > 0)
}

pub fn user_role(
  pool: &Pool,
  uid: &str
) -> Result<Option<String>, StoreError> {
  let conn = pool.get()?;
  let role: Option<Option<String>> = conn.query_row(
    "SELECT role FROM users WHERE uid = ?",
    params![uid],
    |row| row.get(0)
  ).optional()?;
  // A user row with a NULL role is the same as no row.
  Ok(role.flatten())
}

pub fn set_user_role(
  pool: &Pool,
  uid: &str,
  role: Option<&str>
) -> Result<(), StoreError> {
  let conn = pool.get()?;
  match role {
    Some(role) => conn.execute(
      "INSERT INTO users (uid, role) VALUES (?, ?) \
        ON CONFLICT(uid) DO UPDATE SET role = excluded.role",
      params![uid, role]
    )?,
    None => conn.execute("DELETE FROM users WHERE uid = ?", params![uid])?
  };
  Ok(())
}

pub fn all_user_roles(
  pool: &Pool
) -> Result<Vec<UserRole>, StoreError> {
  select_many(
    pool,
    "SELECT uid, role FROM users ORDER BY uid ASC",
    [],
    map_user_role
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blog::model::ProviderTimestamp;

  fn blog(id: &str, seconds: Option<i64>) -> StoredArticle {
    StoredArticle {
      id: id.to_string(),
      title: format!("Title {}", id),
      content: "Body".to_string(),
      date: None,
      created_at: seconds.map(|s| ProviderTimestamp { seconds: s, nanoseconds: 7 }),
      published: None,
      author_id: Some("uid".to_string())
    }
  }

  #[test]
  fn insert_then_fetch_keeps_optional_fields() {
    let pool = open_memory_pool().unwrap();
    let mut sut = blog("a", Some(1762596000));
    sut.published = Some(false);
    sut.date = Some("2025-11-05".to_string());
    insert_blog(&pool, &sut).unwrap();
    let fetched = blog_by_id(&pool, "a").unwrap().unwrap();
    assert_eq!(sut, fetched);

    let legacy = blog("b", None);
    insert_blog(&pool, &legacy).unwrap();
    let fetched = blog_by_id(&pool, "b").unwrap().unwrap();
    assert_eq!(None, fetched.published);
    assert_eq!(None, fetched.created_at);
  }

  #[test]
  fn null_title_and_content_become_empty() {
    let pool = open_memory_pool().unwrap();
    pool.get().unwrap()
      .execute("INSERT INTO blogs (id) VALUES ('bare')", [])
      .unwrap();
    let fetched = blog_by_id(&pool, "bare").unwrap().unwrap();
    assert_eq!("", fetched.title);
    assert_eq!("", fetched.content);
  }

  #[test]
  fn all_blogs_newest_first() {
    let pool = open_memory_pool().unwrap();
    insert_blog(&pool, &blog("old", Some(100))).unwrap();
    insert_blog(&pool, &blog("none", None)).unwrap();
    insert_blog(&pool, &blog("new", Some(300))).unwrap();
    let ids: Vec<String> = all_blogs(&pool, Some(Order::Desc)).unwrap()
      .into_iter().map(|b| b.id).collect();
    assert_eq!(vec!["new", "old", "none"], ids);
    let ids: Vec<String> = all_blogs(&pool, Some(Order::Asc)).unwrap()
      .into_iter().map(|b| b.id).collect();
    assert_eq!(vec!["none", "old", "new"], ids);
  }

  #[test]
  fn partial_update_leaves_other_columns() {
    let pool = open_memory_pool().unwrap();
    insert_blog(&pool, &blog("a", Some(100))).unwrap();
    let patch = ArticlePatch {
      content: Some("New body".to_string()),
      published: Some(true),
      ..Default::default()
    };
    assert!(update_blog(&pool, "a", &patch).unwrap());
    let fetched = blog_by_id(&pool, "a").unwrap().unwrap();
    assert_eq!("Title a", fetched.title);
    assert_eq!("New body", fetched.content);
    assert_eq!(Some(true), fetched.published);
    assert_eq!(Some("uid".to_string()), fetched.author_id);
  }

  #[test]
  fn missing_ids_are_reported() {
    let pool = open_memory_pool().unwrap();
    insert_blog(&pool, &blog("a", Some(100))).unwrap();
    assert!(update_blog(&pool, "a", &ArticlePatch::default()).unwrap());
    assert!(!update_blog(&pool, "zz", &ArticlePatch::default()).unwrap());
    let patch = ArticlePatch { title: Some("x".to_string()), ..Default::default() };
    assert!(!update_blog(&pool, "zz", &patch).unwrap());
    assert!(delete_blog(&pool, "a").unwrap());
    assert!(!delete_blog(&pool, "a").unwrap());
    assert_eq!(None, blog_by_id(&pool, "a").unwrap());
  }

  #[test]
  fn duplicate_id_is_a_query_error() {
    let pool = open_memory_pool().unwrap();
    insert_blog(&pool, &blog("a", Some(100))).unwrap();
    match insert_blog(&pool, &blog("a", Some(100))) {
      Err(StoreError::Query(_)) => {},
      other => panic!("Expected a query error, got {:?}", other)
    }
  }

  #[test]
  fn user_roles_upsert_and_revoke() {
    let pool = open_memory_pool().unwrap();
    assert_eq!(None, user_role(&pool, "boss").unwrap());
    set_user_role(&pool, "boss", Some("editor")).unwrap();
    set_user_role(&pool, "boss", Some("admin")).unwrap();
    assert_eq!(Some("admin".to_string()), user_role(&pool, "boss").unwrap());
    assert_eq!(1, all_user_roles(&pool).unwrap().len());
    set_user_role(&pool, "boss", None).unwrap();
    assert_eq!(None, user_role(&pool, "boss").unwrap());
  }
}
