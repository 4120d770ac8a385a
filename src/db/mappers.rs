use super::entities::*;
use crate::blog::model::{ProviderTimestamp, StoredArticle};
use crate::utils::option_i32_to_bool;
use rusqlite::{Row, Error};

// Column order has to match BLOG_FIELDS in the db module.
// Old rows can have NULL title or content, these become
// empty strings. Everything else stays optional for the
// normalizer to deal with.
pub fn map_stored_article(row: &Row) -> Result<StoredArticle, Error> {
  let seconds: Option<i64> = row.get(4)?;
  let nanoseconds: Option<u32> = row.get(5)?;
  Ok(StoredArticle {
    id: row.get(0)?,
    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
    content: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    date: row.get(3)?,
    created_at: seconds.map(|seconds| ProviderTimestamp {
      seconds,
      nanoseconds: nanoseconds.unwrap_or(0)
    }),
    published: option_i32_to_bool(row.get(6)?),
    author_id: row.get(7)?
  })
}

pub fn map_user_role(row: &Row) -> Result<UserRole, Error> {
  Ok(UserRole {
    uid: row.get(0)?,
    role: row.get(1)?
  })
}
