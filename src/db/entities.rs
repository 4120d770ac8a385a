use serde::{Deserialize, Serialize};

// The blog documents themselves map straight into
// blog::model::StoredArticle (see mappers), the only
// table that needs its own entity is the users one.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
  pub uid: String,
  pub role: Option<String>
}
