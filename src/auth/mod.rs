/*
 * Authentication boundary. Figuring out who is calling (the
 * "actor") and whether they hold the administrator role.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use log::{error, warn};
use serde::Serialize;
use crate::store::StoreError;

pub const ADMIN_ROLE: &'static str = "admin";

// The currently authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
  pub uid: String
}

#[async_trait]
pub trait RoleLookup: Send + Sync {
  async fn role_of(&self, uid: &str) -> Result<Option<String>, StoreError>;
}

// Failing to read the role is logged and counts as "not an
// admin", the admin panel just stays closed in that case.
pub async fn is_admin(roles: &dyn RoleLookup, actor: &Actor) -> bool {
  match roles.role_of(&actor.uid).await {
    Ok(Some(role)) => role == ADMIN_ROLE,
    Ok(None) => {
      warn!("No role found for user {}", actor.uid);
      false
    },
    Err(e) => {
      error!("Role lookup failed for user {} - {}", actor.uid, e);
      false
    }
  }
}

// Sessions are bearer tokens, each one mapped to a user id in the
// config (api_tokens = "token1:uid1,token2:uid2").
pub struct TokenAuthenticator {
  tokens: HashMap<String, String>
}

impl TokenAuthenticator {
  pub fn new(tokens: HashMap<String, String>) -> Self {
    Self { tokens }
  }

  // Malformed entries are skipped with a warning instead of
  // refusing to start.
  pub fn from_config_value(value: &str) -> Self {
    let mut tokens = HashMap::new();
    for entry in value.split(',').map(|e| e.trim()).filter(|e| !e.is_empty()) {
      match entry.split_once(':') {
        Some((token, uid)) if !token.trim().is_empty() && !uid.trim().is_empty() => {
          tokens.insert(token.trim().to_string(), uid.trim().to_string());
        },
        _ => warn!("Ignoring malformed api_tokens entry")
      }
    }
    Self { tokens }
  }

  pub fn actor_for_token(&self, token: &str) -> Option<Actor> {
    self.tokens.get(token).map(|uid| Actor { uid: uid.clone() })
  }

  pub fn len(&self) -> usize {
    self.tokens.len()
  }
}
