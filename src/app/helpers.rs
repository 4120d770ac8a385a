use actix_web::HttpRequest;
use regex::Regex;
use lazy_static::lazy_static;
use crate::auth::{self, Actor};
use super::AppState;
use super::error::Error;

// Extracting Actix header values is kinda convoluted, they can
// fail to convert to str because of invalid characters.
pub fn header_value(req: &HttpRequest, name: &str) -> String {
  req.headers().get(name)
    .map(|h| String::from(h.to_str().unwrap_or("")))
    .unwrap_or(String::new())
}

// "Authorization: Bearer <token>", scheme is case insensitive.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
  lazy_static! {
    static ref BEARER_REGEX: Regex = Regex::new(
      r"^(?i:bearer)\s+(\S+)\s*$"
    ).unwrap();
  }
  let value = header_value(req, "authorization");
  BEARER_REGEX.captures(&value)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().to_string())
}

// Who's calling, if anyone. Unknown tokens are the same as no
// token at all.
pub fn current_actor(req: &HttpRequest, app_state: &AppState) -> Option<Actor> {
  bearer_token(req)
    .and_then(|token| app_state.authenticator.actor_for_token(&token))
}

// Admin endpoints: 401 without an actor, 403 when the actor
// doesn't have the admin role.
pub async fn require_admin(
  req: &HttpRequest,
  app_state: &AppState
) -> Result<Actor, Error> {
  let actor = current_actor(req, app_state)
    .ok_or_else(|| Error::Unauthorized("Authentication is required".to_string()))?;
  if auth::is_admin(app_state.roles.as_ref(), &actor).await {
    Ok(actor)
  } else {
    Err(Error::Forbidden("Admin role is required".to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[test]
  fn bearer_token_extraction() {
    let req = TestRequest::default()
      .insert_header(("Authorization", "Bearer abc123"))
      .to_http_request();
    assert_eq!(Some("abc123".to_string()), bearer_token(&req));

    let req = TestRequest::default()
      .insert_header(("Authorization", "bearer   xyz"))
      .to_http_request();
    assert_eq!(Some("xyz".to_string()), bearer_token(&req));
  }

  #[test]
  fn no_or_wrong_scheme_is_no_token() {
    let req = TestRequest::default().to_http_request();
    assert_eq!(None, bearer_token(&req));
    let req = TestRequest::default()
      .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
      .to_http_request();
    assert_eq!(None, bearer_token(&req));
    let req = TestRequest::default()
      .insert_header(("Authorization", "Bearer"))
      .to_http_request();
    assert_eq!(None, bearer_token(&req));
  }
}
