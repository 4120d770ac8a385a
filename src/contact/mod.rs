/*
 * Contact form relay. The message is not stored anywhere, it's
 * just forwarded to an email-sending API (EmailJS).
 */

use async_trait::async_trait;
use derive_more::Display;
use lazy_static::lazy_static;
use log::{error, info};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const EMAILJS_DEFAULT_ENDPOINT: &'static str =
  "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Debug, Display)]
pub enum ContactError {
  #[display(fmt = "Invalid contact form: {}", _0)]
  Invalid(String),
  #[display(fmt = "Email relay failed: {}", _0)]
  Relay(String)
}

impl std::error::Error for ContactError {}

impl From<reqwest::Error> for ContactError {
  fn from(error: reqwest::Error) -> Self {
    ContactError::Relay(error.to_string())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactForm {
  pub name: String,
  pub email: String,
  pub message: String
}

impl ContactForm {
  // All three fields are required. The email check is only a
  // sanity check, the relay is the one that actually delivers.
  pub fn validate(&self) -> Result<(), ContactError> {
    lazy_static! {
      static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[^@\s]+@[^@\s]+\.[^@\s]+$"
      ).unwrap();
    }
    if self.name.trim().is_empty() {
      return Err(ContactError::Invalid("name is required".to_string()));
    }
    if self.email.trim().is_empty() {
      return Err(ContactError::Invalid("email is required".to_string()));
    }
    if !EMAIL_REGEX.is_match(self.email.trim()) {
      return Err(ContactError::Invalid("email is not valid".to_string()));
    }
    if self.message.trim().is_empty() {
      return Err(ContactError::Invalid("message is required".to_string()));
    }
    Ok(())
  }
}

#[async_trait]
pub trait EmailRelay: Send + Sync {
  async fn send(&self, form: &ContactForm) -> Result<(), ContactError>;
}

// Body format the EmailJS REST API expects. The public key goes
// in "user_id" for historical reasons on their side.
#[derive(Serialize)]
struct EmailJsRequest<'a> {
  service_id: &'a str,
  template_id: &'a str,
  user_id: &'a str,
  template_params: &'a ContactForm
}

pub struct EmailJsRelay {
  client: Client,
  endpoint: String,
  service_id: String,
  template_id: String,
  public_key: String
}

impl EmailJsRelay {
  pub fn new(
    endpoint: &str,
    service_id: &str,
    template_id: &str,
    public_key: &str
  ) -> Self {
    Self {
      client: Client::new(),
      endpoint: endpoint.to_string(),
      service_id: service_id.to_string(),
      template_id: template_id.to_string(),
      public_key: public_key.to_string()
    }
  }
}

#[async_trait]
impl EmailRelay for EmailJsRelay {
  // Success or failure, there's no payload we care about.
  async fn send(&self, form: &ContactForm) -> Result<(), ContactError> {
    let body = EmailJsRequest {
      service_id: &self.service_id,
      template_id: &self.template_id,
      user_id: &self.public_key,
      template_params: form
    };
    let response = self.client
      .post(&self.endpoint)
      .json(&body)
      .send()
      .await?;
    let status = response.status();
    if status.is_success() {
      info!("Contact message from {} relayed", form.email);
      Ok(())
    } else {
      let text = response.text().await.unwrap_or_default();
      error!("Email relay answered {} - {}", status, text);
      Err(ContactError::Relay(format!("relay answered {}", status)))
    }
  }
}
