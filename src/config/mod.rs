// Adding the context method to errors:
use eyre::WrapErr;
use color_eyre::Result;
use serde::Deserialize;
use crate::contact::EMAILJS_DEFAULT_ENDPOINT;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  Sqlite,
  Memory
}

#[derive(Debug, Deserialize)]
pub struct Config {
  pub db_path: String,
  pub store_backend: StoreBackend,
  pub bind_address: String,
  // Frontend origin allowed by CORS, empty string disables
  // cross-origin requests entirely.
  pub allowed_origin: String,
  // "token:uid,token:uid"
  pub api_tokens: String,
  pub import_path: String,
  // How many blogs the homepage shows:
  pub home_latest_count: usize,
  pub sidebar_latest_count: usize,
  // Contact form relay:
  pub emailjs_endpoint: String,
  pub emailjs_service_id: String,
  pub emailjs_template_id: String,
  pub emailjs_public_key: String,
  // Rate limiter settings for the contact form:
  pub rl_max_requests: u32,
  pub rl_max_requests_time: u32,
  pub rl_block_duration: u32
}

// Listing settings the handlers need. Kept apart from Config
// because the config holds tokens and keys that have no business
// being passed around the app state.
#[derive(Debug, Clone)]
pub struct ListingSettings {
  pub home_latest_count: usize,
  pub sidebar_latest_count: usize
}

impl From<&Config> for ListingSettings {
  fn from(config: &Config) -> Self {
    Self {
      home_latest_count: config.home_latest_count,
      sidebar_latest_count: config.sidebar_latest_count
    }
  }
}

impl Config {

  pub fn from_env() -> Result<Config> {
    // RUST_LOG is already set in main.rs if it was absent.
    // Environment keys are matched in lowercase against
    // what's in the .env file.
    // The leading :: is because this module is also called
    // "config".
    let c = ::config::Config::builder()
      .set_default("db_path", "./blog.db")?
      .set_default("store_backend", "sqlite")?
      .set_default("bind_address", "127.0.0.1:8080")?
      .set_default("allowed_origin", "")?
      .set_default("api_tokens", "")?
      .set_default("import_path", "./import/")?
      .set_default("home_latest_count", 3)?
      .set_default("sidebar_latest_count", 5)?
      .set_default("emailjs_endpoint", EMAILJS_DEFAULT_ENDPOINT)?
      .set_default("emailjs_service_id", "")?
      .set_default("emailjs_template_id", "")?
      .set_default("emailjs_public_key", "")?
      .set_default("rl_max_requests", 10)?
      .set_default("rl_max_requests_time", 60)?
      .set_default("rl_block_duration", 60)?
      .add_source(::config::Environment::default())
      .build()
      .context("Building configuration")?;
    // The error has to be given a context for
    // color_eyre to work here:
    c.try_deserialize()
      .context("Loading configuration from env")
  }

  // The relay settings are all empty by default, in which case the
  // contact form can't work. Not fatal, the blog still works.
  pub fn contact_relay_configured(&self) -> bool {
    !self.emailjs_service_id.is_empty()
      && !self.emailjs_template_id.is_empty()
      && !self.emailjs_public_key.is_empty()
  }

}
