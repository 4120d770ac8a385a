use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use color_eyre::Result;
use eyre::WrapErr;
use log::{debug, error, info, warn};
use rate_limiter::BasicRateLimiter;
use article_import::ImportService;
use std::sync::{Arc, RwLock};
// The crate prefix is needed because of the other crate
// named "config" that we use as a dependency.
use crate::auth::{RoleLookup, TokenAuthenticator};
use crate::blog::{Audience, ContentRepository, ManualListing};
use crate::config::{Config, ListingSettings, StoreBackend};
use crate::contact::{EmailJsRelay, EmailRelay};
use crate::db;
use crate::store::{DocumentStore, MemoryStore, SqliteStore};
pub mod handlers;
pub mod dtos;
pub mod error;
pub mod helpers;
pub mod rate_limiter;
pub mod article_import;

pub struct AppState {
  pub repository: Arc<ContentRepository>,
  pub roles: Arc<dyn RoleLookup>,
  pub authenticator: TokenAuthenticator,
  // The admin list lives as long as the server does, it gets
  // refreshed after every write.
  pub admin_listing: ManualListing,
  // None when the EmailJS settings are missing.
  pub relay: Option<Arc<dyn EmailRelay>>,
  pub rate_limiter: RwLock<BasicRateLimiter>,
  // None when the import directory couldn't be opened.
  pub import_service: Option<ImportService>,
  pub settings: ListingSettings
}

impl AppState {

  pub fn new(
    store: Arc<dyn DocumentStore>,
    roles: Arc<dyn RoleLookup>,
    authenticator: TokenAuthenticator,
    relay: Option<Arc<dyn EmailRelay>>,
    rate_limiter: BasicRateLimiter,
    import_service: Option<ImportService>,
    settings: ListingSettings
  ) -> Self {
    let repository = Arc::new(ContentRepository::new(store));
    Self {
      admin_listing: ManualListing::new(repository.clone(), Audience::Admin),
      repository,
      roles,
      authenticator,
      relay,
      rate_limiter: RwLock::new(rate_limiter),
      import_service,
      settings
    }
  }

  // True means the request has to be rejected.
  pub fn check_rate_limit(&self) -> bool {
    match self.rate_limiter.write() {
      Ok(mut rl) => rl.hit(),
      Err(e) => {
        // Ignoring weird lock errors, which should never happen.
        error!("Could not get a write handle on the \
          rate limiter, SHOULD NEVER HAPPEN - {}", e);
        false
      }
    }
  }

}

// Both backends hold the users / roles next to the blogs, so the
// same object ends up behind both traits.
fn open_store(
  config: &Config
) -> Result<(Arc<dyn DocumentStore>, Arc<dyn RoleLookup>)> {
  match config.store_backend {
    StoreBackend::Sqlite => {
      let pool = db::open_pool(&config.db_path)
        .context("Opening the blog database")?;
      let store = Arc::new(SqliteStore::new(pool));
      let documents: Arc<dyn DocumentStore> = store.clone();
      let roles: Arc<dyn RoleLookup> = store;
      Ok((documents, roles))
    },
    StoreBackend::Memory => {
      warn!("Using the memory store, nothing will be persisted");
      let store = Arc::new(MemoryStore::new());
      let documents: Arc<dyn DocumentStore> = store.clone();
      let roles: Arc<dyn RoleLookup> = store;
      Ok((documents, roles))
    }
  }
}

fn contact_relay(config: &Config) -> Option<Arc<dyn EmailRelay>> {
  if config.contact_relay_configured() {
    Some(Arc::new(EmailJsRelay::new(
      &config.emailjs_endpoint,
      &config.emailjs_service_id,
      &config.emailjs_template_id,
      &config.emailjs_public_key
    )))
  } else {
    warn!("EmailJS settings are missing, the contact form is disabled");
    None
  }
}

fn cors(allowed_origin: &str) -> Cors {
  // Default Cors is the restrictive one, no origin allowed.
  if allowed_origin.is_empty() {
    return Cors::default();
  }
  Cors::default()
    .allowed_origin(allowed_origin)
    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
    .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
    .max_age(3600)
}

// Function to start the server, main.rs calls it from inside
// the actix runtime.
pub async fn run() -> Result<()> {
  let config = Config::from_env()?;
  debug!("Current config: {:?}", config);

  let (store, roles) = open_store(&config)?;
  let authenticator = TokenAuthenticator::from_config_value(&config.api_tokens);
  if authenticator.len() == 0 {
    warn!("No API tokens configured, admin endpoints can't be used");
  }

  // Import is an admin extra, the blog still gets served without it.
  let import_service = match ImportService::open(&config.import_path) {
    Ok(service) => Some(service),
    Err(e) => {
      warn!("Import directory {} is not usable, import is disabled - {}",
        config.import_path, e);
      None
    }
  };

  let bind_address = config.bind_address.clone();
  let allowed_origin = config.allowed_origin.clone();

  let app_state = web::Data::new(
    AppState::new(
      store,
      roles,
      authenticator,
      contact_relay(&config),
      BasicRateLimiter::new(
        config.rl_max_requests,
        config.rl_max_requests_time,
        config.rl_block_duration
      ),
      import_service,
      ListingSettings::from(&config)
    )
  );

  info!("Starting server on {}", bind_address);
  HttpServer::new(move|| {
    App::new()
      .app_data(app_state.clone())
      .app_data(web::PathConfig::default().error_handler(|_, _| {
        actix_web::error::ErrorBadRequest("Invalid path arguments")
      }))
      .app_data(web::QueryConfig::default().error_handler(|_, _| {
        actix_web::error::ErrorBadRequest("Invalid query string arguments")
      }))
      .app_data(web::JsonConfig::default().error_handler(|e, _| {
        actix_web::error::ErrorBadRequest(format!("Invalid JSON body: {}", e))
      }))
      .wrap(cors(&allowed_origin))
      .wrap(middleware::Logger::default())
      .configure(base_endpoints_config)
      .default_service(web::route().to(handlers::not_found))
  })
  .bind(bind_address)?
  .run()
  .await
  .context("Start Actix web server")
}

// Route configuration:
pub fn base_endpoints_config(cfg: &mut web::ServiceConfig) {
  cfg.route("/", web::get().to(handlers::index))
    .route("/blogs", web::get().to(handlers::blogs))
    .route("/blog/{id}", web::get().to(handlers::blog))
    .route("/auth/me", web::get().to(handlers::auth_me))
    // Refresh has to come before the {id} routes.
    .route("/admin/blogs/refresh", web::post().to(handlers::admin_refresh))
    .route("/admin/blogs", web::get().to(handlers::admin_blogs))
    .route("/admin/blogs", web::post().to(handlers::create_blog))
    .route("/admin/blogs/{id}", web::get().to(handlers::admin_blog))
    .route("/admin/blogs/{id}", web::put().to(handlers::update_blog))
    .route("/admin/blogs/{id}", web::delete().to(handlers::delete_blog))
    .route("/admin/preview", web::post().to(handlers::admin_preview))
    .route("/admin/import", web::post().to(handlers::import_blogs))
    .route("/contact", web::post().to(handlers::contact));
}
