use color_eyre::Result;
use dotenv::dotenv;
use std::env;
use portfolio_blog_backend::app;

#[actix_web::main]
async fn main() -> Result<()> {
  // Load the .env file if there's one, values already in the
  // environment take precedence.
  dotenv().ok();
  color_eyre::install()?;
  // Default log level if not specified:
  if env::var("RUST_LOG").is_err() {
    env::set_var("RUST_LOG", "info");
  }
  env_logger::init();

  app::run().await
}
