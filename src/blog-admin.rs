use std::env;
use std::sync::Arc;
use color_eyre::Result;
use eyre::{eyre, WrapErr};
use dotenv::dotenv;
use log::info;
use getopts::Options;
use portfolio_blog_backend::app::article_import::ImportService;
use portfolio_blog_backend::auth::{Actor, ADMIN_ROLE};
use portfolio_blog_backend::blog::ContentRepository;
use portfolio_blog_backend::blog::normalizer::normalize;
use portfolio_blog_backend::config::{Config, StoreBackend};
use portfolio_blog_backend::db::{self, Pool};
use portfolio_blog_backend::store::{Order, SqliteStore};

// Copy pasted this from getopts doc.
fn print_usage(program: &str, opts: Options) {
  let brief = format!("Usage: {} [options]", program);
  print!("{}", opts.usage(&brief));
}

fn list_blogs(pool: &Pool, order: Order) -> Result<()> {
  let blogs = db::all_blogs(pool, Some(order))?;
  for blog in blogs.into_iter().map(normalize) {
    let date = if blog.effective_date.is_empty()
      { "----------" } else { blog.effective_date.as_str() };
    let flag = if blog.published { " " } else { "*" };
    println!("{} {} {} - {}", flag, date, blog.id, blog.title);
  }
  Ok(())
}

fn list_roles(pool: &Pool) -> Result<()> {
  for user in db::all_user_roles(pool)? {
    println!("{} - {}", user.uid, user.role.unwrap_or_default());
  }
  Ok(())
}

async fn run_import(config: &Config, pool: Pool, uid: &str) -> Result<()> {
  let import_service = ImportService::open(&config.import_path)
    .context("Import directory is not writable")?;
  let repository = ContentRepository::new(Arc::new(SqliteStore::new(pool)));
  let actor = Actor { uid: uid.to_string() };
  let statuses = import_service.import_articles(&repository, &actor)
    .await
    .map_err(|status| eyre!("Import failed: {}", status.message))?;
  for status in statuses {
    println!(
      "{} - {} {}",
      status.status,
      status.message,
      status.id.unwrap_or_default()
    );
  }
  Ok(())
}

/**
 * Maintenance binary for the things that have no endpoint:
 * handing out the admin role and looking at what's in the
 * database. Also runs imports without going through HTTP.
 */
#[tokio::main]
async fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let args: Vec<String> = env::args().collect();
  let program = args[0].clone();
  let mut opts = Options::new();
  opts.optopt("g", "grant", "Give the admin role to a user", "UID");
  opts.optopt("r", "revoke", "Remove the role of a user", "UID");
  opts.optflag("l", "list", "List all stored blogs, unpublished ones marked with *");
  opts.optflag("o", "oldest-first", "List blogs by creation time ascending (with -l)");
  opts.optflag("u", "users", "List the users that have a role");
  opts.optopt("i", "import", "Run the import directory as the given user", "UID");
  opts.optflag("h", "help", "Program usage");
  let opt_matches = opts.parse(&args[1..])?;
  if opt_matches.opt_present("h") {
    print_usage(&program, opts);
    return Ok(());
  }

  let config = Config::from_env()?;
  if config.store_backend != StoreBackend::Sqlite {
    return Err(eyre!("blog-admin only works with the sqlite store backend"));
  }
  let pool = db::open_pool(&config.db_path)
    .context("Opening the blog database")?;

  if let Some(uid) = opt_matches.opt_str("g") {
    db::set_user_role(&pool, &uid, Some(ADMIN_ROLE))?;
    info!("Granted the admin role to {}", uid);
    return Ok(());
  }
  if let Some(uid) = opt_matches.opt_str("r") {
    db::set_user_role(&pool, &uid, None)?;
    info!("Revoked the role of {}", uid);
    return Ok(());
  }
  if opt_matches.opt_present("l") {
    let order = if opt_matches.opt_present("o") { Order::Asc } else { Order::Desc };
    return list_blogs(&pool, order);
  }
  if opt_matches.opt_present("u") {
    return list_roles(&pool);
  }
  if let Some(uid) = opt_matches.opt_str("i") {
    return run_import(&config, pool, &uid).await;
  }

  print_usage(&program, opts);
  Ok(())
}
