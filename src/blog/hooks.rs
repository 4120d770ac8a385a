/*
 * Stateful loaders sitting on top of the repository. Each one
 * owns its own status / data / error slots, nothing is shared
 * between instances.
 *
 * There is no cancellation and no de-duplication: two refreshes
 * running at the same time both write their result, and the last
 * one to resolve is what stays in the state.
 */

use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use derive_more::Display;
use log::{debug, error};
use serde::Serialize;
use crate::utils::serde_utils;
use super::error::BlogError;
use super::model::Article;
use super::repository::ContentRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
  Idle,
  Loading,
  Ready,
  Failed
}

// Who the data is for. Public only ever sees published blogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
  Public,
  Admin
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingState {
  pub status: LoadStatus,
  pub articles: Vec<Article>,
  pub error: Option<String>
}

impl ListingState {
  fn new(status: LoadStatus) -> Self {
    Self {
      status,
      articles: Vec::new(),
      error: None
    }
  }

  pub fn is_loading(&self) -> bool {
    self.status == LoadStatus::Loading
  }
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum LookupFailure {
  #[display(fmt = "No blog id was given")]
  MissingId,
  #[display(fmt = "Blog not found")]
  NotFound,
  #[display(fmt = "This blog is not published")]
  NotPublished,
  #[display(fmt = "Failed to load blog: {}", _0)]
  Load(String)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
  pub status: LoadStatus,
  pub article: Option<Article>,
  pub failure: Option<LookupFailure>
}

impl DetailState {
  pub fn is_loading(&self) -> bool {
    self.status == LoadStatus::Loading
  }

  pub fn error(&self) -> Option<String> {
    self.failure.as_ref().map(|f| f.to_string())
  }
}

// Wrapper around the state lock. If the lock got poisoned we keep
// going with whatever is in there, a hook is not worth a panic.
struct HookCell<T: Clone> {
  state: RwLock<T>
}

impl<T: Clone> HookCell<T> {
  fn new(initial: T) -> Self {
    Self { state: RwLock::new(initial) }
  }

  fn snapshot(&self) -> T {
    match self.state.read() {
      Ok(state) => state.clone(),
      Err(e) => e.into_inner().clone()
    }
  }

  fn update<F: FnOnce(&mut T)>(&self, f: F) {
    match self.state.write() {
      Ok(mut state) => f(&mut state),
      Err(e) => {
        error!("Hook state lock was poisoned, recovering");
        f(&mut e.into_inner())
      }
    }
  }
}

fn load_error_message(error: &BlogError) -> String {
  format!("Failed to load blogs: {}", error)
}

async fn fetch_for(
  repository: &ContentRepository,
  audience: Audience
) -> Result<Vec<Article>, BlogError> {
  match audience {
    Audience::Public => repository.published_articles().await,
    Audience::Admin => repository.all_articles().await
  }
}

fn settle(cell: &HookCell<ListingState>, result: Result<Vec<Article>, BlogError>) {
  cell.update(|state| match result {
    Ok(articles) => {
      state.status = LoadStatus::Ready;
      state.articles = articles;
      state.error = None;
    },
    Err(e) => {
      // Whatever was loaded before stays visible.
      state.status = LoadStatus::Failed;
      state.error = Some(load_error_message(&e));
    }
  });
}

/// Loads once when activated, like a page that fetches on mount.
/// Starts out `Loading` and never retries.
pub struct AutoLoadListing {
  repository: Arc<ContentRepository>,
  audience: Audience,
  cell: HookCell<ListingState>,
  activated: AtomicBool
}

impl AutoLoadListing {
  pub fn new(repository: Arc<ContentRepository>, audience: Audience) -> Self {
    Self {
      repository,
      audience,
      cell: HookCell::new(ListingState::new(LoadStatus::Loading)),
      activated: AtomicBool::new(false)
    }
  }

  // Only the first call does anything.
  pub async fn activate(&self) -> ListingState {
    if !self.activated.swap(true, Ordering::SeqCst) {
      let result = fetch_for(&self.repository, self.audience).await;
      settle(&self.cell, result);
    }
    self.snapshot()
  }

  pub fn snapshot(&self) -> ListingState {
    self.cell.snapshot()
  }
}

/// Loads when told to. Used for the admin list, which has to be
/// reloaded after every create, update or delete.
pub struct ManualListing {
  repository: Arc<ContentRepository>,
  audience: Audience,
  cell: HookCell<ListingState>
}

impl ManualListing {
  pub fn new(repository: Arc<ContentRepository>, audience: Audience) -> Self {
    Self {
      repository,
      audience,
      cell: HookCell::new(ListingState::new(LoadStatus::Idle))
    }
  }

  pub async fn refresh(&self) -> ListingState {
    self.cell.update(|state| {
      state.status = LoadStatus::Loading;
      state.error = None;
    });
    debug!("Refreshing {:?} listing", self.audience);
    let result = fetch_for(&self.repository, self.audience).await;
    settle(&self.cell, result);
    self.snapshot()
  }

  pub fn snapshot(&self) -> ListingState {
    self.cell.snapshot()
  }
}

/// Single blog, loaded once on activation. For the public audience
/// an unpublished blog is reported the same way a missing one is,
/// just with its own message.
pub struct ArticleLookup {
  repository: Arc<ContentRepository>,
  audience: Audience,
  id: Option<String>,
  cell: HookCell<DetailState>,
  activated: AtomicBool
}

impl ArticleLookup {
  pub fn new(
    repository: Arc<ContentRepository>,
    audience: Audience,
    id: Option<String>
  ) -> Self {
    Self {
      repository,
      audience,
      id,
      cell: HookCell::new(DetailState {
        status: LoadStatus::Loading,
        article: None,
        failure: None
      }),
      activated: AtomicBool::new(false)
    }
  }

  pub async fn activate(&self) -> DetailState {
    if !self.activated.swap(true, Ordering::SeqCst) {
      let outcome = self.lookup().await;
      self.cell.update(|state| match outcome {
        Ok(article) => {
          state.status = LoadStatus::Ready;
          state.article = Some(article);
          state.failure = None;
        },
        Err(failure) => {
          state.status = LoadStatus::Failed;
          state.failure = Some(failure);
        }
      });
    }
    self.snapshot()
  }

  async fn lookup(&self) -> Result<Article, LookupFailure> {
    let id = serde_utils::empty_string_to_none(self.id.clone())
      .ok_or(LookupFailure::MissingId)?;
    match self.repository.article_by_id(&id).await {
      Ok(Some(article)) => {
        if self.audience == Audience::Public && !article.published {
          Err(LookupFailure::NotPublished)
        } else {
          Ok(article)
        }
      },
      Ok(None) => Err(LookupFailure::NotFound),
      Err(e) => Err(LookupFailure::Load(e.to_string()))
    }
  }

  pub fn snapshot(&self) -> DetailState {
    self.cell.snapshot()
  }
}
