/*
 * The blog content pipeline: stored records come out of the
 * repository, get normalized into Articles, sorted for listings
 * and held by the hooks for the handlers. Content is markdown,
 * rendered for the detail page.
 */

pub mod error;
pub mod hooks;
pub mod listing;
pub mod model;
pub mod normalizer;
pub mod render;
pub mod repository;

pub use error::BlogError;
pub use hooks::{ArticleLookup, Audience, AutoLoadListing, LoadStatus, ManualListing};
pub use model::{Article, ArticleDraft, ArticlePatch, StoredArticle};
pub use repository::ContentRepository;
