use serde::{Deserialize, Serialize};
use derive_more::Display;
use crate::blog::{Article, ArticleDraft, ArticlePatch, StoredArticle};
use crate::blog::hooks::{DetailState, ListingState, LoadStatus};
use crate::blog::render::render_markdown;
use crate::utils::{serde_utils, text_utils};

// Excerpt sizes the frontend cards use.
pub const HOME_EXCERPT_LENGTH: usize = 100;
pub const LIST_EXCERPT_LENGTH: usize = 150;

// Everything going out to the frontend is camelCase.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
  pub id: String,
  pub title: String,
  pub content: String,
  // Sanitized HTML of the markdown content.
  pub content_html: String,
  pub date: String,
  pub created_at: Option<String>,
  pub permalink: String,
  pub published: bool
}

impl From<Article> for ArticleDto {
  fn from(article: Article) -> Self {
    Self {
      content_html: render_markdown(&article.content),
      id: article.id,
      title: article.title,
      content: article.content,
      date: article.effective_date,
      created_at: article.created_at_iso,
      permalink: article.permalink,
      published: article.published
    }
  }
}

// Card version of an article, content replaced by an excerpt.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummaryDto {
  pub id: String,
  pub title: String,
  pub excerpt: String,
  pub date: String,
  pub permalink: String,
  pub published: bool
}

impl ArticleSummaryDto {
  pub fn new(article: Article, excerpt_length: usize, with_ellipsis: bool) -> Self {
    Self {
      excerpt: text_utils::excerpt(&article.content, excerpt_length, with_ellipsis),
      id: article.id,
      title: article.title,
      date: article.effective_date,
      permalink: article.permalink,
      published: article.published
    }
  }

  pub fn for_homepage(article: Article) -> Self {
    Self::new(article, HOME_EXCERPT_LENGTH, false)
  }

  pub fn for_list(article: Article) -> Self {
    Self::new(article, LIST_EXCERPT_LENGTH, true)
  }
}

// Sidebar entries only need a title and somewhere to go.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleLinkDto {
  pub id: String,
  pub title: String,
  pub date: String,
  pub permalink: String
}

impl From<Article> for ArticleLinkDto {
  fn from(article: Article) -> Self {
    Self {
      id: article.id,
      title: article.title,
      date: article.effective_date,
      permalink: article.permalink
    }
  }
}

// Listing state the way the hooks hold it. Failures are not HTTP
// errors here, the error slot is filled and the status says so.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto<T: Serialize> {
  pub status: LoadStatus,
  pub loading: bool,
  pub error: Option<String>,
  pub articles: Vec<T>
}

impl<T: Serialize> ListingDto<T> {
  pub fn from_state<F>(state: ListingState, convert: F) -> Self
    where F: Fn(Article) -> T
  {
    Self {
      loading: state.is_loading(),
      status: state.status,
      error: state.error,
      articles: state.articles.into_iter().map(convert).collect()
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageDto {
  pub status: LoadStatus,
  pub loading: bool,
  pub error: Option<String>,
  pub latest: Vec<ArticleSummaryDto>,
  pub sidebar: Vec<ArticleLinkDto>
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetailDto {
  pub status: LoadStatus,
  pub error: Option<String>,
  pub article: Option<ArticleDto>
}

impl From<DetailState> for ArticleDetailDto {
  fn from(state: DetailState) -> Self {
    Self {
      status: state.status,
      error: state.error(),
      article: state.article.map(ArticleDto::from)
    }
  }
}

// Raw record for the admin edit form, nothing normalized. The
// timestamp is the provider's seconds / nanoseconds pair.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredArticleDto {
  pub id: String,
  pub title: String,
  pub content: String,
  pub date: Option<String>,
  pub created_at: Option<TimestampDto>,
  pub published: Option<bool>,
  pub author_id: Option<String>
}

#[derive(Debug, Serialize)]
pub struct TimestampDto {
  pub seconds: i64,
  pub nanoseconds: u32
}

impl From<StoredArticle> for StoredArticleDto {
  fn from(stored: StoredArticle) -> Self {
    Self {
      id: stored.id,
      title: stored.title,
      content: stored.content,
      date: stored.date,
      created_at: stored.created_at.map(|t| TimestampDto {
        seconds: t.seconds,
        nanoseconds: t.nanoseconds
      }),
      published: stored.published,
      author_id: stored.author_id
    }
  }
}

// Admin create form. Title and content are required, an empty
// date string means "no date".
#[derive(Debug, Deserialize)]
pub struct ArticleDraftDto {
  pub title: Option<String>,
  pub content: Option<String>,
  pub date: Option<String>,
  pub published: Option<bool>
}

impl ArticleDraftDto {
  // Returns the name of the first missing field when invalid.
  pub fn into_draft(self) -> Result<ArticleDraft, &'static str> {
    let title = serde_utils::empty_string_to_none(self.title).ok_or("title")?;
    let content = serde_utils::empty_string_to_none(self.content).ok_or("content")?;
    Ok(ArticleDraft {
      title,
      content,
      date: serde_utils::empty_string_to_none(self.date),
      published: self.published
    })
  }
}

#[derive(Debug, Deserialize, Default)]
pub struct ArticlePatchDto {
  pub title: Option<String>,
  pub content: Option<String>,
  pub date: Option<String>,
  pub published: Option<bool>
}

// Title and content may be set to anything, including empty.
// The date can't be removed once set, an empty string leaves it alone.
impl From<ArticlePatchDto> for ArticlePatch {
  fn from(dto: ArticlePatchDto) -> Self {
    Self {
      title: dto.title,
      content: dto.content,
      date: serde_utils::empty_string_to_none(dto.date),
      published: dto.published
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDto {
  pub uid: String,
  pub is_admin: bool
}

// Files dropped in the import directory. Deleting is "action": 1
// along with an id.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ImportedArticleDto {
  pub id: Option<String>,
  pub title: Option<String>,
  pub content: Option<String>,
  pub date: Option<String>,
  pub published: Option<bool>,
  pub action: Option<u32>
}

impl From<ImportedArticleDto> for ArticlePatch {
  fn from(dto: ImportedArticleDto) -> Self {
    ArticlePatchDto {
      title: dto.title,
      content: dto.content,
      date: dto.date,
      published: dto.published
    }.into()
  }
}

impl From<ImportedArticleDto> for ArticleDraftDto {
  fn from(dto: ImportedArticleDto) -> Self {
    Self {
      title: dto.title,
      content: dto.content,
      date: dto.date,
      published: dto.published
    }
  }
}

// Admin editor preview, markdown in and sanitized HTML out.
#[derive(Debug, Deserialize)]
pub struct PreviewRequestDto {
  pub content: String
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewDto {
  pub html: String
}

#[derive(Debug, Deserialize, Serialize)]
pub struct JsonStatus {
  pub status: String,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<String>
}

#[derive(Debug, Display)]
pub enum JsonStatusType {
  #[display(fmt = "success")]
  Success,
  #[display(fmt = "error")]
  Error
}

impl JsonStatus {
  pub fn new(status: JsonStatusType, message: &str) -> Self {
    Self {
      status: status.to_string(),
      message: String::from(message),
      id: None
    }
  }

  pub fn new_with_id(
    status: JsonStatusType,
    message: &str,
    id: &str
  ) -> Self {
    Self {
      status: status.to_string(),
      message: String::from(message),
      id: Some(id.to_string())
    }
  }

  pub fn is_success(&self) -> bool {
    self.status == JsonStatusType::Success.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn article(content: &str) -> Article {
    Article {
      id: "abc".to_string(),
      title: "Title".to_string(),
      content: content.to_string(),
      effective_date: "2025-11-08".to_string(),
      created_at_iso: Some("2025-11-08T10:00:00.000Z".to_string()),
      permalink: "/blog/abc".to_string(),
      published: true
    }
  }

  #[test]
  fn article_dto_json_is_camel_case() {
    let dto = ArticleDto::from(article("Body"));
    let json = serde_json::to_value(&dto).unwrap();
    assert_eq!("2025-11-08", json["date"]);
    assert_eq!("2025-11-08T10:00:00.000Z", json["createdAt"]);
    assert_eq!("/blog/abc", json["permalink"]);
    assert_eq!("<p>Body</p>\n", json["contentHtml"]);
  }

  #[test]
  fn summary_excerpts() {
    let long = "x".repeat(200);
    let home = ArticleSummaryDto::for_homepage(article(&long));
    assert_eq!(HOME_EXCERPT_LENGTH, home.excerpt.chars().count());
    let list = ArticleSummaryDto::for_list(article(&long));
    assert_eq!(LIST_EXCERPT_LENGTH + 3, list.excerpt.chars().count());
    assert!(list.excerpt.ends_with("..."));
    let empty = ArticleSummaryDto::for_list(article(""));
    assert_eq!(text_utils::EMPTY_EXCERPT_PLACEHOLDER, empty.excerpt);
  }

  #[test]
  fn draft_requires_title_and_content() {
    let dto = ArticleDraftDto {
      title: Some("  ".to_string()),
      content: Some("Body".to_string()),
      date: None,
      published: None
    };
    assert_eq!(Err("title"), dto.into_draft().map(|_| ()));
    let dto = ArticleDraftDto {
      title: Some("Title".to_string()),
      content: None,
      date: None,
      published: None
    };
    assert_eq!(Err("content"), dto.into_draft().map(|_| ()));
  }

  #[test]
  fn draft_empty_date_is_none() {
    let draft = ArticleDraftDto {
      title: Some("Title".to_string()),
      content: Some("Body".to_string()),
      date: Some("".to_string()),
      published: Some(false)
    }.into_draft().unwrap();
    assert_eq!(None, draft.date);
    assert_eq!(Some(false), draft.published);
  }

  #[test]
  fn import_dto_to_patch() {
    let dto: ImportedArticleDto = serde_json::from_str(
      r#"{"id": "abc", "title": "New title", "date": ""}"#
    ).unwrap();
    let patch: ArticlePatch = dto.into();
    assert_eq!(Some("New title".to_string()), patch.title);
    assert_eq!(None, patch.date);
    assert_eq!(None, patch.content);
  }

  #[test]
  fn json_status_id_only_when_set() {
    let json = serde_json::to_value(
      JsonStatus::new(JsonStatusType::Error, "Nope")
    ).unwrap();
    assert!(json.get("id").is_none());
    let status = JsonStatus::new_with_id(JsonStatusType::Success, "Blog deleted", "abc");
    assert!(status.is_success());
    assert_eq!(Some("abc".to_string()), status.id);
  }
}
