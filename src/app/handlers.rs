use actix_web::{
  web,
  HttpResponse,
  HttpRequest,
  Result
};
use serde::Deserialize;
use log::info;
use crate::auth;
use crate::blog::{ArticleLookup, Audience, AutoLoadListing, LoadStatus};
use crate::blog::hooks::{ListingState, LookupFailure};
use crate::blog::listing::{sort_by_effective_date_desc, take_latest};
use crate::blog::render::render_markdown;
use crate::contact::ContactForm;
use super::dtos::*;
use super::error::Error;
use super::AppState;
use super::helpers;

// Every public request is a fresh "page", so the hooks are
// created per request and activated right away.

/* --- Request query objects --- */
#[derive(Deserialize)]
pub struct BlogsQuery {
  pub max: Option<usize>
}
/* --- End request query objects --- */

// Default response when no route matched the request:
pub async fn not_found() -> Result<HttpResponse, Error> {
  Err(Error::NotFound(String::from("Endpoint doesn't exist")))
}

// Homepage: latest blogs as cards and a sidebar with links. A
// failed load is still a 200, the error slot says what happened.
pub async fn index(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let hook = AutoLoadListing::new(app_state.repository.clone(), Audience::Public);
  let state = hook.activate().await;
  let sorted = sort_by_effective_date_desc(state.articles.clone());
  let latest = take_latest(sorted.clone(), app_state.settings.home_latest_count);
  let sidebar = take_latest(sorted, app_state.settings.sidebar_latest_count);
  Ok(HttpResponse::Ok().json(HomepageDto {
    loading: state.is_loading(),
    status: state.status,
    error: state.error,
    latest: latest.into_iter().map(ArticleSummaryDto::for_homepage).collect(),
    sidebar: sidebar.into_iter().map(ArticleLinkDto::from).collect()
  }))
}

fn sorted_state(mut state: ListingState, max: Option<usize>) -> ListingState {
  state.articles = match max {
    Some(max) => take_latest(state.articles, max),
    None => sort_by_effective_date_desc(state.articles)
  };
  state
}

pub async fn blogs(
  app_state: web::Data<AppState>,
  query: web::Query<BlogsQuery>
) -> Result<HttpResponse, Error> {
  let hook = AutoLoadListing::new(app_state.repository.clone(), Audience::Public);
  let state = sorted_state(hook.activate().await, query.max);
  Ok(HttpResponse::Ok().json(ListingDto::from_state(state, ArticleSummaryDto::for_list)))
}

// Path variables have to be in a tuple.
pub async fn blog(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  let hook = ArticleLookup::new(app_state.repository.clone(), Audience::Public, Some(id));
  let state = hook.activate().await;
  if let Some(failure) = state.failure.clone() {
    return Err(match failure {
      LookupFailure::MissingId => Error::BadRequest(failure.to_string()),
      LookupFailure::Load(msg) => Error::DatabaseError(msg),
      // Unpublished blogs are a 404 to the public.
      _ => Error::NotFound(failure.to_string())
    });
  }
  Ok(HttpResponse::Ok().json(ArticleDetailDto::from(state)))
}

pub async fn auth_me(
  app_state: web::Data<AppState>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let actor = helpers::current_actor(&req, &app_state)
    .ok_or_else(|| Error::Unauthorized("Authentication is required".to_string()))?;
  let is_admin = auth::is_admin(app_state.roles.as_ref(), &actor).await;
  Ok(HttpResponse::Ok().json(ActorDto { uid: actor.uid, is_admin }))
}

// The admin list only loads when first asked for, after that it
// stays around until a write or a refresh reloads it.
pub async fn admin_blogs(
  app_state: web::Data<AppState>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::require_admin(&req, &app_state).await?;
  let mut state = app_state.admin_listing.snapshot();
  if state.status == LoadStatus::Idle {
    state = app_state.admin_listing.refresh().await;
  }
  let state = sorted_state(state, None);
  Ok(HttpResponse::Ok().json(ListingDto::from_state(state, ArticleSummaryDto::for_list)))
}

pub async fn admin_refresh(
  app_state: web::Data<AppState>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::require_admin(&req, &app_state).await?;
  let state = sorted_state(app_state.admin_listing.refresh().await, None);
  Ok(HttpResponse::Ok().json(ListingDto::from_state(state, ArticleSummaryDto::for_list)))
}

// Raw stored record, for the edit form.
pub async fn admin_blog(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::require_admin(&req, &app_state).await?;
  let id = path.into_inner().0;
  match app_state.repository.get_by_id(&id).await? {
    Some(stored) => Ok(HttpResponse::Ok().json(StoredArticleDto::from(stored))),
    None => Err(Error::NotFound("Blog does not exist".to_string()))
  }
}

// No actor at all is left for the repository to reject, it's the
// one enforcing that blogs always have an author.
pub async fn create_blog(
  app_state: web::Data<AppState>,
  body: web::Json<ArticleDraftDto>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let actor = helpers::current_actor(&req, &app_state);
  if let Some(actor) = &actor {
    if !auth::is_admin(app_state.roles.as_ref(), actor).await {
      return Err(Error::Forbidden("Admin role is required".to_string()));
    }
  }
  let draft = body.into_inner()
    .into_draft()
    .map_err(|field| Error::BadRequest(format!("Field {} is required", field)))?;
  let id = app_state.repository.create(actor.as_ref(), draft).await?;
  app_state.admin_listing.refresh().await;
  Ok(HttpResponse::Created().json(
    JsonStatus::new_with_id(JsonStatusType::Success, "Blog created", &id)
  ))
}

pub async fn update_blog(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  body: web::Json<ArticlePatchDto>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::require_admin(&req, &app_state).await?;
  let id = path.into_inner().0;
  app_state.repository.update(&id, body.into_inner().into()).await?;
  app_state.admin_listing.refresh().await;
  Ok(HttpResponse::Ok().json(
    JsonStatus::new_with_id(JsonStatusType::Success, "Blog updated", &id)
  ))
}

pub async fn delete_blog(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let actor = helpers::require_admin(&req, &app_state).await?;
  let id = path.into_inner().0;
  app_state.repository.delete_by_id(&id).await?;
  info!("Blog {} deleted by {}", id, actor.uid);
  app_state.admin_listing.refresh().await;
  Ok(HttpResponse::Ok().json(
    JsonStatus::new_with_id(JsonStatusType::Success, "Blog deleted", &id)
  ))
}

pub async fn admin_preview(
  app_state: web::Data<AppState>,
  body: web::Json<PreviewRequestDto>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::require_admin(&req, &app_state).await?;
  Ok(HttpResponse::Ok().json(PreviewDto { html: render_markdown(&body.content) }))
}

// The import service has its own lock, a second import while one
// is running gets a 403 with the error status. Same when import is
// disabled.
pub async fn import_blogs(
  app_state: web::Data<AppState>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let actor = helpers::require_admin(&req, &app_state).await?;
  let import_service = match &app_state.import_service {
    Some(service) => service,
    None => return Ok(HttpResponse::Forbidden().json(
      JsonStatus::new(JsonStatusType::Error, "Import is disabled")
    ))
  };
  let response = match import_service
    .import_articles(&app_state.repository, &actor)
    .await {
      Ok(statuses) => HttpResponse::Ok().json(statuses),
      Err(status) => HttpResponse::Forbidden().json(status)
    };
  app_state.admin_listing.refresh().await;
  Ok(response)
}

// Validation first, no point counting broken forms against the
// rate limit.
pub async fn contact(
  app_state: web::Data<AppState>,
  form: web::Json<ContactForm>
) -> Result<HttpResponse, Error> {
  let form = form.into_inner();
  form.validate()?;
  if app_state.check_rate_limit() {
    return Err(Error::TooManyRequests);
  }
  let relay = app_state.relay.as_ref()
    .ok_or_else(|| Error::InternalServerError("Contact relay is not configured".to_string()))?;
  relay.send(&form).await?;
  Ok(HttpResponse::Ok().json(
    JsonStatus::new(JsonStatusType::Success, "Message sent")
  ))
}
