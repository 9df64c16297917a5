//! Page handlers
//!
//! Each handler answers with the template to render and its context. The
//! renderer also gets the media URL so it can resolve stored upload paths.

use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use colloquium_common::{
    db::Repository,
    errors::{AppError, Result},
    metrics::{record_not_found, record_page_view},
    views::{self, templates, HomeLimits},
};
use serde::Serialize;

/// JSON envelope handed to the template renderer
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub template: &'static str,
    pub media_url: String,
    pub context: T,
}

/// Context of pages that render from the template alone
#[derive(Debug, Serialize)]
pub struct Empty {}

fn render<T>(state: &AppState, template: &'static str, context: Result<T>) -> Result<Json<Page<T>>> {
    match context {
        Ok(context) => {
            record_page_view(template);
            Ok(Json(Page {
                template,
                media_url: state.config.site.media_url.clone(),
                context,
            }))
        }
        Err(err) => {
            if let AppError::NotFound { resource_type, .. } = &err {
                record_not_found(resource_type);
            }
            Err(err)
        }
    }
}

/// Path ids that are not an `i32` name no row
fn row_id(resource_type: &str, raw: &str) -> Result<i32> {
    raw.parse()
        .map_err(|_| AppError::not_found(resource_type, raw))
}

pub async fn home(State(state): State<AppState>) -> Result<Json<Page<views::HomeContext>>> {
    let repo = Repository::new(state.db.clone());
    let limits = HomeLimits::from(&state.config.site);
    let context = views::home(&repo, Utc::now().into(), limits).await;
    render(&state, templates::HOME, context)
}

pub async fn events_list(
    State(state): State<AppState>,
) -> Result<Json<Page<views::EventsListContext>>> {
    let repo = Repository::new(state.db.clone());
    let context = views::events_list(&repo).await;
    render(&state, templates::EVENTS_LIST, context)
}

pub async fn event_detail(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Page<views::EventDetailContext>>> {
    let repo = Repository::new(state.db.clone());
    let context = match row_id("event", &raw) {
        Ok(id) => views::event_detail(&repo, id).await,
        Err(err) => Err(err),
    };
    render(&state, templates::EVENT_DETAIL, context)
}

pub async fn projects_list(
    State(state): State<AppState>,
) -> Result<Json<Page<views::ProjectsListContext>>> {
    let repo = Repository::new(state.db.clone());
    let context = views::projects_list(&repo).await;
    render(&state, templates::PROJECTS_LIST, context)
}

pub async fn project_detail(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Page<views::ProjectDetailContext>>> {
    let repo = Repository::new(state.db.clone());
    let context = match row_id("project", &raw) {
        Ok(id) => views::project_detail(&repo, id).await,
        Err(err) => Err(err),
    };
    render(&state, templates::PROJECT_DETAIL, context)
}

pub async fn researchers_list(
    State(state): State<AppState>,
) -> Result<Json<Page<views::ResearchersListContext>>> {
    let repo = Repository::new(state.db.clone());
    let context = views::researchers_list(&repo).await;
    render(&state, templates::RESEARCHERS_LIST, context)
}

pub async fn researcher_detail(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Page<views::ResearcherDetailContext>>> {
    let repo = Repository::new(state.db.clone());
    let context = match row_id("researcher", &raw) {
        Ok(id) => views::researcher_detail(&repo, id).await,
        Err(err) => Err(err),
    };
    render(&state, templates::RESEARCHER_DETAIL, context)
}

pub async fn references_list(
    State(state): State<AppState>,
) -> Result<Json<Page<views::ReferencesListContext>>> {
    let repo = Repository::new(state.db.clone());
    let context = views::references_list(&repo).await;
    render(&state, templates::REFERENCES_LIST, context)
}

pub async fn posts_list(State(state): State<AppState>) -> Result<Json<Page<views::PostsListContext>>> {
    let repo = Repository::new(state.db.clone());
    let context = views::posts_list(&repo).await;
    render(&state, templates::POSTS_LIST, context)
}

pub async fn post_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Page<views::PostDetailContext>>> {
    let repo = Repository::new(state.db.clone());
    let context = views::post_detail(&repo, &slug).await;
    render(&state, templates::POST_DETAIL, context)
}

pub async fn acc2025(State(state): State<AppState>) -> Result<Json<Page<Empty>>> {
    render(&state, templates::ACC2025, Ok(Empty {}))
}
