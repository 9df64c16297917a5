//! Read-only page views
//!
//! Each view runs its queries through the repository it is handed and
//! returns the context a template renderer needs for one page. Missing rows
//! and rows hidden by a visibility flag both come back as `NotFound`.

use crate::config::SiteConfig;
use crate::db::models::{Event, Post, Project, Reference, Researcher, Talk};
use crate::db::Repository;
use crate::errors::{AppError, Result};
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use tracing::debug;

/// Limits applied to the home page sections
#[derive(Debug, Clone, Copy)]
pub struct HomeLimits {
    pub featured_events: u64,
    pub active_projects: u64,
    pub upcoming_events: u64,
}

impl Default for HomeLimits {
    fn default() -> Self {
        Self {
            featured_events: 3,
            active_projects: 5,
            upcoming_events: 3,
        }
    }
}

impl From<&SiteConfig> for HomeLimits {
    fn from(site: &SiteConfig) -> Self {
        Self {
            featured_events: site.featured_events_limit,
            active_projects: site.active_projects_limit,
            upcoming_events: site.upcoming_events_limit,
        }
    }
}

/// Template names handed to the renderer
pub mod templates {
    pub const HOME: &str = "main/home.html";
    pub const EVENTS_LIST: &str = "main/events_list.html";
    pub const EVENT_DETAIL: &str = "main/event_detail.html";
    pub const PROJECTS_LIST: &str = "main/projects_list.html";
    pub const PROJECT_DETAIL: &str = "main/project_detail.html";
    pub const RESEARCHERS_LIST: &str = "main/researchers_list.html";
    pub const RESEARCHER_DETAIL: &str = "main/researcher_detail.html";
    pub const REFERENCES_LIST: &str = "main/references_list.html";
    pub const POSTS_LIST: &str = "main/posts_list.html";
    pub const POST_DETAIL: &str = "main/post_detail.html";
    pub const ACC2025: &str = "main/acc2025.html";
}

// ============================================================================
// Contexts
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HomeContext {
    pub featured_events: Vec<Event>,
    pub active_projects: Vec<Project>,
    pub upcoming_events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventsListContext {
    pub events: Vec<Event>,
}

/// One schedule slot with the people and citations attached to it
#[derive(Debug, Clone, Serialize)]
pub struct TalkEntry {
    #[serde(flatten)]
    pub talk: Talk,
    pub speaker: Option<Researcher>,
    pub additional_speakers: Vec<Researcher>,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetailContext {
    pub event: Event,
    pub talks: Vec<TalkEntry>,
    pub organizers: Vec<Researcher>,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectsListContext {
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetailContext {
    pub project: Project,
    pub collaborators: Vec<Researcher>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchersListContext {
    pub researchers: Vec<Researcher>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearcherDetailContext {
    pub researcher: Researcher,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferencesListContext {
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostsListContext {
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailContext {
    pub post: Post,
    pub author: Option<Researcher>,
    pub related_projects: Vec<Project>,
}

// ============================================================================
// Views
// ============================================================================

/// Featured events, running public projects and what is coming up next
pub async fn home(
    repo: &Repository,
    now: DateTimeWithTimeZone,
    limits: HomeLimits,
) -> Result<HomeContext> {
    let featured_events = repo.featured_events(limits.featured_events).await?;
    let active_projects = repo.active_public_projects(limits.active_projects).await?;
    let upcoming_events = repo.upcoming_events(now, limits.upcoming_events).await?;

    Ok(HomeContext {
        featured_events,
        active_projects,
        upcoming_events,
    })
}

pub async fn events_list(repo: &Repository) -> Result<EventsListContext> {
    Ok(EventsListContext {
        events: repo.list_events().await?,
    })
}

/// Event with its schedule, organizers and the references cited across it
pub async fn event_detail(repo: &Repository, id: i32) -> Result<EventDetailContext> {
    let event = repo
        .find_event(id)
        .await?
        .ok_or_else(|| AppError::not_found("event", id))?;

    let mut talks = Vec::new();
    for (talk, speaker) in repo.talks_for_event(event.id).await? {
        let additional_speakers = repo.talk_additional_speakers(talk.id).await?;
        let references = repo.talk_references(&talk).await?;
        talks.push(TalkEntry {
            talk,
            speaker,
            additional_speakers,
            references,
        });
    }

    let organizers = repo.event_organizers(&event).await?;
    let references = repo.references_for_event(event.id).await?;

    debug!(
        event_id = event.id,
        talks = talks.len(),
        references = references.len(),
        "Event detail loaded"
    );

    Ok(EventDetailContext {
        event,
        talks,
        organizers,
        references,
    })
}

pub async fn projects_list(repo: &Repository) -> Result<ProjectsListContext> {
    Ok(ProjectsListContext {
        projects: repo.list_public_projects().await?,
    })
}

pub async fn project_detail(repo: &Repository, id: i32) -> Result<ProjectDetailContext> {
    let project = repo
        .find_public_project(id)
        .await?
        .ok_or_else(|| AppError::not_found("project", id))?;

    let collaborators = repo.project_collaborators(&project).await?;

    Ok(ProjectDetailContext {
        project,
        collaborators,
    })
}

pub async fn researchers_list(repo: &Repository) -> Result<ResearchersListContext> {
    Ok(ResearchersListContext {
        researchers: repo.list_active_researchers().await?,
    })
}

pub async fn researcher_detail(repo: &Repository, id: i32) -> Result<ResearcherDetailContext> {
    let researcher = repo
        .find_active_researcher(id)
        .await?
        .ok_or_else(|| AppError::not_found("researcher", id))?;

    let projects = repo.public_projects_for_researcher(&researcher).await?;

    Ok(ResearcherDetailContext {
        researcher,
        projects,
    })
}

pub async fn references_list(repo: &Repository) -> Result<ReferencesListContext> {
    Ok(ReferencesListContext {
        references: repo.list_references().await?,
    })
}

pub async fn posts_list(repo: &Repository) -> Result<PostsListContext> {
    Ok(PostsListContext {
        posts: repo.list_published_posts().await?,
    })
}

pub async fn post_detail(repo: &Repository, slug: &str) -> Result<PostDetailContext> {
    let post = repo
        .find_published_post(slug)
        .await?
        .ok_or_else(|| AppError::not_found("post", slug))?;

    let author = repo.post_author(&post).await?;
    let related_projects = repo.post_related_projects(&post).await?;

    Ok(PostDetailContext {
        post,
        author,
        related_projects,
    })
}
