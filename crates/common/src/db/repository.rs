//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with proper
//! error handling. Every query goes through an explicit connection handle
//! held by the repository; there is no ambient session.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::uploads::UploadKind;
use chrono::NaiveDate;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{info, warn};
use validator::{Validate, ValidateUrl, ValidationError};

// ============================================================================
// Input types
// ============================================================================

/// Fields for a new researcher profile
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewResearcher {
    #[serde(default)]
    pub user_id: Option<i32>,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 200))]
    pub institution: String,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,

    #[serde(default)]
    pub bio: String,

    #[serde(default)]
    #[validate(custom(function = "url_or_empty"))]
    pub website: String,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub lab: String,

    #[serde(default)]
    #[validate(custom(function = "url_or_empty"))]
    pub lab_website: String,

    #[serde(default)]
    pub photo: String,

    #[serde(default)]
    pub research_areas: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewReference {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[validate(length(min = 1, max = 1000))]
    pub authors: String,

    #[validate(range(min = 1, max = 9999))]
    pub year: i32,

    pub reference_type: ReferenceType,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub journal: String,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub volume: String,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub pages: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub doi: String,

    #[serde(default)]
    #[validate(custom(function = "url_or_empty"))]
    pub url: String,

    #[serde(default)]
    pub pdf_file: String,

    #[serde(default)]
    pub abstract_text: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub keywords: String,

    pub added_by: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProject {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1))]
    pub description: String,

    pub start_date: NaiveDate,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(default)]
    #[validate(custom(function = "url_or_empty"))]
    pub website: String,

    #[serde(default)]
    #[validate(custom(function = "url_or_empty"))]
    pub repository: String,

    #[serde(default)]
    pub image: String,

    #[serde(default = "default_true")]
    pub is_public: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEvent {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[serde(default)]
    pub long_title: Option<String>,

    pub event_type: EventType,

    #[validate(length(min = 1))]
    pub description: String,

    pub start_date: DateTimeWithTimeZone,

    pub end_date: DateTimeWithTimeZone,

    #[validate(length(min = 1, max = 200))]
    pub location: String,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub venue: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub room: String,

    #[serde(default)]
    #[validate(custom(function = "url_or_empty"))]
    pub website: String,

    #[serde(default)]
    #[validate(custom(function = "url_or_empty"))]
    pub registration_url: String,

    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTalk {
    pub event_id: i32,

    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[serde(default)]
    pub talk_type: TalkType,

    pub speaker_id: i32,

    #[serde(default)]
    pub abstract_text: String,

    pub start_time: DateTimeWithTimeZone,

    pub end_time: DateTimeWithTimeZone,

    #[serde(default)]
    pub slides: String,

    #[serde(default)]
    #[validate(custom(function = "url_or_empty"))]
    pub video_url: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub room: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPost {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
    pub slug: String,

    pub author_id: i32,

    #[validate(length(min = 1))]
    pub content: String,

    #[serde(default)]
    pub excerpt: String,

    #[serde(default)]
    pub featured_image: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub tags: String,

    #[serde(default)]
    pub is_published: bool,
}

/// Partial edit of a post; `None` leaves the field as stored
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostChanges {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    pub excerpt: Option<String>,

    #[validate(length(max = 500))]
    pub tags: Option<String>,

    pub is_published: Option<bool>,
}

/// Upload file names are stored under their kind's directory; blank stays blank
fn stored_upload(kind: UploadKind, file_name: &str) -> Result<String> {
    if file_name.is_empty() {
        Ok(String::new())
    } else {
        kind.path_for(file_name)
    }
}

fn default_true() -> bool {
    true
}

/// Blank is allowed, anything else must be a full URL
fn url_or_empty(value: &str) -> std::result::Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

/// Letters, digits, hyphens and underscores only
fn validate_slug(value: &str) -> std::result::Result<(), ValidationError> {
    static SLUG_RE: OnceLock<regex_lite::Regex> = OnceLock::new();
    let re = SLUG_RE.get_or_init(|| {
        regex_lite::Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid")
    });

    if re.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

// ============================================================================
// Repository
// ============================================================================

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    pub(crate) fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Researcher Operations
    // ========================================================================

    /// Create a researcher profile
    pub async fn create_researcher(&self, input: NewResearcher) -> Result<Researcher> {
        input.validate()?;

        let researcher = ResearcherActiveModel {
            user_id: Set(input.user_id),
            name: Set(input.name),
            email: Set(input.email),
            institution: Set(input.institution),
            title: Set(input.title),
            bio: Set(input.bio),
            website: Set(input.website),
            lab: Set(input.lab),
            lab_website: Set(input.lab_website),
            photo: Set(stored_upload(UploadKind::ResearcherPhoto, &input.photo)?),
            research_areas: Set(input.research_areas),
            is_active: Set(true),
            ..Default::default()
        };

        let researcher = researcher.insert(self.write_conn()).await?;
        info!(researcher_id = researcher.id, "Researcher created");
        Ok(researcher)
    }

    /// Find researcher by ID regardless of activity
    pub async fn find_researcher(&self, id: i32) -> Result<Option<Researcher>> {
        ResearcherEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find researcher by ID, hiding disabled profiles
    pub async fn find_active_researcher(&self, id: i32) -> Result<Option<Researcher>> {
        ResearcherEntity::find_by_id(id)
            .filter(ResearcherColumn::IsActive.eq(true))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Active researchers ordered by name
    pub async fn list_active_researchers(&self) -> Result<Vec<Researcher>> {
        ResearcherEntity::find()
            .filter(ResearcherColumn::IsActive.eq(true))
            .order_by_asc(ResearcherColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Enable or soft-disable a profile
    pub async fn set_researcher_active(&self, id: i32, is_active: bool) -> Result<Researcher> {
        let mut researcher: ResearcherActiveModel = self
            .find_researcher(id)
            .await?
            .ok_or_else(|| AppError::not_found("researcher", id))?
            .into_active_model();

        researcher.is_active = Set(is_active);
        researcher.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a researcher and, through foreign keys, everything they own.
    ///
    /// References added by the researcher, talks they give and posts they
    /// wrote go with them.
    pub async fn delete_researcher(&self, id: i32) -> Result<bool> {
        let owned_references = ReferenceEntity::find()
            .filter(ReferenceColumn::AddedBy.eq(id))
            .count(self.write_conn())
            .await?;

        let result = ResearcherEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        if result.rows_affected > 0 && owned_references > 0 {
            warn!(
                researcher_id = id,
                references = owned_references,
                "Researcher deleted together with the references they added"
            );
        }

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Reference Operations
    // ========================================================================

    /// Create a bibliographic reference
    pub async fn create_reference(&self, input: NewReference) -> Result<Reference> {
        input.validate()?;

        let reference = ReferenceActiveModel {
            title: Set(input.title),
            authors: Set(input.authors),
            year: Set(input.year),
            reference_type: Set(input.reference_type),
            journal: Set(input.journal),
            volume: Set(input.volume),
            pages: Set(input.pages),
            doi: Set(input.doi),
            url: Set(input.url),
            pdf_file: Set(stored_upload(UploadKind::ReferencePdf, &input.pdf_file)?),
            abstract_text: Set(input.abstract_text),
            keywords: Set(input.keywords),
            added_by: Set(input.added_by),
            ..Default::default()
        };

        reference.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// All references, newest year first, then by title
    pub async fn list_references(&self) -> Result<Vec<Reference>> {
        ReferenceEntity::find()
            .order_by_desc(ReferenceColumn::Year)
            .order_by_asc(ReferenceColumn::Title)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// References cited by any talk of the event, each at most once
    pub async fn references_for_event(&self, event_id: i32) -> Result<Vec<Reference>> {
        let cited = Query::select()
            .column(TalkReferenceColumn::ReferenceId)
            .from(TalkReferenceEntity)
            .inner_join(
                TalkEntity,
                Expr::col((TalkEntity, TalkColumn::Id))
                    .equals((TalkReferenceEntity, TalkReferenceColumn::TalkId)),
            )
            .and_where(Expr::col((TalkEntity, TalkColumn::EventId)).eq(event_id))
            .to_owned();

        ReferenceEntity::find()
            .filter(ReferenceColumn::Id.in_subquery(cited))
            .order_by_desc(ReferenceColumn::Year)
            .order_by_asc(ReferenceColumn::Title)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Project Operations
    // ========================================================================

    /// Create a project
    pub async fn create_project(&self, input: NewProject) -> Result<Project> {
        input.validate()?;

        let project = ProjectActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            status: Set(input.status),
            website: Set(input.website),
            repository: Set(input.repository),
            image: Set(stored_upload(UploadKind::ProjectImage, &input.image)?),
            is_public: Set(input.is_public),
            ..Default::default()
        };

        project.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Add a collaborator; returns false when already linked
    pub async fn add_collaborator(&self, project_id: i32, researcher_id: i32) -> Result<bool> {
        let link = ProjectCollaboratorActiveModel {
            project_id: Set(project_id),
            researcher_id: Set(researcher_id),
        };

        let inserted = ProjectCollaboratorEntity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    ProjectCollaboratorColumn::ProjectId,
                    ProjectCollaboratorColumn::ResearcherId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        Ok(inserted > 0)
    }

    /// Public projects, most recently created first
    pub async fn list_public_projects(&self) -> Result<Vec<Project>> {
        ProjectEntity::find()
            .filter(ProjectColumn::IsPublic.eq(true))
            .order_by_desc(ProjectColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Public projects that are still running
    pub async fn active_public_projects(&self, limit: u64) -> Result<Vec<Project>> {
        ProjectEntity::find()
            .filter(ProjectColumn::Status.eq(ProjectStatus::Active))
            .filter(ProjectColumn::IsPublic.eq(true))
            .order_by_desc(ProjectColumn::CreatedAt)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find project by ID, hiding private ones
    pub async fn find_public_project(&self, id: i32) -> Result<Option<Project>> {
        ProjectEntity::find_by_id(id)
            .filter(ProjectColumn::IsPublic.eq(true))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Active collaborators of a project, by name
    pub async fn project_collaborators(&self, project: &Project) -> Result<Vec<Researcher>> {
        project
            .find_related(ResearcherEntity)
            .filter(ResearcherColumn::IsActive.eq(true))
            .order_by_asc(ResearcherColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Public projects the researcher collaborates on, by name
    pub async fn public_projects_for_researcher(
        &self,
        researcher: &Researcher,
    ) -> Result<Vec<Project>> {
        researcher
            .find_related(ProjectEntity)
            .filter(ProjectColumn::IsPublic.eq(true))
            .order_by_asc(ProjectColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Event Operations
    // ========================================================================

    /// Create an event
    pub async fn create_event(&self, input: NewEvent) -> Result<Event> {
        input.validate()?;

        let event = EventActiveModel {
            title: Set(input.title),
            long_title: Set(input.long_title),
            event_type: Set(input.event_type),
            description: Set(input.description),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            location: Set(input.location),
            venue: Set(input.venue),
            room: Set(input.room),
            website: Set(input.website),
            registration_url: Set(input.registration_url),
            image: Set(stored_upload(UploadKind::EventImage, &input.image)?),
            is_featured: Set(input.is_featured),
            ..Default::default()
        };

        event.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Add an organizer; returns false when already linked
    pub async fn add_organizer(&self, event_id: i32, researcher_id: i32) -> Result<bool> {
        let link = EventOrganizerActiveModel {
            event_id: Set(event_id),
            researcher_id: Set(researcher_id),
        };

        let inserted = EventOrganizerEntity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    EventOrganizerColumn::EventId,
                    EventOrganizerColumn::ResearcherId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        Ok(inserted > 0)
    }

    /// Find event by ID
    pub async fn find_event(&self, id: i32) -> Result<Option<Event>> {
        EventEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// All events, latest start first
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        EventEntity::find()
            .order_by_desc(EventColumn::StartDate)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Featured events, soonest first
    pub async fn featured_events(&self, limit: u64) -> Result<Vec<Event>> {
        EventEntity::find()
            .filter(EventColumn::IsFeatured.eq(true))
            .order_by_asc(EventColumn::StartDate)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Events starting at or after `now`, soonest first
    pub async fn upcoming_events(
        &self,
        now: DateTimeWithTimeZone,
        limit: u64,
    ) -> Result<Vec<Event>> {
        EventEntity::find()
            .filter(EventColumn::StartDate.gte(now))
            .order_by_asc(EventColumn::StartDate)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Organizers of an event, by name
    pub async fn event_organizers(&self, event: &Event) -> Result<Vec<Researcher>> {
        event
            .find_related(ResearcherEntity)
            .order_by_asc(ResearcherColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Talk Operations
    // ========================================================================

    /// Schedule a talk inside an event
    pub async fn create_talk(&self, input: NewTalk) -> Result<Talk> {
        input.validate()?;

        let talk = TalkActiveModel {
            event_id: Set(input.event_id),
            title: Set(input.title),
            talk_type: Set(input.talk_type),
            speaker_id: Set(input.speaker_id),
            abstract_text: Set(input.abstract_text),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            slides: Set(stored_upload(UploadKind::TalkSlides, &input.slides)?),
            video_url: Set(input.video_url),
            room: Set(input.room),
            ..Default::default()
        };

        talk.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Add a co-speaker; returns false when already linked
    pub async fn add_talk_speaker(&self, talk_id: i32, researcher_id: i32) -> Result<bool> {
        let link = TalkAdditionalSpeakerActiveModel {
            talk_id: Set(talk_id),
            researcher_id: Set(researcher_id),
        };

        let inserted = TalkAdditionalSpeakerEntity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    TalkAdditionalSpeakerColumn::TalkId,
                    TalkAdditionalSpeakerColumn::ResearcherId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        Ok(inserted > 0)
    }

    /// Cite a reference in a talk; returns false when already linked
    pub async fn attach_reference(&self, talk_id: i32, reference_id: i32) -> Result<bool> {
        let link = TalkReferenceActiveModel {
            talk_id: Set(talk_id),
            reference_id: Set(reference_id),
        };

        let inserted = TalkReferenceEntity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    TalkReferenceColumn::TalkId,
                    TalkReferenceColumn::ReferenceId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        Ok(inserted > 0)
    }

    /// Talks of an event in schedule order, each with its main speaker
    pub async fn talks_for_event(&self, event_id: i32) -> Result<Vec<(Talk, Option<Researcher>)>> {
        TalkEntity::find()
            .filter(TalkColumn::EventId.eq(event_id))
            .order_by_asc(TalkColumn::StartTime)
            .order_by_asc(TalkColumn::Id)
            .find_also_related(ResearcherEntity)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Co-speakers of a talk, by name
    pub async fn talk_additional_speakers(&self, talk_id: i32) -> Result<Vec<Researcher>> {
        let linked = Query::select()
            .column(TalkAdditionalSpeakerColumn::ResearcherId)
            .from(TalkAdditionalSpeakerEntity)
            .and_where(Expr::col(TalkAdditionalSpeakerColumn::TalkId).eq(talk_id))
            .to_owned();

        ResearcherEntity::find()
            .filter(ResearcherColumn::Id.in_subquery(linked))
            .order_by_asc(ResearcherColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// References cited by a single talk
    pub async fn talk_references(&self, talk: &Talk) -> Result<Vec<Reference>> {
        talk.find_related(ReferenceEntity)
            .order_by_desc(ReferenceColumn::Year)
            .order_by_asc(ReferenceColumn::Title)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Post Operations
    // ========================================================================

    /// Create a post; publishing on creation stamps `published_at`
    pub async fn create_post(&self, input: NewPost) -> Result<Post> {
        input.validate()?;

        let post = PostActiveModel {
            title: Set(input.title),
            slug: Set(input.slug),
            author_id: Set(input.author_id),
            content: Set(input.content),
            excerpt: Set(input.excerpt),
            featured_image: Set(stored_upload(UploadKind::PostImage, &input.featured_image)?),
            tags: Set(input.tags),
            is_published: Set(input.is_published),
            published_at: Set(None),
            ..Default::default()
        };

        let post = post.insert(self.write_conn()).await?;
        info!(post_id = post.id, slug = %post.slug, published = post.is_published, "Post created");
        Ok(post)
    }

    /// Apply a partial edit and save through the publication rule
    pub async fn save_post(&self, id: i32, changes: PostChanges) -> Result<Post> {
        changes.validate()?;

        let mut post: PostActiveModel = PostEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::not_found("post", id))?
            .into_active_model();

        if let Some(title) = changes.title {
            post.title = Set(title);
        }
        if let Some(content) = changes.content {
            post.content = Set(content);
        }
        if let Some(excerpt) = changes.excerpt {
            post.excerpt = Set(excerpt);
        }
        if let Some(tags) = changes.tags {
            post.tags = Set(tags);
        }
        if let Some(is_published) = changes.is_published {
            post.is_published = Set(is_published);
        }

        post.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Publish or withdraw a post
    pub async fn set_post_published(&self, id: i32, is_published: bool) -> Result<Post> {
        self.save_post(
            id,
            PostChanges {
                is_published: Some(is_published),
                ..Default::default()
            },
        )
        .await
    }

    /// Relate a post to a project; returns false when already linked
    pub async fn link_post_project(&self, post_id: i32, project_id: i32) -> Result<bool> {
        let link = PostRelatedProjectActiveModel {
            post_id: Set(post_id),
            project_id: Set(project_id),
        };

        let inserted = PostRelatedProjectEntity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    PostRelatedProjectColumn::PostId,
                    PostRelatedProjectColumn::ProjectId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        Ok(inserted > 0)
    }

    /// Published posts, most recently published first
    pub async fn list_published_posts(&self) -> Result<Vec<Post>> {
        PostEntity::find()
            .filter(PostColumn::IsPublished.eq(true))
            .order_by_desc(PostColumn::PublishedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find a published post by slug
    pub async fn find_published_post(&self, slug: &str) -> Result<Option<Post>> {
        PostEntity::find()
            .filter(PostColumn::Slug.eq(slug))
            .filter(PostColumn::IsPublished.eq(true))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Public projects a post is about, by name
    pub async fn post_related_projects(&self, post: &Post) -> Result<Vec<Project>> {
        post.find_related(ProjectEntity)
            .filter(ProjectColumn::IsPublic.eq(true))
            .order_by_asc(ProjectColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Author of a post
    pub async fn post_author(&self, post: &Post) -> Result<Option<Researcher>> {
        post.find_related(ResearcherEntity)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_researcher_email_must_be_valid() {
        let repo = repo().await;
        let mut input = researcher_input("Ada Lovelace", "ada@example.org");
        input.email = "not-an-email".into();

        let err = repo.create_researcher(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field.as_deref() == Some("email")));
    }

    #[tokio::test]
    async fn test_researcher_website_may_be_blank_but_not_garbage() {
        let repo = repo().await;

        let mut ok = researcher_input("Ada Lovelace", "ada@example.org");
        ok.website = String::new();
        repo.create_researcher(ok).await.unwrap();

        let mut bad = researcher_input("Charles Babbage", "charles@example.org");
        bad.website = "engine room".into();
        let err = repo.create_researcher(bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_photo_stored_under_upload_directory() {
        let repo = repo().await;
        let mut input = researcher_input("Ada", "ada@example.org");
        input.photo = "ada.jpg".into();
        let ada = repo.create_researcher(input).await.unwrap();
        assert_eq!(ada.photo, "researcher_photos/ada.jpg");

        let mut nested = researcher_input("Eve", "eve@example.org");
        nested.photo = "../../eve.jpg".into();
        assert!(repo.create_researcher(nested).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = repo().await;
        repo.create_researcher(researcher_input("Ada", "ada@example.org"))
            .await
            .unwrap();

        let err = repo
            .create_researcher(researcher_input("Another Ada", "ada@example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_timestamps_on_insert_and_update() {
        let repo = repo().await;
        let created = repo
            .create_researcher(researcher_input("Ada", "ada@example.org"))
            .await
            .unwrap();
        assert_eq!(created.created_at, created.updated_at);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let disabled = repo.set_researcher_active(created.id, false).await.unwrap();

        assert!(!disabled.is_active);
        assert_eq!(disabled.created_at, created.created_at);
        assert!(disabled.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_links_are_idempotent() {
        let repo = repo().await;
        let ada = repo
            .create_researcher(researcher_input("Ada", "ada@example.org"))
            .await
            .unwrap();
        let project = repo.create_project(project_input("Engine", true)).await.unwrap();

        assert!(repo.add_collaborator(project.id, ada.id).await.unwrap());
        assert!(!repo.add_collaborator(project.id, ada.id).await.unwrap());

        let collaborators = repo.project_collaborators(&project).await.unwrap();
        assert_eq!(collaborators.len(), 1);
    }

    #[tokio::test]
    async fn test_upcoming_events_start_at_or_after_now() {
        let repo = repo().await;
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        repo.create_event(event_input("Past", now - Duration::days(1), false)).await.unwrap();
        repo.create_event(event_input("Now", now, false)).await.unwrap();
        repo.create_event(event_input("Later", now + Duration::days(30), false)).await.unwrap();
        repo.create_event(event_input("Soon", now + Duration::days(2), false)).await.unwrap();

        let upcoming = repo.upcoming_events(now.into(), 3).await.unwrap();
        let titles: Vec<_> = upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Now", "Soon", "Later"]);
    }

    #[tokio::test]
    async fn test_post_published_on_create() {
        let repo = repo().await;
        let author = repo
            .create_researcher(researcher_input("Ada", "ada@example.org"))
            .await
            .unwrap();

        let draft = repo.create_post(post_input(author.id, "draft", false)).await.unwrap();
        assert!(draft.published_at.is_none());

        let live = repo.create_post(post_input(author.id, "live", true)).await.unwrap();
        assert!(live.published_at.is_some());
    }

    #[tokio::test]
    async fn test_publication_timestamp_is_permanent() {
        let repo = repo().await;
        let author = repo
            .create_researcher(researcher_input("Ada", "ada@example.org"))
            .await
            .unwrap();
        let post = repo.create_post(post_input(author.id, "notes", false)).await.unwrap();

        let published = repo.set_post_published(post.id, true).await.unwrap();
        let first = published.published_at.expect("published_at set on publish");

        // Saving again, editing, and un/re-publishing keep the first value
        let resaved = repo.set_post_published(post.id, true).await.unwrap();
        assert_eq!(resaved.published_at, Some(first));

        let edited = repo
            .save_post(
                post.id,
                PostChanges {
                    title: Some("Revised notes".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.published_at, Some(first));

        let withdrawn = repo.set_post_published(post.id, false).await.unwrap();
        assert_eq!(withdrawn.published_at, Some(first));

        let republished = repo.set_post_published(post.id, true).await.unwrap();
        assert_eq!(republished.published_at, Some(first));
    }

    #[tokio::test]
    async fn test_partial_active_model_update_keeps_publication() {
        let repo = repo().await;
        let author = repo
            .create_researcher(researcher_input("Ada", "ada@example.org"))
            .await
            .unwrap();
        let post = repo.create_post(post_input(author.id, "notes", true)).await.unwrap();
        let first = post.published_at;

        // published_at is absent from the active model entirely
        let partial = PostActiveModel {
            id: sea_orm::ActiveValue::Unchanged(post.id),
            is_published: Set(true),
            ..Default::default()
        };
        let saved = partial.update(repo.write_conn()).await.unwrap();
        assert_eq!(saved.published_at, first);
    }

    #[tokio::test]
    async fn test_slug_must_be_slug() {
        let repo = repo().await;
        let author = repo
            .create_researcher(researcher_input("Ada", "ada@example.org"))
            .await
            .unwrap();

        let err = repo
            .create_post(post_input(author.id, "not a slug!", false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field.as_deref() == Some("slug")));
    }

    #[tokio::test]
    async fn test_unknown_post_update_is_not_found() {
        let repo = repo().await;
        let err = repo.set_post_published(404, true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deleting_researcher_cascades_to_references() {
        let repo = repo().await;
        let ada = repo
            .create_researcher(researcher_input("Ada", "ada@example.org"))
            .await
            .unwrap();
        let other = repo
            .create_researcher(researcher_input("Charles", "charles@example.org"))
            .await
            .unwrap();
        repo.create_reference(reference_input("Notes", 1843, ada.id)).await.unwrap();
        repo.create_reference(reference_input("Engines", 1837, other.id)).await.unwrap();

        assert!(repo.delete_researcher(ada.id).await.unwrap());
        assert!(!repo.delete_researcher(ada.id).await.unwrap());

        let remaining = repo.list_references().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "Engines");
    }
}
