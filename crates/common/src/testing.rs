//! Fixtures shared by the unit tests of this crate

use crate::db::models::{EventType, ProjectStatus, ReferenceType, TalkType};
use crate::db::{
    DbPool, NewEvent, NewPost, NewProject, NewReference, NewResearcher, NewTalk, Repository,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub(crate) async fn repo() -> Repository {
    Repository::new(DbPool::in_memory().await.unwrap())
}

/// Whole-second UTC timestamp on 2025-09-15
pub(crate) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 15, hour, minute, 0).unwrap()
}

pub(crate) fn researcher_input(name: &str, email: &str) -> NewResearcher {
    NewResearcher {
        user_id: None,
        name: name.into(),
        email: email.into(),
        institution: "Analytical Society".into(),
        title: String::new(),
        bio: String::new(),
        website: String::new(),
        lab: String::new(),
        lab_website: String::new(),
        photo: String::new(),
        research_areas: "computation, mathematics".into(),
    }
}

pub(crate) fn reference_input(title: &str, year: i32, added_by: i32) -> NewReference {
    NewReference {
        title: title.into(),
        authors: "A. Lovelace".into(),
        year,
        reference_type: ReferenceType::Paper,
        journal: String::new(),
        volume: String::new(),
        pages: String::new(),
        doi: String::new(),
        url: String::new(),
        pdf_file: String::new(),
        abstract_text: String::new(),
        keywords: String::new(),
        added_by,
    }
}

pub(crate) fn project_input(name: &str, is_public: bool) -> NewProject {
    NewProject {
        name: name.into(),
        description: format!("{name} description"),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: None,
        status: ProjectStatus::Active,
        website: String::new(),
        repository: String::new(),
        image: String::new(),
        is_public,
    }
}

pub(crate) fn event_input(title: &str, start: DateTime<Utc>, is_featured: bool) -> NewEvent {
    NewEvent {
        title: title.into(),
        long_title: None,
        event_type: EventType::Workshop,
        description: format!("{title} description"),
        start_date: start.into(),
        end_date: (start + chrono::Duration::hours(8)).into(),
        location: "Lisbon".into(),
        venue: String::new(),
        room: String::new(),
        website: String::new(),
        registration_url: String::new(),
        image: String::new(),
        is_featured,
    }
}

pub(crate) fn talk_input(
    event_id: i32,
    speaker_id: i32,
    title: &str,
    start: DateTime<Utc>,
) -> NewTalk {
    NewTalk {
        event_id,
        title: title.into(),
        talk_type: TalkType::Talk,
        speaker_id,
        abstract_text: String::new(),
        start_time: start.into(),
        end_time: (start + chrono::Duration::minutes(45)).into(),
        slides: String::new(),
        video_url: String::new(),
        room: String::new(),
    }
}

pub(crate) fn post_input(author_id: i32, slug: &str, is_published: bool) -> NewPost {
    NewPost {
        title: format!("Post {slug}"),
        slug: slug.into(),
        author_id,
        content: "Body".into(),
        excerpt: String::new(),
        featured_image: String::new(),
        tags: String::new(),
        is_published,
    }
}
