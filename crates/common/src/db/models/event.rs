//! Event entity: conferences, workshops, seminars

use super::choices::EventType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(nullable)]
    pub long_title: Option<String>,

    pub event_type: EventType,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub start_date: DateTimeWithTimeZone,

    pub end_date: DateTimeWithTimeZone,

    pub location: String,

    pub venue: String,

    pub room: String,

    pub website: String,

    pub registration_url: String,

    /// Relative upload path under `event_images/`
    pub image: String,

    pub is_featured: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Long title when present, otherwise the short one
    pub fn display_title(&self) -> &str {
        self.long_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::talk::Entity")]
    Talks,

    #[sea_orm(has_many = "super::event_organizer::Entity")]
    Organizers,
}

impl Related<super::talk::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Talks.def()
    }
}

impl Related<super::researcher::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_organizer::Relation::Researcher.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_organizer::Relation::Event.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        super::timestamps::touch(&mut self.created_at, &mut self.updated_at, insert);
        Ok(self)
    }
}
