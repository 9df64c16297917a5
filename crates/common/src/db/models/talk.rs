//! Talk entity: a scheduled slot inside one event

use super::choices::TalkType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "talks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning event; the talk is deleted with it
    pub event_id: i32,

    pub title: String,

    pub talk_type: TalkType,

    pub speaker_id: i32,

    #[sea_orm(column_type = "Text")]
    pub abstract_text: String,

    pub start_time: DateTimeWithTimeZone,

    pub end_time: DateTimeWithTimeZone,

    /// Relative upload path under `talk_slides/`
    pub slides: String,

    pub video_url: String,

    pub room: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,

    #[sea_orm(
        belongs_to = "super::researcher::Entity",
        from = "Column::SpeakerId",
        to = "super::researcher::Column::Id",
        on_delete = "Cascade"
    )]
    Speaker,

    #[sea_orm(has_many = "super::talk_reference::Entity")]
    TalkReferences,

    #[sea_orm(has_many = "super::talk_additional_speaker::Entity")]
    AdditionalSpeakers,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

/// Main speaker only; additional speakers go through their own join table
impl Related<super::researcher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Speaker.def()
    }
}

impl Related<super::reference::Entity> for Entity {
    fn to() -> RelationDef {
        super::talk_reference::Relation::Reference.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::talk_reference::Relation::Talk.def().rev())
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
