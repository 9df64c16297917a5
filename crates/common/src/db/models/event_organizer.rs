//! Join table: researchers organizing an event

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_organizers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub researcher_id: i32,
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
        from = "Column::ResearcherId",
        to = "super::researcher::Column::Id",
        on_delete = "Cascade"
    )]
    Researcher,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::researcher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Researcher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
