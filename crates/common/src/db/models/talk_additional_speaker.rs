//! Join table: co-speakers of a talk besides the main speaker

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "talk_additional_speakers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub talk_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub researcher_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::talk::Entity",
        from = "Column::TalkId",
        to = "super::talk::Column::Id",
        on_delete = "Cascade"
    )]
    Talk,

    #[sea_orm(
        belongs_to = "super::researcher::Entity",
        from = "Column::ResearcherId",
        to = "super::researcher::Column::Id",
        on_delete = "Cascade"
    )]
    Researcher,
}

impl Related<super::talk::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Talk.def()
    }
}

impl Related<super::researcher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Researcher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
