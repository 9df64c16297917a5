//! Join table: references cited in a talk

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "talk_references")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub talk_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub reference_id: i32,
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
        belongs_to = "super::reference::Entity",
        from = "Column::ReferenceId",
        to = "super::reference::Column::Id",
        on_delete = "Cascade"
    )]
    Reference,
}

impl Related<super::talk::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Talk.def()
    }
}

impl Related<super::reference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reference.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
