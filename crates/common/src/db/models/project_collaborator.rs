//! Join table: researchers collaborating on a project

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_collaborators")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub researcher_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,

    #[sea_orm(
        belongs_to = "super::researcher::Entity",
        from = "Column::ResearcherId",
        to = "super::researcher::Column::Id",
        on_delete = "Cascade"
    )]
    Researcher,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::researcher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Researcher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
