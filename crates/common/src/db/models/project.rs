//! Project entity for collaborative research efforts

use super::choices::ProjectStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub start_date: Date,

    pub end_date: Option<Date>,

    pub status: ProjectStatus,

    pub website: String,

    pub repository: String,

    /// Relative upload path under `project_images/`
    pub image: String,

    pub is_public: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_collaborator::Entity")]
    Collaborators,
}

impl Related<super::researcher::Entity> for Entity {
    fn to() -> RelationDef {
        super::project_collaborator::Relation::Researcher.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::project_collaborator::Relation::Project.def().rev())
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_related_project::Relation::Post.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_related_project::Relation::Project.def().rev())
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
