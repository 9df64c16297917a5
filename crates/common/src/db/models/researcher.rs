//! Researcher entity, the primary identity of the site

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "researchers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// External identity account, owned outside this system
    #[sea_orm(unique, nullable)]
    pub user_id: Option<i32>,

    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    pub institution: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub bio: String,

    pub website: String,

    pub lab: String,

    pub lab_website: String,

    /// Relative upload path under `researcher_photos/`
    pub photo: String,

    /// Comma-separated research areas
    #[sea_orm(column_type = "Text")]
    pub research_areas: String,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Research areas split on commas, trimmed, empty entries dropped
    pub fn research_area_list(&self) -> Vec<&str> {
        self.research_areas
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reference::Entity")]
    References,

    #[sea_orm(has_many = "super::talk::Entity")]
    Talks,

    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::reference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::References.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        super::project_collaborator::Relation::Project.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::project_collaborator::Relation::Researcher.def().rev())
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_organizer::Relation::Event.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_organizer::Relation::Researcher.def().rev())
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_research_area_list() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let model = Model {
            id: 1,
            user_id: None,
            name: "Ada".into(),
            email: "ada@example.org".into(),
            institution: "Analytical Society".into(),
            title: String::new(),
            bio: String::new(),
            website: String::new(),
            lab: String::new(),
            lab_website: String::new(),
            photo: String::new(),
            research_areas: " control theory, ,optimization ,".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(model.research_area_list(), vec!["control theory", "optimization"]);
    }
}
