//! Post entity: articles written by researchers
//!
//! The save hook enforces the first-publication rule: once a post is saved
//! as published, `published_at` records that moment and is never rewritten.

use super::timestamps::{publication_timestamp, touch};
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub author_id: i32,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(column_type = "Text")]
    pub excerpt: String,

    /// Relative upload path under `post_images/`
    pub featured_image: String,

    /// Comma-separated tags
    pub tags: String,

    pub is_published: bool,

    pub published_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::researcher::Entity",
        from = "Column::AuthorId",
        to = "super::researcher::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::researcher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_related_project::Relation::Project.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_related_project::Relation::Post.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let is_published = match &self.is_published {
            ActiveValue::Set(v) | ActiveValue::Unchanged(v) => *v,
            ActiveValue::NotSet => false,
        };

        if is_published {
            let current = match &self.published_at {
                ActiveValue::Set(v) | ActiveValue::Unchanged(v) => *v,
                ActiveValue::NotSet if insert => None,
                // Partial update: the stored value decides
                ActiveValue::NotSet => match &self.id {
                    ActiveValue::Set(id) | ActiveValue::Unchanged(id) => Entity::find_by_id(*id)
                        .one(db)
                        .await?
                        .and_then(|stored| stored.published_at),
                    ActiveValue::NotSet => None,
                },
            };

            let stamped = publication_timestamp(is_published, current, Utc::now().into());
            if stamped != current {
                self.published_at = ActiveValue::Set(stamped);
            }
        }

        touch(&mut self.created_at, &mut self.updated_at, insert);
        Ok(self)
    }
}
