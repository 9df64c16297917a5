//! Reference entity: a bibliographic record

use super::choices::ReferenceType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bibliographic_references")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    /// Authors as a single formatted string
    pub authors: String,

    pub year: i32,

    pub reference_type: ReferenceType,

    pub journal: String,

    pub volume: String,

    pub pages: String,

    pub doi: String,

    pub url: String,

    /// Relative upload path under `references/`
    pub pdf_file: String,

    #[sea_orm(column_type = "Text")]
    pub abstract_text: String,

    pub keywords: String,

    /// Owning researcher; deleting them deletes the reference
    pub added_by: i32,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::researcher::Entity",
        from = "Column::AddedBy",
        to = "super::researcher::Column::Id",
        on_delete = "Cascade"
    )]
    AddedBy,

    #[sea_orm(has_many = "super::talk_reference::Entity")]
    TalkReferences,
}

impl Related<super::researcher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AddedBy.def()
    }
}

impl Related<super::talk::Entity> for Entity {
    fn to() -> RelationDef {
        super::talk_reference::Relation::Talk.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::talk_reference::Relation::Reference.def().rev())
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
