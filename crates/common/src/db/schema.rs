//! Table creation from the entity definitions

use crate::db::models::*;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

/// Create every table that does not exist yet.
///
/// Parents come before the tables whose foreign keys point at them.
pub async fn create_schema(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, ResearcherEntity).await?;
    create_table(db, &schema, ReferenceEntity).await?;
    create_table(db, &schema, ProjectEntity).await?;
    create_table(db, &schema, ProjectCollaboratorEntity).await?;
    create_table(db, &schema, EventEntity).await?;
    create_table(db, &schema, EventOrganizerEntity).await?;
    create_table(db, &schema, TalkEntity).await?;
    create_table(db, &schema, TalkAdditionalSpeakerEntity).await?;
    create_table(db, &schema, TalkReferenceEntity).await?;
    create_table(db, &schema, PostEntity).await?;
    create_table(db, &schema, PostRelatedProjectEntity).await?;

    info!("Database schema verified");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let table = entity.table_name().to_owned();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();

    db.execute(backend.build(&stmt)).await?;
    debug!(table = %table, "Table created/verified");
    Ok(())
}
