//! Administrative capability table
//!
//! Every managed entity declares, once and statically, which of its columns
//! the admin list shows, which can be filtered on, which are searched and
//! how rows are ordered. A single generic query serves all of them.

use crate::db::models::*;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::metrics::record_admin_query;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{ColumnType, Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, IdenStatic, Order, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Closed value set of an enumerated column
pub type Choices = fn() -> Vec<String>;

/// Admin declaration for one entity
pub struct ModelAdmin<E: EntityTrait> {
    pub list_display: &'static [E::Column],
    pub list_filter: &'static [E::Column],
    pub search_fields: &'static [E::Column],
    pub ordering: &'static [(E::Column, SortOrder)],
    pub choices: &'static [(E::Column, Choices)],
}

impl<E: EntityTrait> ModelAdmin<E> {
    fn filter_column(&self, name: &str) -> Option<E::Column> {
        self.list_filter.iter().copied().find(|c| c.as_str() == name)
    }

    fn choices_for(&self, column: E::Column) -> Option<Choices> {
        self.choices
            .iter()
            .find(|(c, _)| c.as_str() == column.as_str())
            .map(|(_, choices)| *choices)
    }

    /// Serializable description of the declaration
    pub fn capabilities(&self, entity: &'static str) -> Capabilities {
        Capabilities {
            entity,
            list_display: names(self.list_display),
            list_filter: names(self.list_filter),
            search_fields: names(self.search_fields),
            ordering: self
                .ordering
                .iter()
                .map(|(c, order)| match order {
                    SortOrder::Asc => c.as_str().to_string(),
                    SortOrder::Desc => format!("-{}", c.as_str()),
                })
                .collect(),
        }
    }
}

fn names<C: IdenStatic>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|c| c.as_str().to_string()).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub entity: &'static str,
    pub list_display: Vec<String>,
    pub list_filter: Vec<String>,
    pub search_fields: Vec<String>,
    /// Column names, `-` prefix for descending
    pub ordering: Vec<String>,
}

// ============================================================================
// Declarations
// ============================================================================

pub const RESEARCHER_ADMIN: ModelAdmin<ResearcherEntity> = ModelAdmin {
    list_display: &[
        ResearcherColumn::Name,
        ResearcherColumn::Institution,
        ResearcherColumn::Email,
        ResearcherColumn::IsActive,
        ResearcherColumn::CreatedAt,
    ],
    list_filter: &[
        ResearcherColumn::IsActive,
        ResearcherColumn::Institution,
        ResearcherColumn::CreatedAt,
    ],
    search_fields: &[
        ResearcherColumn::Name,
        ResearcherColumn::Email,
        ResearcherColumn::Institution,
        ResearcherColumn::ResearchAreas,
    ],
    ordering: &[(ResearcherColumn::Name, SortOrder::Asc)],
    choices: &[],
};

pub const REFERENCE_ADMIN: ModelAdmin<ReferenceEntity> = ModelAdmin {
    list_display: &[
        ReferenceColumn::Title,
        ReferenceColumn::Authors,
        ReferenceColumn::Year,
        ReferenceColumn::ReferenceType,
        ReferenceColumn::AddedBy,
    ],
    list_filter: &[
        ReferenceColumn::ReferenceType,
        ReferenceColumn::Year,
        ReferenceColumn::AddedBy,
    ],
    search_fields: &[
        ReferenceColumn::Title,
        ReferenceColumn::Authors,
        ReferenceColumn::Keywords,
        ReferenceColumn::AbstractText,
    ],
    ordering: &[
        (ReferenceColumn::Year, SortOrder::Desc),
        (ReferenceColumn::Title, SortOrder::Asc),
    ],
    choices: &[(ReferenceColumn::ReferenceType, allowed_values::<ReferenceType> as Choices)],
};

pub const PROJECT_ADMIN: ModelAdmin<ProjectEntity> = ModelAdmin {
    list_display: &[
        ProjectColumn::Name,
        ProjectColumn::Status,
        ProjectColumn::StartDate,
        ProjectColumn::IsPublic,
    ],
    list_filter: &[
        ProjectColumn::Status,
        ProjectColumn::IsPublic,
        ProjectColumn::StartDate,
    ],
    search_fields: &[ProjectColumn::Name, ProjectColumn::Description],
    ordering: &[(ProjectColumn::StartDate, SortOrder::Desc)],
    choices: &[(ProjectColumn::Status, allowed_values::<ProjectStatus> as Choices)],
};

pub const EVENT_ADMIN: ModelAdmin<EventEntity> = ModelAdmin {
    list_display: &[
        EventColumn::Title,
        EventColumn::EventType,
        EventColumn::StartDate,
        EventColumn::EndDate,
        EventColumn::Location,
        EventColumn::IsFeatured,
    ],
    list_filter: &[
        EventColumn::IsFeatured,
        EventColumn::EventType,
        EventColumn::StartDate,
        EventColumn::Location,
    ],
    search_fields: &[
        EventColumn::Title,
        EventColumn::Description,
        EventColumn::Location,
    ],
    ordering: &[(EventColumn::StartDate, SortOrder::Desc)],
    choices: &[(EventColumn::EventType, allowed_values::<EventType> as Choices)],
};

pub const TALK_ADMIN: ModelAdmin<TalkEntity> = ModelAdmin {
    list_display: &[
        TalkColumn::Title,
        TalkColumn::TalkType,
        TalkColumn::SpeakerId,
        TalkColumn::EventId,
        TalkColumn::StartTime,
        TalkColumn::EndTime,
    ],
    list_filter: &[
        TalkColumn::EventId,
        TalkColumn::TalkType,
        TalkColumn::StartTime,
        TalkColumn::SpeakerId,
    ],
    search_fields: &[TalkColumn::Title, TalkColumn::AbstractText],
    ordering: &[(TalkColumn::StartTime, SortOrder::Asc)],
    choices: &[(TalkColumn::TalkType, allowed_values::<TalkType> as Choices)],
};

pub const POST_ADMIN: ModelAdmin<PostEntity> = ModelAdmin {
    list_display: &[
        PostColumn::Title,
        PostColumn::AuthorId,
        PostColumn::IsPublished,
        PostColumn::PublishedAt,
        PostColumn::CreatedAt,
    ],
    list_filter: &[
        PostColumn::IsPublished,
        PostColumn::PublishedAt,
        PostColumn::AuthorId,
    ],
    search_fields: &[PostColumn::Title, PostColumn::Content, PostColumn::Tags],
    ordering: &[(PostColumn::PublishedAt, SortOrder::Desc)],
    choices: &[],
};

// ============================================================================
// Entity dispatch
// ============================================================================

/// Entities exposed to the admin interface, keyed by URL slug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminEntity {
    Researchers,
    References,
    Projects,
    Events,
    Talks,
    Posts,
}

impl AdminEntity {
    pub const ALL: [AdminEntity; 6] = [
        AdminEntity::Researchers,
        AdminEntity::References,
        AdminEntity::Projects,
        AdminEntity::Events,
        AdminEntity::Talks,
        AdminEntity::Posts,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            AdminEntity::Researchers => "researchers",
            AdminEntity::References => "references",
            AdminEntity::Projects => "projects",
            AdminEntity::Events => "events",
            AdminEntity::Talks => "talks",
            AdminEntity::Posts => "posts",
        }
    }

    pub fn capabilities(self) -> Capabilities {
        let slug = self.slug();
        match self {
            AdminEntity::Researchers => RESEARCHER_ADMIN.capabilities(slug),
            AdminEntity::References => REFERENCE_ADMIN.capabilities(slug),
            AdminEntity::Projects => PROJECT_ADMIN.capabilities(slug),
            AdminEntity::Events => EVENT_ADMIN.capabilities(slug),
            AdminEntity::Talks => TALK_ADMIN.capabilities(slug),
            AdminEntity::Posts => POST_ADMIN.capabilities(slug),
        }
    }
}

impl FromStr for AdminEntity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        AdminEntity::ALL
            .into_iter()
            .find(|e| e.slug() == s)
            .ok_or_else(|| AppError::not_found("admin entity", s))
    }
}

/// Capability table of every managed entity
pub fn capability_table() -> Vec<Capabilities> {
    AdminEntity::ALL.into_iter().map(AdminEntity::capabilities).collect()
}

/// Admin list query: search, filter and order one entity's rows.
///
/// Each row is projected to `id` plus the declared display columns.
pub async fn admin_list(
    repo: &Repository,
    entity: AdminEntity,
    search: Option<&str>,
    filters: &[(String, String)],
) -> Result<Vec<Value>> {
    let start = Instant::now();
    let db = repo.read_conn();
    let slug = entity.slug();

    let rows = match entity {
        AdminEntity::Researchers => list(db, slug, &RESEARCHER_ADMIN, search, filters).await?,
        AdminEntity::References => list(db, slug, &REFERENCE_ADMIN, search, filters).await?,
        AdminEntity::Projects => list(db, slug, &PROJECT_ADMIN, search, filters).await?,
        AdminEntity::Events => list(db, slug, &EVENT_ADMIN, search, filters).await?,
        AdminEntity::Talks => list(db, slug, &TALK_ADMIN, search, filters).await?,
        AdminEntity::Posts => list(db, slug, &POST_ADMIN, search, filters).await?,
    };

    record_admin_query(slug, start.elapsed().as_secs_f64(), rows.len());
    debug!(entity = slug, rows = rows.len(), "Admin list served");
    Ok(rows)
}

async fn list<E>(
    db: &DatabaseConnection,
    slug: &str,
    admin: &ModelAdmin<E>,
    search: Option<&str>,
    filters: &[(String, String)],
) -> Result<Vec<Value>>
where
    E: EntityTrait,
    E::Model: Serialize,
{
    let mut select = E::find();

    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let mut any = Condition::any();
        for column in admin.search_fields {
            any = any.add(
                Expr::expr(Func::lower(Expr::col((column.entity_name(), *column))))
                    .like(LikeExpr::new(pattern.clone()).escape('\\')),
            );
        }
        select = select.filter(any);
    }

    for (name, raw) in filters {
        let column = admin
            .filter_column(name)
            .ok_or_else(|| AppError::UnknownFilter {
                entity: slug.to_string(),
                column: name.clone(),
            })?;

        if let Some(choices) = admin.choices_for(column) {
            let allowed = choices();
            if !allowed.iter().any(|v| v == raw) {
                return Err(AppError::InvalidChoice {
                    field: name.clone(),
                    value: raw.clone(),
                    allowed: allowed.join(", "),
                });
            }
        }

        select = select.filter(filter_condition(column, raw)?);
    }

    for (column, order) in admin.ordering {
        select = select.order_by(*column, (*order).into());
    }

    let models = select.all(db).await?;
    models
        .iter()
        .map(|model| project_row(admin, model))
        .collect()
}

/// Escape `LIKE` metacharacters so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Equality on the parsed value; timestamp columns match a whole UTC day
fn filter_condition<C: ColumnTrait>(column: C, raw: &str) -> Result<Condition> {
    let name = column.as_str();
    let invalid = |expected: &str| AppError::Validation {
        message: format!("'{}' is not a valid {} for {}", raw, expected, name),
        field: Some(name.to_string()),
    };

    let condition = match column.def().get_column_type() {
        ColumnType::Boolean => {
            let value = match raw {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => return Err(invalid("boolean")),
            };
            Condition::all().add(column.eq(value))
        }
        ColumnType::Integer | ColumnType::SmallInteger | ColumnType::TinyInteger => {
            let value: i32 = raw.parse().map_err(|_| invalid("integer"))?;
            Condition::all().add(column.eq(value))
        }
        ColumnType::BigInteger => {
            let value: i64 = raw.parse().map_err(|_| invalid("integer"))?;
            Condition::all().add(column.eq(value))
        }
        ColumnType::Date => {
            let value = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid("date"))?;
            Condition::all().add(column.eq(value))
        }
        ColumnType::TimestampWithTimeZone | ColumnType::Timestamp | ColumnType::DateTime => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid("date"))?;
            let (from, until) = day_bounds(day);
            Condition::all().add(column.gte(from)).add(column.lt(until))
        }
        _ => Condition::all().add(column.eq(raw)),
    };

    Ok(condition)
}

fn day_bounds(day: NaiveDate) -> (DateTimeWithTimeZone, DateTimeWithTimeZone) {
    let midnight = Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN));
    (midnight.into(), (midnight + Duration::days(1)).into())
}

fn project_row<E>(admin: &ModelAdmin<E>, model: &E::Model) -> Result<Value>
where
    E: EntityTrait,
    E::Model: Serialize,
{
    let full = match serde_json::to_value(model)? {
        Value::Object(map) => map,
        other => {
            return Err(AppError::Internal {
                message: format!("Row did not serialize to an object: {}", other),
            })
        }
    };

    let mut row = Map::new();
    if let Some(id) = full.get("id") {
        row.insert("id".to_string(), id.clone());
    }
    for column in admin.list_display {
        let key = column.as_str();
        row.insert(key.to_string(), full.get(key).cloned().unwrap_or(Value::Null));
    }

    Ok(Value::Object(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn filters(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_capability_table_covers_every_entity() {
        let table = capability_table();
        let slugs: Vec<_> = table.iter().map(|c| c.entity).collect();
        assert_eq!(
            slugs,
            vec!["researchers", "references", "projects", "events", "talks", "posts"]
        );

        let references = AdminEntity::References.capabilities();
        assert_eq!(references.ordering, vec!["-year", "title"]);
        assert!(references.search_fields.iter().any(|f| f == "abstract_text"));
    }

    #[test]
    fn test_entity_slug_parsing() {
        assert_eq!("talks".parse::<AdminEntity>().unwrap(), AdminEntity::Talks);
        assert!(matches!(
            "profiles".parse::<AdminEntity>(),
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_across_fields() {
        let repo = repo().await;
        let mut ada = researcher_input("Ada Lovelace", "ada@example.org");
        ada.research_areas = "Analytical Engines".into();
        repo.create_researcher(ada).await.unwrap();
        repo.create_researcher(researcher_input("Alan Turing", "alan@example.org"))
            .await
            .unwrap();

        let rows = admin_list(&repo, AdminEntity::Researchers, Some("ENGINES"), &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Ada Lovelace");

        let rows = admin_list(&repo, AdminEntity::Researchers, Some("turing"), &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["email"], "alan@example.org");
    }

    #[test]
    fn test_like_metacharacters_are_escaped() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let repo = repo().await;
        let mut ada = researcher_input("Ada Lovelace", "ada@example.org");
        ada.research_areas = "50% theory".into();
        repo.create_researcher(ada).await.unwrap();
        repo.create_researcher(researcher_input("Alan Turing", "alan@example.org"))
            .await
            .unwrap();

        let rows = admin_list(&repo, AdminEntity::Researchers, Some("a_a"), &[])
            .await
            .unwrap();
        assert!(rows.is_empty());

        for term in ["%", "0%"] {
            let rows = admin_list(&repo, AdminEntity::Researchers, Some(term), &[])
                .await
                .unwrap();
            assert_eq!(rows.len(), 1, "{term}");
            assert_eq!(rows[0]["name"], "Ada Lovelace");
        }
    }

    #[tokio::test]
    async fn test_rows_are_projected_and_ordered() {
        let repo = repo().await;
        repo.create_researcher(researcher_input("Zed", "zed@example.org"))
            .await
            .unwrap();
        repo.create_researcher(researcher_input("Amy", "amy@example.org"))
            .await
            .unwrap();

        let rows = admin_list(&repo, AdminEntity::Researchers, None, &[])
            .await
            .unwrap();
        assert_eq!(rows[0]["name"], "Amy");
        assert_eq!(rows[1]["name"], "Zed");

        let keys: Vec<_> = rows[0].as_object().unwrap().keys().cloned().collect();
        assert!(keys.contains(&"id".to_string()));
        assert!(keys.contains(&"is_active".to_string()));
        assert!(!keys.contains(&"bio".to_string()));
    }

    #[tokio::test]
    async fn test_boolean_and_choice_filters() {
        let repo = repo().await;
        let ada = repo
            .create_researcher(researcher_input("Ada", "ada@example.org"))
            .await
            .unwrap();
        let bob = repo
            .create_researcher(researcher_input("Bob", "bob@example.org"))
            .await
            .unwrap();
        repo.set_researcher_active(bob.id, false).await.unwrap();

        let rows = admin_list(
            &repo,
            AdminEntity::Researchers,
            None,
            &filters(&[("is_active", "0")]),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Bob");

        let mut book = reference_input("A Book", 2001, ada.id);
        book.reference_type = ReferenceType::Book;
        repo.create_reference(book).await.unwrap();
        repo.create_reference(reference_input("A Paper", 2002, ada.id))
            .await
            .unwrap();

        let rows = admin_list(
            &repo,
            AdminEntity::References,
            None,
            &filters(&[("reference_type", "book")]),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "A Book");

        let err = admin_list(
            &repo,
            AdminEntity::References,
            None,
            &filters(&[("reference_type", "pamphlet")]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidChoice { .. }));
    }

    #[tokio::test]
    async fn test_undeclared_filter_is_rejected() {
        let repo = repo().await;
        let err = admin_list(
            &repo,
            AdminEntity::Researchers,
            None,
            &filters(&[("bio", "anything")]),
        )
        .await
        .unwrap_err();

        match err {
            AppError::UnknownFilter { entity, column } => {
                assert_eq!(entity, "researchers");
                assert_eq!(column, "bio");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timestamp_filter_matches_whole_day() {
        let repo = repo().await;
        repo.create_event(event_input("Monday", at(9, 30), false))
            .await
            .unwrap();
        repo.create_event(event_input("Tuesday", at(9, 30) + Duration::days(1), false))
            .await
            .unwrap();

        let rows = admin_list(
            &repo,
            AdminEntity::Events,
            None,
            &filters(&[("start_date", "2025-09-15")]),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Monday");

        let err = admin_list(
            &repo,
            AdminEntity::Events,
            None,
            &filters(&[("start_date", "yesterday")]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
