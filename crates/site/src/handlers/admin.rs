//! Admin list endpoints

use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use colloquium_common::{
    admin::{self, AdminEntity, Capabilities},
    db::Repository,
    errors::Result,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Query parameter carrying the search term; every other one is a filter
const SEARCH_PARAM: &str = "q";

#[derive(Serialize)]
pub struct AdminListResponse {
    pub entity: &'static str,
    pub count: usize,
    pub rows: Vec<Value>,
}

/// Capability table of every managed entity
pub async fn capabilities() -> Json<Vec<Capabilities>> {
    Json(admin::capability_table())
}

/// Search, filter and list one entity
pub async fn list(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(mut params): Query<BTreeMap<String, String>>,
) -> Result<Json<AdminListResponse>> {
    let entity: AdminEntity = entity.parse()?;
    let search = params.remove(SEARCH_PARAM);
    let filters: Vec<(String, String)> = params.into_iter().collect();

    let repo = Repository::new(state.db.clone());
    let rows = admin::admin_list(&repo, entity, search.as_deref(), &filters).await?;

    tracing::info!(
        entity = entity.slug(),
        search = search.as_deref().unwrap_or(""),
        filters = filters.len(),
        rows = rows.len(),
        "Admin list"
    );

    Ok(Json(AdminListResponse {
        entity: entity.slug(),
        count: rows.len(),
        rows,
    }))
}
