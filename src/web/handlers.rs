//! Generic resource handlers
//!
//! One handler set serves every registered resource; `{resource}` in the
//! path is matched against the registry, so adding a resource is a schema
//! entry, not new code. All responses use the `{data, message, status}`
//! envelope.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue, json};

use crate::query::Filter;
use crate::schema::ResourceSchema;
use crate::store::{BulkClassification, BulkOutcome, BulkUpdate, bulk_delete, bulk_update};

use super::envelope::{Envelope, created, ok};
use super::error::{ApiError, ApiResult};
use super::router::AppState;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct ResourceQuery {
    pub id: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub q: Option<String>,
    pub bulk: Option<bool>,
}

#[derive(Debug, Serialize)]
struct PageData {
    items: Vec<crate::store::Document>,
    total: usize,
    page: usize,
    limit: usize,
}

pub async fn healthcheck() -> Response {
    ok(json!({ "service": "dashstore" }), "ok")
}

/// `GET /api/{resource}/v1`: single record by `?id=`, or a filtered,
/// paginated list.
pub async fn fetch(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(query): Query<ResourceQuery>,
) -> ApiResult<Response> {
    let schema = resolve(&state, &resource)?;

    if let Some(id) = &query.id {
        let doc = state
            .store
            .get(&resource, id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No record '{id}' in '{resource}'")))?;
        return Ok(ok(doc, "Record fetched"));
    }

    let page = query.page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    let filter = Filter::parse(query.q.as_deref(), schema);

    let (items, total) = state.store.find(&resource, &filter, page, limit).await?;
    let data = PageData {
        items,
        total,
        page,
        limit,
    };
    Ok(ok(data, "Records fetched"))
}

/// `POST /api/{resource}/v1`: insert one record from the JSON body.
pub async fn create(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Json(payload): Json<JsonValue>,
) -> ApiResult<Response> {
    resolve(&state, &resource)?;
    let fields = as_object(payload)?;
    let doc = state.store.insert(&resource, fields).await?;
    Ok(created(doc, "Record created"))
}

/// `PUT /api/{resource}/v1`: update one record (`{id, ...fields}` body),
/// or with `?bulk=true` apply an array of `{id, updateData}` instructions.
pub async fn update(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(query): Query<ResourceQuery>,
    Json(payload): Json<JsonValue>,
) -> ApiResult<Response> {
    resolve(&state, &resource)?;

    if query.bulk == Some(true) {
        let instructions = parse_bulk_updates(payload)?;
        if instructions.is_empty() {
            return Err(ApiError::validation(
                "Bulk update requires at least one instruction",
            ));
        }
        let outcome = bulk_update(&state.store, &resource, instructions).await;
        let data = json!({ "updated": outcome.succeeded, "failedIds": outcome.failed_ids });
        return Ok(bulk_response(&outcome, "updated", data));
    }

    let mut fields = as_object(payload)?;
    let id = match fields.remove("id") {
        Some(JsonValue::String(id)) => id,
        _ => return Err(ApiError::validation("Field 'id' is required for update")),
    };
    let doc = state.store.update(&resource, &id, fields).await?;
    Ok(ok(doc, "Record updated"))
}

/// `DELETE /api/{resource}/v1`: delete one record (`{id}` body), or with
/// `?bulk=true` a batch (`{ids}` body).
pub async fn remove(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(query): Query<ResourceQuery>,
    Json(payload): Json<JsonValue>,
) -> ApiResult<Response> {
    resolve(&state, &resource)?;

    if query.bulk == Some(true) {
        let ids = parse_id_list(&payload)?;
        if ids.is_empty() {
            return Err(ApiError::validation("Bulk delete requires at least one id"));
        }
        let outcome = bulk_delete(&state.store, &resource, ids).await;
        let data = json!({ "deletedIds": outcome.succeeded, "failedIds": outcome.failed_ids });
        return Ok(bulk_response(&outcome, "deleted", data));
    }

    let id = payload
        .get("id")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ApiError::validation("Field 'id' is required for delete"))?;

    if state.store.remove(&resource, id).await? {
        Ok(ok(json!({ "deletedCount": 1 }), "Record deleted"))
    } else {
        Err(ApiError::not_found(format!(
            "No record '{id}' in '{resource}'"
        )))
    }
}

/// `GET /api/{resource}/v1/summary`: aggregate counts.
pub async fn summary(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> ApiResult<Response> {
    resolve(&state, &resource)?;
    let counts = state.store.summary(&resource).await?;
    Ok(ok(counts, "Summary fetched"))
}

fn resolve<'a>(state: &'a AppState, resource: &str) -> ApiResult<&'a ResourceSchema> {
    state
        .store
        .registry()
        .schema(resource)
        .ok_or_else(|| ApiError::UnknownResource(resource.to_string()))
}

fn as_object(payload: JsonValue) -> ApiResult<JsonMap<String, JsonValue>> {
    match payload {
        JsonValue::Object(map) => Ok(map),
        _ => Err(ApiError::validation("A JSON object body is expected")),
    }
}

/// A malformed instruction list is a request-level input error; only
/// well-formed instructions enter per-item success/failure accounting.
fn parse_bulk_updates(payload: JsonValue) -> ApiResult<Vec<BulkUpdate>> {
    let JsonValue::Array(items) = payload else {
        return Err(ApiError::validation(
            "Bulk update expects an array of {id, updateData} instructions",
        ));
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<BulkUpdate>(item).map_err(|e| {
                ApiError::validation(format!("Invalid bulk instruction: {e}"))
            })
        })
        .collect()
}

fn parse_id_list(payload: &JsonValue) -> ApiResult<Vec<String>> {
    let ids = payload
        .get("ids")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| ApiError::validation("Bulk delete expects an 'ids' array"))?;
    ids.iter()
        .map(|id| {
            id.as_str()
                .map(str::to_string)
                .ok_or_else(|| ApiError::validation("Every id must be a string"))
        })
        .collect()
}

/// Aggregate status for a partitioned bulk report: 200 when everything
/// succeeded, 207 when only some did, 400 when nothing did. Callers rely on
/// the 207 to tell "some worked" from "all worked".
fn bulk_response<T: Serialize>(outcome: &BulkOutcome<T>, verb: &str, data: JsonValue) -> Response {
    let succeeded = outcome.succeeded.len();
    let total = outcome.len();
    let (status, message) = match outcome.classification() {
        BulkClassification::AllSucceeded => {
            (StatusCode::OK, format!("All {total} records {verb}"))
        }
        BulkClassification::PartialSuccess => (
            StatusCode::MULTI_STATUS,
            format!("{succeeded} of {total} records {verb}"),
        ),
        BulkClassification::AllFailed => {
            (StatusCode::BAD_REQUEST, format!("No records were {verb}"))
        }
    };
    Envelope::respond(status, data, message)
}
