//! In-memory stand-in for json-server.
//!
//! Serves schema-less JSON collections with the subset of json-server's
//! REST surface the store client relies on: equality filters, `_sort` and
//! `_order` on listings, shallow `PATCH` merges and `{}` delete bodies.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::debug;
use uuid::Uuid;

pub type Record = Map<String, Value>;
pub type Collections = HashMap<String, Vec<Record>>;
pub type Db = Arc<RwLock<Collections>>;

pub const DEFAULT_COLLECTIONS: [&str; 2] = ["users", "items"];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed data must be a JSON object of collections")]
    NotAnObject,
    #[error("collection {0} must be an array")]
    NotAnArray(String),
    #[error("collection {0} contains a non-object record")]
    NotARecord(String),
}

/// Empty `users` and `items` collections.
pub fn default_collections() -> Collections {
    DEFAULT_COLLECTIONS
        .iter()
        .map(|name| (name.to_string(), Vec::new()))
        .collect()
}

/// Build collections from a json-server style `db.json` document. The
/// default collections are always present, even if the seed omits them.
pub fn load_seed(seed: Value) -> Result<Collections, SeedError> {
    let Value::Object(seed) = seed else {
        return Err(SeedError::NotAnObject);
    };
    let mut collections = default_collections();
    for (name, records) in seed {
        let Value::Array(records) = records else {
            return Err(SeedError::NotAnArray(name));
        };
        let records = records
            .into_iter()
            .map(|record| match record {
                Value::Object(record) => Ok(record),
                _ => Err(SeedError::NotARecord(name.clone())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        collections.insert(name, records);
    }
    Ok(collections)
}

pub fn app() -> Router {
    app_with(default_collections())
}

pub fn app_with(collections: Collections) -> Router {
    let db: Db = Arc::new(RwLock::new(collections));
    Router::new()
        .route("/{collection}", get(list_records).post(create_record))
        .route("/{collection}/", post(create_record))
        .route(
            "/{collection}/{id}",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn serve(listener: TcpListener, collections: Collections) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(collections)).await
}

/// Listing parameters: `_sort`, `_order`, and equality filters for every
/// other non-underscore key. Unknown `_` parameters are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    filters: Vec<(String, String)>,
    sort: Option<String>,
    descending: bool,
}

impl ListQuery {
    pub fn from_params(params: HashMap<String, String>) -> Self {
        let mut query = Self::default();
        for (key, value) in params {
            if key == "_sort" {
                query.sort = Some(value);
            } else if key == "_order" {
                query.descending = value.eq_ignore_ascii_case("desc");
            } else if !key.starts_with('_') {
                query.filters.push((key, value));
            }
        }
        query
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        let mut matched: Vec<Record> = records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect();
        if let Some(field) = &self.sort {
            matched.sort_by(|a, b| {
                let ordering = compare_fields(a.get(field), b.get(field));
                if self.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        matched
    }

    fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|(field, expected)| {
            record
                .get(field)
                .is_some_and(|value| field_text(value) == *expected)
        })
    }
}

/// Query strings are text, so filters compare against the field's text form.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(a), Some(b)) => field_text(a).cmp(&field_text(b)),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

fn has_id(record: &Record, id: &str) -> bool {
    record.get("id").is_some_and(|value| field_text(value) == id)
}

async fn list_records(
    State(db): State<Db>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Record>>, StatusCode> {
    let data = db.read().await;
    let records = data.get(&collection).ok_or(StatusCode::NOT_FOUND)?;
    let query = ListQuery::from_params(params);
    debug!(%collection, ?query, "list");
    Ok(Json(query.apply(records)))
}

async fn create_record(
    State(db): State<Db>,
    Path(collection): Path<String>,
    Json(mut record): Json<Record>,
) -> Result<(StatusCode, Json<Record>), StatusCode> {
    let mut data = db.write().await;
    let records = data.get_mut(&collection).ok_or(StatusCode::NOT_FOUND)?;

    let id = match record.get("id") {
        Some(id) if !id.is_null() => field_text(id),
        _ => {
            let id = Uuid::new_v4().to_string();
            record.insert("id".to_string(), Value::String(id.clone()));
            id
        }
    };
    if records.iter().any(|existing| has_id(existing, &id)) {
        return Err(StatusCode::CONFLICT);
    }

    debug!(%collection, %id, "create");
    records.push(record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_record(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Record>, StatusCode> {
    let data = db.read().await;
    let records = data.get(&collection).ok_or(StatusCode::NOT_FOUND)?;
    records
        .iter()
        .find(|record| has_id(record, &id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_record(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, String)>,
    Json(patch): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    let mut data = db.write().await;
    let records = data.get_mut(&collection).ok_or(StatusCode::NOT_FOUND)?;
    let record = records
        .iter_mut()
        .find(|record| has_id(record, &id))
        .ok_or(StatusCode::NOT_FOUND)?;

    // `id` is immutable once assigned.
    for (key, value) in patch {
        if key != "id" {
            record.insert(key, value);
        }
    }
    debug!(%collection, %id, "update");
    Ok(Json(record.clone()))
}

async fn delete_record(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let mut data = db.write().await;
    let records = data.get_mut(&collection).ok_or(StatusCode::NOT_FOUND)?;
    let position = records
        .iter()
        .position(|record| has_id(record, &id))
        .ok_or(StatusCode::NOT_FOUND)?;
    records.remove(position);
    debug!(%collection, %id, "delete");
    Ok(Json(json!({})))
}
