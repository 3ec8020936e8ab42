//! Stateless request builder and response parser for the JSON store.
//!
//! # Design
//! `DbClient` holds only a `base_url`. Every store operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. All `parse_*` methods go through
//! [`handle`], which is the single place that decides between data, the
//! absent-marker (`None`) and a failure.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DbError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Attributes, Item, User};

const USERS: &str = "users";
const ITEMS: &str = "items";

#[derive(Debug, Clone)]
pub struct DbClient {
    base_url: String,
}

impl DbClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    // --- users ---

    pub fn build_get_user(&self, uid: &str) -> HttpRequest {
        self.request(HttpMethod::Get, self.record_url(USERS, uid))
    }

    pub fn build_get_user_by_customer_id(&self, customer_id: &str) -> HttpRequest {
        let url = format!(
            "{}/{USERS}?stripeCustomerId={}",
            self.base_url,
            urlencoding::encode(customer_id)
        );
        self.request(HttpMethod::Get, url)
    }

    /// The record is written with `id = uid`; a caller-supplied `id`
    /// attribute does not override it.
    pub fn build_create_user(&self, uid: &str, attributes: &Attributes) -> Result<HttpRequest> {
        let mut record = attributes.clone();
        record.insert("id".to_string(), Value::String(uid.to_string()));
        self.json_request(HttpMethod::Post, self.collection_url(USERS), &record)
    }

    pub fn build_update_user(&self, uid: &str, attributes: &Attributes) -> Result<HttpRequest> {
        self.json_request(HttpMethod::Patch, self.record_url(USERS, uid), attributes)
    }

    // --- items ---

    pub fn build_get_item(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, self.record_url(ITEMS, id))
    }

    pub fn build_get_items_by_owner(&self, owner: &str) -> HttpRequest {
        let url = format!(
            "{}/{ITEMS}?owner={}&_sort=createdAt&_order=desc",
            self.base_url,
            urlencoding::encode(owner)
        );
        self.request(HttpMethod::Get, url)
    }

    /// `created_at` always wins over a `createdAt` attribute.
    pub fn build_create_item(&self, attributes: &Attributes, created_at: i64) -> Result<HttpRequest> {
        let mut record = attributes.clone();
        record.insert("createdAt".to_string(), Value::from(created_at));
        self.json_request(HttpMethod::Post, self.collection_url(ITEMS), &record)
    }

    pub fn build_update_item(&self, id: &str, attributes: &Attributes) -> Result<HttpRequest> {
        self.json_request(HttpMethod::Patch, self.record_url(ITEMS, id), attributes)
    }

    pub fn build_delete_item(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, self.record_url(ITEMS, id))
    }

    // --- parsing ---

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<Option<User>> {
        handle(response)
    }

    /// First match wins; uniqueness of `stripeCustomerId` is up to the store.
    pub fn parse_get_user_by_customer_id(&self, response: HttpResponse) -> Result<Option<User>> {
        let users: Option<Vec<User>> = handle(response)?;
        Ok(users.and_then(|users| users.into_iter().next()))
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<User> {
        require(response)
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<Option<User>> {
        handle(response)
    }

    pub fn parse_get_item(&self, response: HttpResponse) -> Result<Option<Item>> {
        handle(response)
    }

    pub fn parse_get_items_by_owner(&self, response: HttpResponse) -> Result<Vec<Item>> {
        Ok(handle(response)?.unwrap_or_default())
    }

    pub fn parse_create_item(&self, response: HttpResponse) -> Result<Item> {
        require(response)
    }

    pub fn parse_update_item(&self, response: HttpResponse) -> Result<Option<Item>> {
        handle(response)
    }

    /// The confirmation body is whatever the store sends back.
    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<Option<Value>> {
        handle(response)
    }

    // --- helpers ---

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}/", self.base_url)
    }

    fn record_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{}", self.base_url, urlencoding::encode(id))
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: String,
        body: &T,
    ) -> Result<HttpRequest> {
        let body = serde_json::to_string(body).map_err(|e| DbError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Shared response handling.
///
/// 2xx parses the body (an empty body reads as JSON `null`), 404 yields
/// `None`, any other status is a `DbError::Status`.
pub fn handle<T: DeserializeOwned>(response: HttpResponse) -> Result<Option<T>> {
    if response.is_success() {
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        return serde_json::from_str(body)
            .map(Some)
            .map_err(|e| DbError::Deserialization(e.to_string()));
    }
    if response.status == 404 {
        return Ok(None);
    }
    Err(DbError::Status {
        status: response.status,
        body: response.body,
    })
}

/// Like [`handle`], but a 404 is a failure: creates have no absent case.
fn require<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    if response.status == 404 {
        return Err(DbError::Status {
            status: response.status,
            body: response.body,
        });
    }
    handle(response)?.ok_or_else(|| DbError::Deserialization("empty response".to_string()))
}
